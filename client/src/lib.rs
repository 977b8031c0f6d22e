//! Session layer for the shared paint-war canvas.
//!
//! Builds the stateful half of the client on top of the `canvas` engine
//! crate: the optimistic paint session (team, cooldown, confirmation flow,
//! grid mutations), the abstract remote-store collaborator interfaces, the
//! durable local preferences that keep the cooldown honest across restarts,
//! and the async orchestration that reconciles local state with the remote
//! change feed.

pub mod config;
pub mod net;
pub mod state;
pub mod util;
