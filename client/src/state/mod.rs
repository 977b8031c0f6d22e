//! Session state modules.
//!
//! DESIGN
//! ======
//! [`session`] is the synchronous state machine (team, cooldown,
//! confirmation, grid); [`service`] wraps it with the async plumbing that
//! talks to the remote store. Presentation layers hold the session handle
//! and subscribe to its event stream — there is no global singleton.

pub mod service;
pub mod session;
