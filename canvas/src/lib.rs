//! Viewport and input engine for the shared paint-war canvas.
//!
//! This crate owns the deterministic half of the client: mapping an
//! unbounded pan/zoom viewport onto the bounded cell grid, culling to the
//! visible cell range, converting pointer coordinates to cells, and
//! disambiguating clicks from drags. It performs no I/O and knows nothing
//! about the remote store; the `client` crate layers session state and
//! networking on top.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::CanvasController`] tying viewport + pointer state to host events |
//! | [`grid`] | Teams, cell coordinates, and the sparse painted-cell store |
//! | [`viewport`] | Pan/zoom transform and screen↔grid conversions |
//! | [`input`] | Pointer gesture state machine (click vs. drag) |
//! | [`consts`] | Shared numeric constants (zoom limits, drag threshold) |

pub mod consts;
pub mod engine;
pub mod grid;
pub mod input;
pub mod viewport;
