//! The abstract remote store the session reconciles against.
//!
//! ERROR HANDLING
//! ==============
//! Store failures are ordinary values, never panics: a failed snapshot
//! leaves the session running on an empty grid, a failed submission leaves
//! the optimistic local state in place, and a broken feed is the backend's
//! to re-establish while the session keeps serving stale data.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::{CellRecord, LeaderboardEntry, PaintPayload};

/// Failure modes at the store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The initial full-grid snapshot could not be fetched.
    #[error("snapshot fetch failed: {0}")]
    Snapshot(String),
    /// A paint intent could not be delivered.
    #[error("paint submission failed: {0}")]
    Submission(String),
    /// The change-feed subscription could not be established or broke.
    #[error("change feed subscription failed: {0}")]
    Subscription(String),
}

/// Remote persistence and change-notification collaborator.
///
/// Submission is at-most-once from this client and idempotent at the store
/// (upsert by coordinates). The change feed must not reorder events for the
/// same cell; ordering across different cells is unspecified.
#[async_trait]
pub trait CanvasStore: Send + Sync {
    /// Full point-in-time read of all painted cells.
    async fn fetch_canvas(&self) -> Result<Vec<CellRecord>, StoreError>;

    /// Deliver one paint intent.
    async fn submit_paint(&self, payload: PaintPayload) -> Result<(), StoreError>;

    /// Aggregate cell counts per team, sorted by the store.
    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Start pushing one [`CellRecord`] per remote mutation into `updates`.
    /// The returned handle tears the feed down when dropped or closed.
    async fn subscribe(&self, updates: mpsc::UnboundedSender<CellRecord>) -> Result<Subscription, StoreError>;
}

/// RAII handle for an active change-feed subscription.
///
/// The teardown closure runs exactly once: on [`Subscription::close`] or,
/// failing that, on drop — so the feed is released on every exit path.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap the store-specific teardown action.
    #[must_use]
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self { teardown: Some(Box::new(teardown)) }
    }

    /// Explicitly release the feed.
    pub fn close(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}
