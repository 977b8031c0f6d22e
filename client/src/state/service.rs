//! Async orchestration around the paint session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns the session behind a mutex and wires it to the remote store: the
//! one-shot snapshot at startup, the long-lived change-feed pump, the
//! fire-and-forget paint submission, and the periodic leaderboard refresh.
//! Local confirms and remote pushes both mutate the grid through the same
//! session entry points under the same lock, so the single-writer invariant
//! holds even on a multi-threaded runtime. The lock is never held across an
//! `.await`.

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use canvas::grid::{CellCoord, Team};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::net::store::{CanvasStore, StoreError, Subscription};
use crate::state::session::{PaintError, PaintSession};

/// The paint session wired to its remote store.
pub struct SessionService {
    session: Arc<Mutex<PaintSession>>,
    store: Arc<dyn CanvasStore>,
    subscription: Option<Subscription>,
    pump_task: Option<JoinHandle<()>>,
    refresh_task: Option<JoinHandle<()>>,
}

impl SessionService {
    /// Wrap a session and its store. Call [`SessionService::initialize`] to
    /// load the snapshot and start the background tasks.
    #[must_use]
    pub fn new(session: PaintSession, store: Arc<dyn CanvasStore>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            store,
            subscription: None,
            pump_task: None,
            refresh_task: None,
        }
    }

    /// Shared handle to the session, for presentation layers that read state
    /// or subscribe to events directly.
    #[must_use]
    pub fn session(&self) -> Arc<Mutex<PaintSession>> {
        Arc::clone(&self.session)
    }

    /// Load the initial snapshot, fetch the first leaderboard, and start the
    /// change-feed pump and the periodic leaderboard refresh.
    ///
    /// A snapshot or subscription failure is returned so the caller can
    /// surface it once, but the session keeps running either way — with an
    /// empty grid, or without live updates until the store reconnects.
    pub async fn initialize(&mut self, leaderboard_refresh: Duration) -> Result<(), StoreError> {
        let mut first_error = None;

        match self.store.fetch_canvas().await {
            Ok(records) => self.lock_session().load_snapshot(records),
            Err(err) => {
                warn!(error = %err, "snapshot fetch failed; starting with an empty grid");
                first_error = Some(err);
            }
        }

        refresh_leaderboard(&self.session, &self.store).await;

        let (tx, rx) = mpsc::unbounded_channel();
        match self.store.subscribe(tx).await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.pump_task = Some(tokio::spawn(pump_remote_updates(rx, Arc::clone(&self.session))));
            }
            Err(err) => {
                warn!(error = %err, "change feed unavailable; grid will stay stale until reconnect");
                first_error.get_or_insert(err);
            }
        }

        self.refresh_task = Some(tokio::spawn(periodic_leaderboard_refresh(
            leaderboard_refresh,
            Arc::clone(&self.session),
            Arc::clone(&self.store),
        )));

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Choose (and persist) the participant's team.
    pub fn select_team(&self, team: Team) {
        self.lock_session().select_team(team);
    }

    /// Open a paint confirmation for a cell.
    pub fn request_paint(&self, cell: CellCoord) -> Result<(), PaintError> {
        self.lock_session().request_paint(cell)
    }

    /// Close an open confirmation without painting.
    pub fn cancel_paint(&self) {
        self.lock_session().cancel_paint();
    }

    /// Confirm the open paint: the session commits locally (grid, cooldown,
    /// persistence) and the submission is spawned in the background. The
    /// submission's outcome never blocks interaction or rolls the commit
    /// back; either way it triggers a leaderboard refresh.
    pub fn confirm_paint(&self, cell: CellCoord) -> Result<(), PaintError> {
        let payload = self.lock_session().confirm_paint(cell)?;

        let store = Arc::clone(&self.store);
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            if let Err(err) = store.submit_paint(payload).await {
                warn!(error = %err, x = payload.x, y = payload.y, "paint submission failed; keeping optimistic state");
            }
            refresh_leaderboard(&session, &store).await;
        });
        Ok(())
    }

    /// Whether the cooldown permits painting right now.
    #[must_use]
    pub fn can_paint_now(&self) -> bool {
        self.lock_session().can_paint_now()
    }

    /// Time remaining until the next paint is allowed.
    #[must_use]
    pub fn time_until_next_paint(&self) -> Duration {
        self.lock_session().time_until_next_paint()
    }

    /// Tear down the change feed and background tasks. Also runs on drop;
    /// calling it explicitly makes the teardown point visible.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
        if let Some(task) = self.pump_task.take() {
            task.abort();
        }
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
        debug!("session service shut down");
    }

    fn lock_session(&self) -> MutexGuard<'_, PaintSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Apply inbound feed records in arrival order through the session's
/// single-writer entry point.
async fn pump_remote_updates(
    mut rx: mpsc::UnboundedReceiver<crate::net::types::CellRecord>,
    session: Arc<Mutex<PaintSession>>,
) {
    while let Some(record) = rx.recv().await {
        session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply_remote(record);
    }
    debug!("change feed closed");
}

async fn periodic_leaderboard_refresh(
    every: Duration,
    session: Arc<Mutex<PaintSession>>,
    store: Arc<dyn CanvasStore>,
) {
    let mut interval = tokio::time::interval(every);
    // The first tick fires immediately; initialization already fetched once.
    interval.tick().await;
    loop {
        interval.tick().await;
        refresh_leaderboard(&session, &store).await;
    }
}

/// Best-effort leaderboard fetch; failures are logged and the previous
/// counts stay visible.
async fn refresh_leaderboard(session: &Arc<Mutex<PaintSession>>, store: &Arc<dyn CanvasStore>) {
    match store.fetch_leaderboard().await {
        Ok(entries) => session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_leaderboard(entries),
        Err(err) => warn!(error = %err, "leaderboard refresh failed"),
    }
}
