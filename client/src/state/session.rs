//! The optimistic paint session state machine.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns the local projection of the shared grid plus everything needed to
//! decide whether this participant may paint right now: selected team,
//! last-paint instant, the global cooldown, and the two-step
//! request/confirm flow. A confirmed paint mutates the grid immediately and
//! persists the cooldown before any network traffic; the remote store
//! catches up asynchronously. Inbound feed events land in the same grid
//! through the same single entry point, unconditionally — the remote store
//! is the eventual authority, so the last write observed wins.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::time::Duration;

use canvas::grid::{CellCoord, GridSize, GridStore, PaintedCell, Team};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::net::types::{CellRecord, LeaderboardEntry, PaintPayload};
use crate::util::prefs::PrefsStore;
use crate::util::time::now_ms;

/// Capacity of the session event channel; slow subscribers lag, they do not
/// block mutations.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Recoverable, user-facing reasons a paint cannot proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaintError {
    /// No team has been selected yet; the caller should prompt selection.
    #[error("a team must be selected before painting")]
    TeamNotSelected,
    /// The participant-global cooldown has not elapsed.
    #[error("cooldown active for another {remaining_ms} ms")]
    CooldownActive { remaining_ms: i64 },
    /// The requested coordinates fall outside the grid.
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: u32, y: u32 },
    /// `confirm_paint` was called without a matching open confirmation.
    #[error("no paint confirmation is open for ({x}, {y})")]
    NoPendingConfirmation { x: u32, y: u32 },
}

/// Change notifications published by the session for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A team was chosen (and persisted).
    TeamSelected(Team),
    /// The initial snapshot was applied; carries the painted-cell count.
    SnapshotLoaded { cells: usize },
    /// A paint confirmation opened for this cell.
    ConfirmationOpened { cell: CellCoord },
    /// The open confirmation closed (confirmed or cancelled).
    ConfirmationClosed,
    /// A local optimistic paint landed on the grid.
    CellPainted { cell: CellCoord, team: Team },
    /// A remote participant's paint was applied.
    RemoteCellChanged { cell: CellCoord, team: Team },
    /// The cooldown clock restarted; no paint until this instant.
    CooldownStarted { until_ms: i64 },
    /// Fresh aggregate counts are available via `leaderboard()`.
    LeaderboardUpdated,
}

/// Paint-war session state for one participant.
pub struct PaintSession {
    grid: GridStore,
    cooldown_ms: i64,
    selected_team: Option<Team>,
    last_paint_ms: Option<i64>,
    pending: Option<CellCoord>,
    leaderboard: Vec<LeaderboardEntry>,
    prefs: Box<dyn PrefsStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl PaintSession {
    /// Create a session over an empty grid, restoring the selected team and
    /// last-paint instant from `prefs` so the cooldown survives restarts.
    #[must_use]
    pub fn new(grid_size: GridSize, cooldown: Duration, prefs: Box<dyn PrefsStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let selected_team = prefs.load_team();
        let last_paint_ms = prefs.load_last_paint_ms();
        Self {
            grid: GridStore::new(grid_size),
            cooldown_ms: i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX),
            selected_team,
            last_paint_ms,
            pending: None,
            leaderboard: Vec::new(),
            prefs,
            events,
        }
    }

    // --- Queries ---

    /// The local grid projection.
    #[must_use]
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// The participant's team, if one has been chosen.
    #[must_use]
    pub fn selected_team(&self) -> Option<Team> {
        self.selected_team
    }

    /// The cell awaiting confirmation, if any.
    #[must_use]
    pub fn pending_confirmation(&self) -> Option<CellCoord> {
        self.pending
    }

    /// The most recently fetched aggregate counts.
    #[must_use]
    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    /// Whether the participant-global cooldown permits painting right now.
    #[must_use]
    pub fn can_paint_now(&self) -> bool {
        self.can_paint_at(now_ms())
    }

    /// Time remaining until the next paint is allowed; zero when eligible.
    #[must_use]
    pub fn time_until_next_paint(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.remaining_at(now_ms())).unwrap_or(0))
    }

    /// Subscribe to session change notifications.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // --- Commands ---

    /// Choose (and persist) the participant's team.
    pub fn select_team(&mut self, team: Team) {
        self.selected_team = Some(team);
        self.prefs.save_team(team);
        self.emit(SessionEvent::TeamSelected(team));
    }

    /// Ask to paint a cell. Validates team, cooldown, and bounds, then opens
    /// a confirmation step; the grid is not touched yet.
    pub fn request_paint(&mut self, cell: CellCoord) -> Result<(), PaintError> {
        self.request_paint_at(cell, now_ms())
    }

    /// Confirm the open paint for `cell`, committing the optimistic update.
    ///
    /// Re-checks the cooldown at confirmation time, then: mutates the grid,
    /// records and synchronously persists the last-paint instant, and closes
    /// the confirmation. Returns the payload the caller must submit to the
    /// remote store; that submission happens after the local commit and its
    /// outcome never rolls this state back.
    pub fn confirm_paint(&mut self, cell: CellCoord) -> Result<PaintPayload, PaintError> {
        self.confirm_paint_at(cell, now_ms())
    }

    /// Close the open confirmation without painting.
    pub fn cancel_paint(&mut self) {
        if self.pending.take().is_some() {
            self.emit(SessionEvent::ConfirmationClosed);
        }
    }

    /// Replace the grid contents with a full snapshot from the store.
    pub fn load_snapshot(&mut self, records: Vec<CellRecord>) {
        let rejected = self
            .grid
            .load_snapshot(records.iter().map(|r| (r.coord(), r.painted())));
        if rejected > 0 {
            warn!(rejected, "snapshot contained out-of-bounds cells");
        }
        let cells = self.grid.len();
        debug!(cells, "snapshot applied");
        self.emit(SessionEvent::SnapshotLoaded { cells });
    }

    /// Apply one remote mutation, unconditionally replacing any prior entry
    /// for those coordinates — including a local optimistic one.
    pub fn apply_remote(&mut self, record: CellRecord) {
        if self.grid.apply(record.coord(), record.painted()) {
            self.emit(SessionEvent::RemoteCellChanged { cell: record.coord(), team: record.team });
        } else {
            warn!(x = record.x, y = record.y, "dropping out-of-bounds remote cell");
        }
    }

    /// Cache fresh aggregate counts fetched from the store.
    pub fn set_leaderboard(&mut self, entries: Vec<LeaderboardEntry>) {
        self.leaderboard = entries;
        self.emit(SessionEvent::LeaderboardUpdated);
    }

    // --- Clocked internals (explicit `now` for deterministic tests) ---

    fn can_paint_at(&self, now_ms: i64) -> bool {
        self.remaining_at(now_ms) == 0
    }

    fn remaining_at(&self, now_ms: i64) -> i64 {
        match self.last_paint_ms {
            None => 0,
            Some(last) => (self.cooldown_ms - (now_ms - last)).max(0),
        }
    }

    fn request_paint_at(&mut self, cell: CellCoord, now_ms: i64) -> Result<(), PaintError> {
        if self.selected_team.is_none() {
            return Err(PaintError::TeamNotSelected);
        }
        let remaining_ms = self.remaining_at(now_ms);
        if remaining_ms > 0 {
            return Err(PaintError::CooldownActive { remaining_ms });
        }
        if !self.grid.size().contains(cell) {
            return Err(PaintError::OutOfBounds { x: cell.x, y: cell.y });
        }
        self.pending = Some(cell);
        self.emit(SessionEvent::ConfirmationOpened { cell });
        Ok(())
    }

    fn confirm_paint_at(&mut self, cell: CellCoord, now_ms: i64) -> Result<PaintPayload, PaintError> {
        if self.pending != Some(cell) {
            return Err(PaintError::NoPendingConfirmation { x: cell.x, y: cell.y });
        }
        let Some(team) = self.selected_team else {
            return Err(PaintError::TeamNotSelected);
        };
        // The cooldown may have been consumed since the confirmation opened
        // (another window of the same participant, for instance).
        let remaining_ms = self.remaining_at(now_ms);
        if remaining_ms > 0 {
            return Err(PaintError::CooldownActive { remaining_ms });
        }

        self.grid.apply(cell, PaintedCell { team, painted_at_ms: now_ms });
        self.last_paint_ms = Some(now_ms);
        self.prefs.save_last_paint_ms(now_ms);
        self.pending = None;

        self.emit(SessionEvent::CellPainted { cell, team });
        self.emit(SessionEvent::CooldownStarted { until_ms: now_ms + self.cooldown_ms });
        self.emit(SessionEvent::ConfirmationClosed);
        debug!(%cell, %team, "optimistic paint committed");

        Ok(PaintPayload { x: cell.x, y: cell.y, team })
    }

    fn emit(&self, event: SessionEvent) {
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.events.send(event);
    }
}
