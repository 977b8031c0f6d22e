//! Wire types shared with the remote store.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use canvas::grid::{CellCoord, PaintedCell, Team};
use serde::{Deserialize, Serialize};

/// One painted cell as delivered by the snapshot fetch and the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub x: u32,
    pub y: u32,
    pub team: Team,
    /// When the cell was painted, epoch milliseconds.
    pub painted_at_ms: i64,
}

impl CellRecord {
    #[must_use]
    pub fn new(x: u32, y: u32, team: Team, painted_at_ms: i64) -> Self {
        Self { x, y, team, painted_at_ms }
    }

    /// The record's coordinates as the engine's coordinate type.
    #[must_use]
    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.x, self.y)
    }

    /// The record's ownership payload for the grid store.
    #[must_use]
    pub fn painted(&self) -> PaintedCell {
        PaintedCell { team: self.team, painted_at_ms: self.painted_at_ms }
    }
}

/// Paint intent submitted to the remote store. Idempotent there: repeated
/// submission for the same coordinates simply overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintPayload {
    pub x: u32,
    pub y: u32,
    pub team: Team,
}

/// Aggregate cell count for one team, as computed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub team: Team,
    pub count: u64,
}
