//! Grid model: teams, painted cells, and the sparse cell store.
//!
//! A cell is identified by its integer coordinates and owned by at most one
//! team at a time. Unpainted cells are absent from the store rather than
//! stored as a default value. Both local paints and remote feed events flow
//! through the single [`GridStore::apply`] entry point, which enforces the
//! bounds invariant and replace-don't-duplicate semantics.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the five fixed factions a cell can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Pink,
    Orange,
    Purple,
    Green,
}

impl Team {
    /// All teams in display order.
    pub const ALL: [Team; 5] = [Team::Blue, Team::Pink, Team::Orange, Team::Purple, Team::Green];

    /// Lowercase identifier used on the wire and in persisted preferences.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Pink => "pink",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Green => "green",
        }
    }

    /// Human-readable team name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Pink => "Pink",
            Self::Orange => "Orange",
            Self::Purple => "Purple",
            Self::Green => "Green",
        }
    }

    /// Canonical fill color as `#rrggbb`.
    #[must_use]
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::Blue => "#007bff",
            Self::Pink => "#ff69b4",
            Self::Orange => "#ffa500",
            Self::Purple => "#800080",
            Self::Green => "#28a745",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a string that names no known team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTeam(pub String);

impl fmt::Display for UnknownTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown team: {:?}", self.0)
    }
}

impl std::error::Error for UnknownTeam {}

impl FromStr for Team {
    type Err = UnknownTeam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue" => Ok(Self::Blue),
            "pink" => Ok(Self::Pink),
            "orange" => Ok(Self::Orange),
            "purple" => Ok(Self::Purple),
            "green" => Ok(Self::Green),
            other => Err(UnknownTeam(other.to_owned())),
        }
    }
}

/// Integer coordinates of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed grid dimensions, set once at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether signed cell indices fall inside `[0, width) × [0, height)`.
    /// Returns the coordinate when in bounds.
    #[must_use]
    pub fn checked_cell(&self, x: i64, y: i64) -> Option<CellCoord> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        let cell = CellCoord::new(x, y);
        self.contains(cell).then_some(cell)
    }

    /// Whether a cell coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }
}

/// Ownership record for one painted cell. Coordinates live in the store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintedCell {
    /// Owning team.
    pub team: Team,
    /// When the owning paint happened, epoch milliseconds.
    pub painted_at_ms: i64,
}

/// Sparse store of painted cells over a bounded grid.
pub struct GridStore {
    size: GridSize,
    cells: HashMap<CellCoord, PaintedCell>,
}

impl GridStore {
    /// Create an empty store for a grid of the given size.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self { size, cells: HashMap::new() }
    }

    /// The fixed grid dimensions.
    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Insert or replace the entry for a cell. This is the only mutation
    /// entry point; both local optimistic paints and remote feed events go
    /// through it. Returns `false` (and stores nothing) when the coordinates
    /// fall outside the grid.
    pub fn apply(&mut self, coord: CellCoord, cell: PaintedCell) -> bool {
        if !self.size.contains(coord) {
            return false;
        }
        self.cells.insert(coord, cell);
        true
    }

    /// Current entry for a cell, or `None` if unpainted.
    #[must_use]
    pub fn get(&self, coord: CellCoord) -> Option<&PaintedCell> {
        self.cells.get(&coord)
    }

    /// Replace all entries with a full snapshot. Out-of-bounds records are
    /// skipped; returns how many were rejected.
    pub fn load_snapshot(&mut self, records: impl IntoIterator<Item = (CellCoord, PaintedCell)>) -> usize {
        self.cells.clear();
        let mut rejected = 0;
        for (coord, cell) in records {
            if !self.apply(coord, cell) {
                rejected += 1;
            }
        }
        rejected
    }

    /// Iterate over all painted cells in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellCoord, &PaintedCell)> {
        self.cells.iter()
    }

    /// Number of painted cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell has been painted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
