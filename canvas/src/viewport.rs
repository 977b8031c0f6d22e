//! Viewport transform: pan/zoom state and screen↔grid coordinate mapping.
//!
//! The viewport maps the bounded cell grid onto an unbounded screen-space
//! pan/zoom plane. `scale` is the size of one cell in screen pixels;
//! `offset_x` / `offset_y` locate the grid origin in screen space. All
//! derived quantities (cell under a point, visible cell range) are computed
//! on demand from these three primitives so there is no second copy of the
//! transform that can drift.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{DEFAULT_CELL_PX, MAX_SCALE, MIN_SCALE, ZOOM_STEP_RATIO};
use crate::grid::{CellCoord, GridSize};

/// A point in screen space (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Zoom and centering tunables for a [`Viewport`].
#[derive(Debug, Clone, Copy)]
pub struct ViewportConfig {
    /// Cell size in pixels used by [`Viewport::set_default_view`].
    pub default_cell_px: f64,
    /// Smallest permitted scale.
    pub min_scale: f64,
    /// Largest permitted scale.
    pub max_scale: f64,
    /// Per-notch zoom multiplier; must be > 1 (inverted for zoom-out).
    pub zoom_step_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            default_cell_px: DEFAULT_CELL_PX,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step_ratio: ZOOM_STEP_RATIO,
        }
    }
}

/// The integer rectangle of cell indices intersecting the container.
///
/// `col_end` / `row_end` are exclusive. The range is always clamped to grid
/// bounds; a viewport panned fully off the grid yields an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub col_start: u32,
    pub col_end: u32,
    pub row_start: u32,
    pub row_end: u32,
}

impl CellRange {
    /// True when no cells intersect the container.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.col_start >= self.col_end || self.row_start >= self.row_end
    }

    /// Whether a cell lies inside the range.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        (self.col_start..self.col_end).contains(&cell.x) && (self.row_start..self.row_end).contains(&cell.y)
    }

    /// Number of cells covered by the range.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        u64::from(self.col_end - self.col_start) * u64::from(self.row_end - self.row_start)
    }
}

/// Pan/zoom transform from grid space to screen space.
///
/// Fields are public in the spirit of a plain value type, but every mutating
/// operation re-clamps `scale` into the configured range; reads tolerate an
/// externally poked invalid scale by substituting the clamped value.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Cell size in screen pixels.
    pub scale: f64,
    /// Screen-space x of the grid origin.
    pub offset_x: f64,
    /// Screen-space y of the grid origin.
    pub offset_y: f64,
    config: ViewportConfig,
    grid: GridSize,
}

impl Viewport {
    /// Create a viewport at the default cell size with the grid origin at the
    /// screen origin. Call [`Viewport::set_default_view`] to center the grid.
    #[must_use]
    pub fn new(config: ViewportConfig, grid: GridSize) -> Self {
        let mut vp = Self {
            scale: config.default_cell_px,
            offset_x: 0.0,
            offset_y: 0.0,
            config,
            grid,
        };
        vp.scale = vp.clamped(vp.scale);
        vp
    }

    /// The grid dimensions this viewport maps.
    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Reset to the starting scale and center the full grid in a container of
    /// the given size. Idempotent: identical inputs yield bit-identical state.
    pub fn set_default_view(&mut self, container_width: f64, container_height: f64) {
        self.scale = self.clamped(self.config.default_cell_px);
        self.offset_x = (container_width - f64::from(self.grid.width) * self.scale) / 2.0;
        self.offset_y = (container_height - f64::from(self.grid.height) * self.scale) / 2.0;
    }

    /// Zoom by one step toward or away from `anchor`, keeping the grid point
    /// under the anchor visually fixed.
    ///
    /// `wheel_delta_y > 0` (scroll down) zooms out; anything else zooms in.
    pub fn zoom_at(&mut self, anchor: Point, wheel_delta_y: f64) {
        let old_scale = self.effective_scale();
        let ratio = if wheel_delta_y > 0.0 {
            1.0 / self.config.zoom_step_ratio
        } else {
            self.config.zoom_step_ratio
        };
        let new_scale = self.clamped(old_scale * ratio);
        let change = new_scale / old_scale;

        self.offset_x = anchor.x - (anchor.x - self.offset_x) * change;
        self.offset_y = anchor.y - (anchor.y - self.offset_y) * change;
        self.scale = new_scale;
    }

    /// Shift the view by a screen-space delta. Unclamped: panning beyond the
    /// grid is allowed so the view can be re-centered from any state.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// The cell under a screen-space point, or `None` outside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn screen_to_grid(&self, p: Point) -> Option<CellCoord> {
        let scale = self.effective_scale();
        let col = ((p.x - self.offset_x) / scale).floor();
        let row = ((p.y - self.offset_y) / scale).floor();
        if !col.is_finite() || !row.is_finite() {
            return None;
        }
        // f64-to-int conversion saturates, which the bounds check absorbs.
        self.grid.checked_cell(col as i64, row as i64)
    }

    /// Screen-space position of a cell's top-left corner.
    #[must_use]
    pub fn cell_origin_screen(&self, cell: CellCoord) -> Point {
        let scale = self.effective_scale();
        Point {
            x: f64::from(cell.x) * scale + self.offset_x,
            y: f64::from(cell.y) * scale + self.offset_y,
        }
    }

    /// Cell indices intersecting a container of the given size, clamped to
    /// grid bounds. Recomputed from primitive state on every call.
    #[must_use]
    pub fn visible_cell_range(&self, container_width: f64, container_height: f64) -> CellRange {
        let scale = self.effective_scale();
        let col_start = clamp_axis((-self.offset_x / scale).floor(), self.grid.width);
        let col_end = clamp_axis(((-self.offset_x + container_width) / scale).ceil(), self.grid.width);
        let row_start = clamp_axis((-self.offset_y / scale).floor(), self.grid.height);
        let row_end = clamp_axis(((-self.offset_y + container_height) / scale).ceil(), self.grid.height);

        CellRange {
            col_start,
            col_end: col_end.max(col_start),
            row_start,
            row_end: row_end.max(row_start),
        }
    }

    /// `scale` forced into the configured range; shields reads from a
    /// non-finite or non-positive value written directly to the field.
    fn effective_scale(&self) -> f64 {
        self.clamped(self.scale)
    }

    fn clamped(&self, scale: f64) -> f64 {
        if !scale.is_finite() || scale <= 0.0 {
            self.config.min_scale
        } else {
            scale.clamp(self.config.min_scale, self.config.max_scale)
        }
    }
}

/// Clamp a fractional cell index into `[0, limit]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_axis(raw: f64, limit: u32) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    if raw >= f64::from(limit) {
        return limit;
    }
    raw as u32
}
