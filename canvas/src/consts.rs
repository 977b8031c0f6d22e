//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Starting cell size in screen pixels; `set_default_view` uses this scale.
pub const DEFAULT_CELL_PX: f64 = 16.0;

/// Lower zoom bound (one cell shrinks to a fifth of a pixel).
pub const MIN_SCALE: f64 = 0.2;

/// Upper zoom bound.
pub const MAX_SCALE: f64 = 20.0;

/// Multiplier applied per wheel notch; inverted for zooming out.
pub const ZOOM_STEP_RATIO: f64 = 1.1;

// ── Pointer ─────────────────────────────────────────────────────

/// Euclidean distance in screen pixels a press must travel before it is
/// treated as a drag rather than a click.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;
