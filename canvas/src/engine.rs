//! Canvas controller: composes the viewport transform and the pointer
//! tracker into a single event-driven surface for the host.
//!
//! The host forwards raw pointer/wheel events and receives [`Action`]s back;
//! it never mutates the transform directly. Click-versus-drag resolution
//! lives here: a release is reported as [`Action::CellClicked`] only when
//! the gesture never crossed the drag threshold and the release point maps
//! to an in-bounds cell.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::grid::{CellCoord, GridSize};
use crate::input::{Button, PointerTracker, ReleaseOutcome, WheelDelta};
use crate::viewport::{CellRange, Point, Viewport, ViewportConfig};

/// Result of feeding one input event, for the host to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing the host needs to react to.
    None,
    /// Scale or offset changed; visible content must be redrawn.
    ViewChanged,
    /// The cell under the idle pointer changed (`None` = left the grid).
    HoverChanged(Option<CellCoord>),
    /// A sub-threshold press/release pair landed on an in-bounds cell.
    CellClicked(CellCoord),
}

/// Viewport + pointer state for one canvas surface.
pub struct CanvasController {
    viewport: Viewport,
    tracker: PointerTracker,
    container_width: f64,
    container_height: f64,
    hovered: Option<CellCoord>,
}

impl CanvasController {
    /// Create a controller with the grid centered in the container.
    #[must_use]
    pub fn new(
        config: ViewportConfig,
        drag_threshold_px: f64,
        grid: GridSize,
        container_width: f64,
        container_height: f64,
    ) -> Self {
        let mut viewport = Viewport::new(config, grid);
        viewport.set_default_view(container_width, container_height);
        Self {
            viewport,
            tracker: PointerTracker::new(drag_threshold_px),
            container_width,
            container_height,
            hovered: None,
        }
    }

    // --- Input events ---

    /// Primary-button press starts gesture tracking; other buttons pass.
    pub fn on_pointer_down(&mut self, at: Point, button: Button) -> Action {
        self.tracker.on_press(at, button);
        Action::None
    }

    /// Pointer movement: pans once a drag is confirmed, otherwise updates
    /// the hovered cell. Hover is frozen while a press is being tracked.
    pub fn on_pointer_move(&mut self, at: Point) -> Action {
        use crate::input::MoveOutcome;

        match self.tracker.on_move(at, &mut self.viewport) {
            MoveOutcome::Hovered => {
                let cell = self.viewport.screen_to_grid(at);
                if cell == self.hovered {
                    Action::None
                } else {
                    self.hovered = cell;
                    Action::HoverChanged(cell)
                }
            }
            MoveOutcome::Pending => Action::None,
            MoveOutcome::DragStarted | MoveOutcome::Dragged => Action::ViewChanged,
        }
    }

    /// Pointer release: resolves a click to its cell, or ends a drag.
    pub fn on_pointer_up(&mut self, at: Point) -> Action {
        match self.tracker.on_release(at) {
            ReleaseOutcome::Click(p) => match self.viewport.screen_to_grid(p) {
                Some(cell) => Action::CellClicked(cell),
                None => Action::None,
            },
            ReleaseOutcome::DragEnded | ReleaseOutcome::Ignored => Action::None,
        }
    }

    /// Pointer left the surface: abandon any gesture and clear hover.
    pub fn on_pointer_leave(&mut self) -> Action {
        self.tracker.on_leave();
        if self.hovered.take().is_some() {
            Action::HoverChanged(None)
        } else {
            Action::None
        }
    }

    /// Wheel events always zoom at the pointer, independent of drag state.
    pub fn on_wheel(&mut self, at: Point, delta: WheelDelta) -> Action {
        self.viewport.zoom_at(at, delta.dy);
        Action::ViewChanged
    }

    // --- Viewport control ---

    /// Record a container resize. The transform is left alone; derived
    /// quantities pick up the new size on their next computation.
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container_width = width;
        self.container_height = height;
    }

    /// Re-center the full grid at the starting scale (explicit reset).
    pub fn reset_view(&mut self) -> Action {
        self.viewport.set_default_view(self.container_width, self.container_height);
        Action::ViewChanged
    }

    // --- Queries ---

    /// The current transform.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Cell indices currently intersecting the container.
    #[must_use]
    pub fn visible_cells(&self) -> CellRange {
        self.viewport.visible_cell_range(self.container_width, self.container_height)
    }

    /// The cell under the idle pointer, if any.
    #[must_use]
    pub fn hovered_cell(&self) -> Option<CellCoord> {
        self.hovered
    }

    /// Whether the active gesture has been confirmed as a drag.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }
}
