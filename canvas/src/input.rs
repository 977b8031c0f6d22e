//! Input model: mouse buttons, wheel deltas, and the drag/click gesture
//! state machine.
//!
//! A press does not immediately commit to being a pan: the tracker holds the
//! gesture in [`PointerState::Pressed`] until the pointer travels past a
//! pixel threshold from its origin. Movement while unconfirmed leaves the
//! viewport untouched, so a sub-threshold press/release pair reads as a
//! clean click; the confirming move applies the full accumulated delta so no
//! motion is lost. This is an explicit two-state disambiguation, not a
//! timing heuristic.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::viewport::{Point, Viewport};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down = zoom out).
    pub dy: f64,
}

/// Active gesture being tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    /// No gesture in progress; waiting for the next primary press.
    #[default]
    Idle,
    /// Primary button is down but the press has not yet been confirmed as a
    /// drag; releasing now is a click.
    Pressed {
        /// Screen position of the press, the drag-confirmation reference.
        origin: Point,
        /// Screen position of the most recent pointer event.
        last: Point,
    },
    /// The press exceeded the drag threshold; every move pans the viewport
    /// and the eventual release is not a click.
    Dragging {
        /// Screen position of the previous pointer event, used to compute
        /// the incremental pan delta.
        last: Point,
    },
}

/// What a pointer-move did to the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No gesture in progress; the move only affects hover state.
    Hovered,
    /// Press still unconfirmed; position recorded, viewport untouched.
    Pending,
    /// This move crossed the drag threshold; the accumulated delta from the
    /// press origin was applied to the viewport.
    DragStarted,
    /// Already dragging; the incremental delta was applied.
    Dragged,
}

/// What a pointer-release means for the consumer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// No press was being tracked.
    Ignored,
    /// Press and release stayed under the drag threshold: a click at the
    /// release position.
    Click(Point),
    /// A confirmed drag ended; not a click.
    DragEnded,
}

/// Pointer gesture tracker driving viewport pan mutations.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    state: PointerState,
    threshold_px: f64,
}

impl PointerTracker {
    /// Create an idle tracker with the given drag-confirmation threshold.
    #[must_use]
    pub fn new(threshold_px: f64) -> Self {
        Self { state: PointerState::Idle, threshold_px }
    }

    /// Current gesture state.
    #[must_use]
    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Whether the current gesture has been confirmed as a drag. Consumers
    /// use this to suppress the click interpretation of a release.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging { .. })
    }

    /// Whether any press is being tracked (confirmed or not).
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        !matches!(self.state, PointerState::Idle)
    }

    /// Begin tracking a press. Only the primary button starts a gesture;
    /// other buttons are ignored. Returns `true` when tracking began.
    pub fn on_press(&mut self, at: Point, button: Button) -> bool {
        if button != Button::Primary {
            return false;
        }
        self.state = PointerState::Pressed { origin: at, last: at };
        true
    }

    /// Feed a pointer move, panning `viewport` once the drag is confirmed.
    pub fn on_move(&mut self, at: Point, viewport: &mut Viewport) -> MoveOutcome {
        match self.state {
            PointerState::Idle => MoveOutcome::Hovered,
            PointerState::Pressed { origin, .. } => {
                let dx = at.x - origin.x;
                let dy = at.y - origin.y;
                if (dx * dx + dy * dy).sqrt() > self.threshold_px {
                    viewport.pan_by(dx, dy);
                    self.state = PointerState::Dragging { last: at };
                    MoveOutcome::DragStarted
                } else {
                    self.state = PointerState::Pressed { origin, last: at };
                    MoveOutcome::Pending
                }
            }
            PointerState::Dragging { last } => {
                viewport.pan_by(at.x - last.x, at.y - last.y);
                self.state = PointerState::Dragging { last: at };
                MoveOutcome::Dragged
            }
        }
    }

    /// End the gesture on button release.
    pub fn on_release(&mut self, at: Point) -> ReleaseOutcome {
        let outcome = match self.state {
            PointerState::Idle => ReleaseOutcome::Ignored,
            PointerState::Pressed { .. } => ReleaseOutcome::Click(at),
            PointerState::Dragging { .. } => ReleaseOutcome::DragEnded,
        };
        self.state = PointerState::Idle;
        outcome
    }

    /// Abandon the gesture without a release (pointer left the surface).
    /// Stops further pan deltas; has no other effect on the viewport.
    pub fn on_leave(&mut self) {
        self.state = PointerState::Idle;
    }
}
