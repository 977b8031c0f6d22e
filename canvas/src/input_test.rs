#![allow(clippy::float_cmp)]

use super::*;

use crate::grid::GridSize;
use crate::viewport::ViewportConfig;

fn tracker() -> PointerTracker {
    PointerTracker::new(crate::consts::DRAG_THRESHOLD_PX)
}

fn viewport() -> Viewport {
    Viewport::new(ViewportConfig::default(), GridSize::new(100, 100))
}

// --- Press ---

#[test]
fn primary_press_starts_tracking() {
    let mut t = tracker();
    assert!(t.on_press(Point::new(10.0, 20.0), Button::Primary));
    assert!(t.is_pressed());
    assert!(!t.is_dragging());
    assert_eq!(
        t.state(),
        PointerState::Pressed { origin: Point::new(10.0, 20.0), last: Point::new(10.0, 20.0) }
    );
}

#[test]
fn non_primary_buttons_are_ignored() {
    let mut t = tracker();
    assert!(!t.on_press(Point::new(0.0, 0.0), Button::Middle));
    assert!(!t.on_press(Point::new(0.0, 0.0), Button::Secondary));
    assert_eq!(t.state(), PointerState::Idle);
}

// --- Drag confirmation threshold ---

#[test]
fn sub_threshold_move_stays_unconfirmed() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(0.0, 0.0), Button::Primary);

    // Distance ~4.24 from the origin: under the 5 px threshold.
    let outcome = t.on_move(Point::new(3.0, 3.0), &mut v);
    assert_eq!(outcome, MoveOutcome::Pending);
    assert!(!t.is_dragging());
    assert_eq!(v.offset_x, 0.0);
    assert_eq!(v.offset_y, 0.0);
}

#[test]
fn crossing_threshold_confirms_and_pans_accumulated_delta() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(0.0, 0.0), Button::Primary);
    t.on_move(Point::new(3.0, 3.0), &mut v);

    let outcome = t.on_move(Point::new(10.0, 10.0), &mut v);
    assert_eq!(outcome, MoveOutcome::DragStarted);
    assert!(t.is_dragging());
    // The whole origin-to-here delta lands at once.
    assert_eq!(v.offset_x, 10.0);
    assert_eq!(v.offset_y, 10.0);
}

#[test]
fn distance_exactly_at_threshold_does_not_confirm() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(0.0, 0.0), Button::Primary);
    // A 3-4-5 triangle: distance is exactly 5.0.
    assert_eq!(t.on_move(Point::new(3.0, 4.0), &mut v), MoveOutcome::Pending);
    assert!(!t.is_dragging());
}

#[test]
fn distance_is_euclidean_not_per_axis() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(0.0, 0.0), Button::Primary);
    // 4 px on each axis is under 5 per axis but 5.66 diagonally.
    assert_eq!(t.on_move(Point::new(4.0, 4.0), &mut v), MoveOutcome::DragStarted);
}

// --- Confirmed drag ---

#[test]
fn confirmed_drag_pans_incrementally() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(0.0, 0.0), Button::Primary);
    t.on_move(Point::new(10.0, 0.0), &mut v);
    assert_eq!(t.on_move(Point::new(15.0, -5.0), &mut v), MoveOutcome::Dragged);
    assert_eq!(v.offset_x, 15.0);
    assert_eq!(v.offset_y, -5.0);
}

// --- Release ---

#[test]
fn sub_threshold_release_is_a_click_with_transform_untouched() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(100.0, 100.0), Button::Primary);
    t.on_move(Point::new(102.0, 101.0), &mut v);

    assert_eq!(
        t.on_release(Point::new(102.0, 101.0)),
        ReleaseOutcome::Click(Point::new(102.0, 101.0))
    );
    assert_eq!(t.state(), PointerState::Idle);
    assert_eq!(v.offset_x, 0.0);
    assert_eq!(v.offset_y, 0.0);
}

#[test]
fn release_after_drag_is_not_a_click() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(0.0, 0.0), Button::Primary);
    t.on_move(Point::new(20.0, 20.0), &mut v);
    assert_eq!(t.on_release(Point::new(20.0, 20.0)), ReleaseOutcome::DragEnded);
    assert_eq!(t.state(), PointerState::Idle);
}

#[test]
fn release_without_press_is_ignored() {
    let mut t = tracker();
    assert_eq!(t.on_release(Point::new(0.0, 0.0)), ReleaseOutcome::Ignored);
}

// --- Pointer leave ---

#[test]
fn leave_mid_drag_stops_panning() {
    let mut t = tracker();
    let mut v = viewport();
    t.on_press(Point::new(0.0, 0.0), Button::Primary);
    t.on_move(Point::new(20.0, 20.0), &mut v);
    t.on_leave();

    assert_eq!(t.state(), PointerState::Idle);
    let offset = v.offset_x;
    assert_eq!(t.on_move(Point::new(50.0, 50.0), &mut v), MoveOutcome::Hovered);
    assert_eq!(v.offset_x, offset);
}

#[test]
fn move_while_idle_only_hovers() {
    let mut t = tracker();
    let mut v = viewport();
    assert_eq!(t.on_move(Point::new(5.0, 5.0), &mut v), MoveOutcome::Hovered);
    assert_eq!(v.offset_x, 0.0);
}
