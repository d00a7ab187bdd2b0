//! Touch gesture classification.
//!
//! Raw touch events are folded into a [`GesturePhase`] by a pure
//! [`transition`] function, which also reports the [`GestureAction`] the
//! session should apply. [`GestureSession`] wraps that with the per-sequence
//! bookkeeping: whether a sequence is in progress and the release velocity.
//!
//! # Phases
//!
//! ```text
//! Idle ──Down──▶ SinglePoint ──PointerDown──▶ DoublePoint
//!   ▲                 │                            │
//!   └──PointerUp/Up───┘◀────────PointerUp/Up───────┘ (always back to Idle)
//! ```
//!
//! Lifting one finger of a pinch ends the gesture: the phase returns to
//! `Idle`, not `SinglePoint`, and nothing moves until every finger is up and
//! a new sequence starts.

mod state;
mod velocity;

pub use state::{transition, GestureAction, GesturePhase, TouchAction, TouchEvent};
pub use velocity::VelocityTracker;

use tracing::debug;

use crate::geometry::Vector;

/// Per-sequence gesture state.
#[derive(Debug, Clone)]
pub struct GestureSession {
    phase: GesturePhase,
    in_sequence: bool,
    velocity: VelocityTracker,
}

impl GestureSession {
    pub fn new(velocity_horizon_ms: f64) -> Self {
        Self {
            phase: GesturePhase::Idle,
            in_sequence: false,
            velocity: VelocityTracker::new(velocity_horizon_ms),
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// True between a `Down` and the matching `Up`/`Cancel`.
    pub fn in_sequence(&self) -> bool {
        self.in_sequence
    }

    /// Feed one event and get back what the session should do with it.
    ///
    /// `Up` or `Cancel` without a preceding `Down` is ignored.
    pub fn handle(&mut self, event: &TouchEvent) -> GestureAction {
        let (next, action) = transition(self.phase, event);

        if action == GestureAction::Begin {
            self.in_sequence = true;
        }
        match event.action {
            // The finger set changed, so the primary point of the next event
            // may belong to another finger. Start the estimate over from it.
            TouchAction::PointerDown | TouchAction::PointerUp => self.velocity.clear(),
            TouchAction::Down => {
                self.velocity.clear();
                self.track(event);
            }
            _ => self.track(event),
        }
        if next != self.phase {
            debug!(from = ?self.phase, to = ?next, action = ?event.action, "gesture phase");
        }
        self.phase = next;

        match action {
            GestureAction::Release | GestureAction::Cancel if !self.in_sequence => {
                GestureAction::None
            }
            GestureAction::Release | GestureAction::Cancel => {
                self.in_sequence = false;
                action
            }
            _ => action,
        }
    }

    fn track(&mut self, event: &TouchEvent) {
        if let Some(point) = event.primary() {
            self.velocity.add(point, event.time_ms);
        }
    }

    /// Release velocity in px/s, clamped per axis to `max_velocity`.
    pub fn release_velocity(&self, max_velocity: f64) -> Vector {
        self.velocity.velocity(max_velocity)
    }

    /// Drop any in-progress sequence.
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
        self.in_sequence = false;
        self.velocity.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn event(action: TouchAction, points: &[(f64, f64)], time_ms: f64) -> TouchEvent {
        TouchEvent::new(
            action,
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            time_ms,
        )
    }

    #[test]
    fn test_up_without_down_is_ignored() {
        let mut session = GestureSession::new(100.0);
        let action = session.handle(&event(TouchAction::Up, &[(0.0, 0.0)], 0.0));
        assert_eq!(action, GestureAction::None);
    }

    #[test]
    fn test_full_sequence_reports_release() {
        let mut session = GestureSession::new(100.0);
        assert_eq!(
            session.handle(&event(TouchAction::Down, &[(0.0, 0.0)], 0.0)),
            GestureAction::Begin
        );
        assert!(session.in_sequence());
        assert_eq!(
            session.handle(&event(TouchAction::Move, &[(10.0, 0.0)], 10.0)),
            GestureAction::Pan(Vector::new(10.0, 0.0))
        );
        assert_eq!(
            session.handle(&event(TouchAction::Up, &[(10.0, 0.0)], 20.0)),
            GestureAction::Release
        );
        assert!(!session.in_sequence());
        // A second Up is stray.
        assert_eq!(
            session.handle(&event(TouchAction::Up, &[(10.0, 0.0)], 30.0)),
            GestureAction::None
        );
    }

    #[test]
    fn test_release_after_pinch_drop_still_releases() {
        let mut session = GestureSession::new(100.0);
        session.handle(&event(TouchAction::Down, &[(0.0, 0.0)], 0.0));
        session.handle(&event(TouchAction::PointerDown, &[(0.0, 0.0), (100.0, 0.0)], 5.0));
        session.handle(&event(TouchAction::PointerUp, &[(0.0, 0.0), (100.0, 0.0)], 10.0));
        assert_eq!(session.phase(), GesturePhase::Idle);
        assert_eq!(
            session.handle(&event(TouchAction::Up, &[(0.0, 0.0)], 15.0)),
            GestureAction::Release
        );
    }

    #[test]
    fn test_release_velocity_tracks_movement() {
        let mut session = GestureSession::new(100.0);
        session.handle(&event(TouchAction::Down, &[(0.0, 0.0)], 0.0));
        session.handle(&event(TouchAction::Move, &[(20.0, 0.0)], 10.0));
        session.handle(&event(TouchAction::Move, &[(40.0, 0.0)], 20.0));
        session.handle(&event(TouchAction::Up, &[(40.0, 0.0)], 20.0));
        let v = session.release_velocity(8000.0);
        assert!((v.dx - 2000.0).abs() < 1e-9);
        assert_eq!(v.dy, 0.0);
    }

    #[test]
    fn test_lifting_a_finger_restarts_velocity() {
        let mut session = GestureSession::new(100.0);
        session.handle(&event(TouchAction::Down, &[(300.0, 1000.0)], 0.0));
        session.handle(&event(
            TouchAction::PointerDown,
            &[(300.0, 1000.0), (700.0, 1000.0)],
            10.0,
        ));
        session.handle(&event(
            TouchAction::PointerUp,
            &[(300.0, 1000.0), (700.0, 1000.0)],
            20.0,
        ));
        // The remaining finger is now primary; it has not moved.
        session.handle(&event(TouchAction::Move, &[(700.0, 1000.0)], 30.0));
        session.handle(&event(TouchAction::Up, &[(700.0, 1000.0)], 40.0));
        assert_eq!(session.release_velocity(8000.0), Vector::ZERO);
    }

    #[test]
    fn test_second_finger_restarts_velocity() {
        let mut session = GestureSession::new(100.0);
        session.handle(&event(TouchAction::Down, &[(0.0, 0.0)], 0.0));
        session.handle(&event(TouchAction::Move, &[(50.0, 0.0)], 10.0));
        session.handle(&event(TouchAction::PointerDown, &[(50.0, 0.0), (90.0, 0.0)], 20.0));
        session.handle(&event(TouchAction::Move, &[(50.0, 0.0), (90.0, 0.0)], 30.0));
        session.handle(&event(TouchAction::Move, &[(50.0, 0.0), (90.0, 0.0)], 40.0));
        assert_eq!(session.release_velocity(8000.0), Vector::ZERO);
    }

    #[test]
    fn test_reset_clears_sequence() {
        let mut session = GestureSession::new(100.0);
        session.handle(&event(TouchAction::Down, &[(0.0, 0.0)], 0.0));
        session.reset();
        assert_eq!(session.phase(), GesturePhase::Idle);
        assert!(!session.in_sequence());
    }
}
