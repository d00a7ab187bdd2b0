//! Touch events and the pure phase transition function.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Vector, EPSILON};

/// What happened to the pointers in a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchAction {
    /// First finger down.
    Down,
    /// An additional finger down.
    PointerDown,
    Move,
    /// A finger lifted while others remain.
    PointerUp,
    /// Last finger lifted.
    Up,
    /// The host took the touch stream away.
    Cancel,
}

/// One touch event with every pointer currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub points: Vec<Point>,
    pub time_ms: f64,
}

impl TouchEvent {
    pub fn new(action: TouchAction, points: Vec<Point>, time_ms: f64) -> Self {
        Self {
            action,
            points,
            time_ms,
        }
    }

    /// The first pointer, if any.
    pub fn primary(&self) -> Option<Point> {
        self.points.first().copied()
    }

    fn pair(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        }
    }
}

/// Where a touch sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    SinglePoint {
        last: Point,
    },
    DoublePoint {
        first: Point,
        second: Point,
    },
}

/// What the session should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    None,
    /// A new sequence started: stop any fling or correction.
    Begin,
    /// Move the image by this screen-space delta.
    Pan(Vector),
    /// Scale about the crop center by `ratio`, then translate by `shift`.
    Pinch { ratio: f64, shift: Vector },
    /// All fingers lifted.
    Release,
    /// The sequence was cancelled by the host.
    Cancel,
}

/// Advance the gesture phase by one event.
///
/// Malformed sequences (a move with no prior down, a second finger while
/// idle) leave the phase alone and produce [`GestureAction::None`].
pub fn transition(phase: GesturePhase, event: &TouchEvent) -> (GesturePhase, GestureAction) {
    match (event.action, phase) {
        (TouchAction::Down, _) => match event.primary() {
            Some(last) => (GesturePhase::SinglePoint { last }, GestureAction::Begin),
            None => (phase, GestureAction::None),
        },

        // A second finger only counts while a gesture is live; after a
        // pinch was broken the user must lift everything first.
        (TouchAction::PointerDown, GesturePhase::Idle) => (phase, GestureAction::None),
        (TouchAction::PointerDown, _) => match event.pair() {
            Some((first, second)) => (
                GesturePhase::DoublePoint { first, second },
                GestureAction::None,
            ),
            None => (phase, GestureAction::None),
        },

        (TouchAction::Move, GesturePhase::Idle) => (phase, GestureAction::None),
        (TouchAction::Move, GesturePhase::SinglePoint { last }) => match event.primary() {
            Some(current) => (
                GesturePhase::SinglePoint { last: current },
                GestureAction::Pan(current.offset_from(last)),
            ),
            None => (phase, GestureAction::None),
        },
        (TouchAction::Move, GesturePhase::DoublePoint { first, second }) => match event.pair() {
            Some((current_first, current_second)) => {
                let previous_distance = first.distance_to(second);
                let current_distance = current_first.distance_to(current_second);
                // Coincident fingers carry no scale information.
                let ratio = if previous_distance > EPSILON && current_distance > EPSILON {
                    current_distance / previous_distance
                } else {
                    1.0
                };
                let shift = current_first
                    .midpoint(current_second)
                    .offset_from(first.midpoint(second));
                (
                    GesturePhase::DoublePoint {
                        first: current_first,
                        second: current_second,
                    },
                    GestureAction::Pinch { ratio, shift },
                )
            }
            None => (phase, GestureAction::None),
        },

        (TouchAction::PointerUp, _) => (GesturePhase::Idle, GestureAction::None),
        (TouchAction::Up, _) => (GesturePhase::Idle, GestureAction::Release),
        (TouchAction::Cancel, _) => (GesturePhase::Idle, GestureAction::Cancel),
    }
}
