//! Quarter-turn rotation targets and the rotation tween.

use serde::{Deserialize, Serialize};

use super::{accelerate, AnimationClock};

/// The discrete rotation targets.
///
/// `D360` is distinct from `D0` so that cycling through the targets keeps
/// turning the same way; the two are equivalent on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Degrees {
    #[default]
    D0,
    D90,
    D180,
    D270,
    D360,
}

impl Degrees {
    pub const ALL: [Degrees; 5] = [
        Degrees::D0,
        Degrees::D90,
        Degrees::D180,
        Degrees::D270,
        Degrees::D360,
    ];

    pub fn as_degrees(self) -> f64 {
        match self {
            Degrees::D0 => 0.0,
            Degrees::D90 => 90.0,
            Degrees::D180 => 180.0,
            Degrees::D270 => 270.0,
            Degrees::D360 => 360.0,
        }
    }

    /// The next target when cycling through all five, wrapping to `D0`.
    pub fn next(self) -> Degrees {
        match self {
            Degrees::D0 => Degrees::D90,
            Degrees::D90 => Degrees::D180,
            Degrees::D180 => Degrees::D270,
            Degrees::D270 => Degrees::D360,
            Degrees::D360 => Degrees::D0,
        }
    }

    /// Look up a target from a whole number of degrees.
    pub fn from_degrees(degrees: u32) -> Option<Degrees> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_degrees() == f64::from(degrees))
    }
}

/// A running rotation from the current angle to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationState {
    from: f64,
    to: Degrees,
    clock: AnimationClock,
}

impl RotationState {
    /// Start turning from `current` (the live, possibly mid-tween angle).
    ///
    /// Going from a full turn back to `D0` is not animated as a reverse
    /// spin: a current angle of 360 is treated as 0.
    pub fn new(current: f64, to: Degrees, duration_ms: f64) -> Self {
        let from = if to == Degrees::D0 && (current - 360.0).abs() < 1e-9 {
            0.0
        } else {
            current
        };
        Self {
            from,
            to,
            clock: AnimationClock::new(duration_ms),
        }
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn target(&self) -> Degrees {
        self.to
    }

    /// The interpolated angle at `now_ms` and whether the turn is complete.
    pub fn step(&mut self, now_ms: f64) -> (f64, bool) {
        let linear = self.clock.progress(now_ms);
        let to = self.to.as_degrees();
        if linear >= 1.0 {
            return (to, true);
        }
        (self.from + (to - self.from) * accelerate(linear), false)
    }
}
