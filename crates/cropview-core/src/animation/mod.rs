//! Time-driven animations of the placement rectangle and rotation angle.
//!
//! Three animations exist and at most one runs at a time, so they are
//! variants of a single [`ActiveAnimation`]. Each owns its own clock; the
//! clock starts on the first tick it sees, so creating an animation and
//! ticking it are decoupled and tests can drive time explicitly.

mod correction;
mod fling;
mod rotation;

pub use correction::{plan_correction, CorrectionState};
pub use fling::{FlingScroller, FlingState};
pub use rotation::{Degrees, RotationState};

use std::f64::consts::PI;

/// Accelerating easing curve: starts slow, ends fast.
#[inline]
pub fn accelerate(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Ease in and out: slow at both ends.
#[inline]
pub fn accelerate_decelerate(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    ((t + 1.0) * PI).cos() / 2.0 + 0.5
}

/// A fixed-length clock that starts on its first tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    started_at: Option<f64>,
    duration_ms: f64,
}

impl AnimationClock {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            started_at: None,
            duration_ms: duration_ms.max(0.0),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Milliseconds since the first tick.
    pub fn elapsed(&mut self, now_ms: f64) -> f64 {
        let start = *self.started_at.get_or_insert(now_ms);
        (now_ms - start).max(0.0)
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&mut self, now_ms: f64) -> f64 {
        let elapsed = self.elapsed(now_ms);
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed / self.duration_ms).min(1.0)
    }
}

/// The animation currently driving the session, if any.
#[derive(Debug, Clone, Default)]
pub enum ActiveAnimation {
    #[default]
    None,
    Fling(FlingState),
    Correction(CorrectionState),
    Rotation(RotationState),
}

impl ActiveAnimation {
    pub fn is_none(&self) -> bool {
        matches!(self, ActiveAnimation::None)
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self, ActiveAnimation::Rotation(_))
    }

    /// Short name for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            ActiveAnimation::None => "none",
            ActiveAnimation::Fling(_) => "fling",
            ActiveAnimation::Correction(_) => "correction",
            ActiveAnimation::Rotation(_) => "rotation",
        }
    }
}
