//! Release velocity estimation.

use std::collections::VecDeque;

use crate::geometry::{Point, Vector};

#[derive(Debug, Clone, Copy)]
struct Sample {
    point: Point,
    time_ms: f64,
}

/// Tracks recent pointer positions and reports their velocity.
///
/// Only samples within `horizon_ms` of the newest one are kept, so a finger
/// that rests before lifting reports little or no velocity.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
    horizon_ms: f64,
}

impl VelocityTracker {
    pub fn new(horizon_ms: f64) -> Self {
        Self {
            samples: VecDeque::new(),
            horizon_ms,
        }
    }

    pub fn add(&mut self, point: Point, time_ms: f64) {
        // Out-of-order timestamps restart the estimate.
        if self
            .samples
            .back()
            .is_some_and(|last| time_ms < last.time_ms)
        {
            self.samples.clear();
        }
        self.samples.push_back(Sample { point, time_ms });
        while self
            .samples
            .front()
            .is_some_and(|first| time_ms - first.time_ms > self.horizon_ms)
        {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Velocity in px/s between the oldest and newest retained samples.
    pub fn velocity(&self, max_velocity: f64) -> Vector {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return Vector::ZERO;
        };
        let dt_ms = last.time_ms - first.time_ms;
        if dt_ms <= 0.0 {
            return Vector::ZERO;
        }
        let per_second = 1000.0 / dt_ms;
        let v = last.point.offset_from(first.point).scaled(per_second);
        Vector::new(
            v.dx.clamp(-max_velocity, max_velocity),
            v.dy.clamp(-max_velocity, max_velocity),
        )
    }
}
