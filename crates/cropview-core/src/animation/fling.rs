//! Inertial scrolling after a fast release.
//!
//! Uses the classic spline scroller model: the fling distance and duration
//! follow from the release speed through a gravity-derived deceleration,
//! and position over time follows a precomputed spline that starts at the
//! release speed and eases to a stop.

use std::sync::OnceLock;

use tracing::debug;

use super::AnimationClock;
use crate::config::EngineConfig;
use crate::geometry::{Point, Vector};

const INFLEXION: f64 = 0.35;
const START_TENSION: f64 = 0.5;
const END_TENSION: f64 = 1.0;
const P1: f64 = START_TENSION * INFLEXION;
const P2: f64 = 1.0 - END_TENSION * (1.0 - INFLEXION);
const SPLINE_SAMPLES: usize = 100;

/// Standard gravity in m/s².
const GRAVITY_EARTH: f64 = 9.806_65;
const INCHES_PER_METER: f64 = 39.37;
const BASELINE_PPI: f64 = 160.0;
/// Tuned friction of the physical model, independent of the scroll friction.
const PHYSICAL_FRICTION: f64 = 0.84;

fn deceleration_rate() -> f64 {
    0.78f64.ln() / 0.9f64.ln()
}

/// Normalized distance travelled at each of the spline's sample times.
fn spline_positions() -> &'static [f64; SPLINE_SAMPLES + 1] {
    static TABLE: OnceLock<[f64; SPLINE_SAMPLES + 1]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0.0; SPLINE_SAMPLES + 1];
        let mut x_min = 0.0;
        for (i, slot) in table.iter_mut().take(SPLINE_SAMPLES).enumerate() {
            let alpha = i as f64 / SPLINE_SAMPLES as f64;
            let mut x_max = 1.0;
            // Bisect for the spline parameter whose time coordinate is alpha.
            let (x, coef) = loop {
                let x = x_min + (x_max - x_min) / 2.0;
                let coef = 3.0 * x * (1.0 - x);
                let tx = coef * ((1.0 - x) * P1 + x * P2) + x * x * x;
                if (tx - alpha).abs() < 1e-5 || x_max - x_min < 1e-12 {
                    break (x, coef);
                }
                if tx > alpha {
                    x_max = x;
                } else {
                    x_min = x;
                }
            };
            *slot = coef * ((1.0 - x) * START_TENSION + x) + x * x * x;
        }
        table[SPLINE_SAMPLES] = 1.0;
        table
    })
}

/// Fraction of the total fling distance covered at normalized time `t`.
fn spline_distance(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let table = spline_positions();
    let index = ((SPLINE_SAMPLES as f64 * t) as usize).min(SPLINE_SAMPLES - 1);
    let alpha = index as f64 / SPLINE_SAMPLES as f64;
    let beta = (index + 1) as f64 / SPLINE_SAMPLES as f64;
    let d_inf = table[index];
    let d_sup = table[index + 1];
    d_inf + (t - alpha) / (beta - alpha) * (d_sup - d_inf)
}

/// A decelerating two-dimensional scroll from a start point along a
/// release velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct FlingScroller {
    start: Point,
    end: Point,
    duration_ms: f64,
}

impl FlingScroller {
    /// Plan a fling from `start` with `velocity` in px/s.
    pub fn new(start: Point, velocity: Vector, config: &EngineConfig) -> Self {
        let speed = velocity.length();
        if speed <= 0.0 || !speed.is_finite() {
            return Self {
                start,
                end: start,
                duration_ms: 0.0,
            };
        }

        let physical_coeff =
            GRAVITY_EARTH * INCHES_PER_METER * BASELINE_PPI * config.density * PHYSICAL_FRICTION;
        let friction = config.scroll_friction * physical_coeff;
        let decel = deceleration_rate();
        let l = (INFLEXION * speed / friction).ln();

        let duration_ms = 1000.0 * (l / (decel - 1.0)).exp();
        let distance = friction * (decel / (decel - 1.0) * l).exp();
        let end = start.translate(velocity.scaled(distance / speed));

        Self {
            start,
            end,
            duration_ms,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Where the fling comes to rest.
    pub fn end(&self) -> Point {
        self.end
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Position after `elapsed_ms`.
    pub fn position_at(&self, elapsed_ms: f64) -> Point {
        if self.duration_ms <= 0.0 || elapsed_ms >= self.duration_ms {
            return self.end;
        }
        let fraction = spline_distance(elapsed_ms / self.duration_ms);
        self.start
            .translate(self.end.offset_from(self.start).scaled(fraction))
    }
}

/// A running fling: the scroller plus the position reached on the last tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FlingState {
    scroller: FlingScroller,
    last: Point,
    clock: AnimationClock,
}

impl FlingState {
    pub fn new(start: Point, velocity: Vector, config: &EngineConfig) -> Self {
        let scroller = FlingScroller::new(start, velocity, config);
        debug!(
            vx = velocity.dx,
            vy = velocity.dy,
            duration_ms = scroller.duration_ms(),
            "fling planned"
        );
        Self {
            clock: AnimationClock::new(scroller.duration_ms()),
            last: start,
            scroller,
        }
    }

    pub fn scroller(&self) -> &FlingScroller {
        &self.scroller
    }

    /// Advance to `now_ms`, returning the movement since the last tick and
    /// whether the fling has come to rest.
    pub fn step(&mut self, now_ms: f64) -> (Vector, bool) {
        let elapsed = self.clock.elapsed(now_ms);
        let position = self.scroller.position_at(elapsed);
        let delta = position.offset_from(self.last);
        self.last = position;
        (delta, elapsed >= self.scroller.duration_ms())
    }
}
