//! Engine tuning knobs.

use serde::{Deserialize, Serialize};

/// Minimum fling velocity in density-independent pixels per second.
pub const MIN_FLING_VELOCITY_DP: f64 = 50.0;

/// Maximum fling velocity in density-independent pixels per second.
pub const MAX_FLING_VELOCITY_DP: f64 = 8_000.0;

/// Configuration for a crop session.
///
/// The defaults reproduce the stock widget: a crop window of at most 85% of
/// the viewport width and 45% of its height, 200 ms animations, and fling
/// thresholds for a baseline (160 dpi) display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Crop window width cap as a fraction of the viewport width.
    pub crop_width_percent: f64,
    /// Crop window height cap as a fraction of the viewport height.
    pub crop_height_percent: f64,
    /// Ratios below this size the crop window from the height cap.
    pub narrow_ratio_threshold: f64,
    pub correction_duration_ms: f64,
    pub rotation_duration_ms: f64,
    /// Display density (1.0 = 160 dpi).
    pub density: f64,
    /// Release velocity (px/s) below which no fling starts.
    pub min_fling_velocity: f64,
    /// Release velocity (px/s) is clamped to this per axis.
    pub max_fling_velocity: f64,
    pub scroll_friction: f64,
    /// How far back the velocity tracker looks, in milliseconds.
    pub velocity_horizon_ms: f64,
    /// Skip the correction animation when the crop window is already covered.
    ///
    /// Off by default: the correction also snaps edges that merely overshoot,
    /// so it always runs unless asked otherwise.
    pub skip_correction_when_covered: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crop_width_percent: 0.85,
            crop_height_percent: 0.45,
            narrow_ratio_threshold: 0.5,
            correction_duration_ms: 200.0,
            rotation_duration_ms: 200.0,
            density: 1.0,
            min_fling_velocity: MIN_FLING_VELOCITY_DP,
            max_fling_velocity: MAX_FLING_VELOCITY_DP,
            scroll_friction: 0.015,
            velocity_horizon_ms: 100.0,
            skip_correction_when_covered: false,
        }
    }
}

impl EngineConfig {
    /// Defaults with fling thresholds scaled for a display density.
    pub fn for_density(density: f64) -> Self {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        Self {
            density,
            min_fling_velocity: MIN_FLING_VELOCITY_DP * density,
            max_fling_velocity: MAX_FLING_VELOCITY_DP * density,
            ..Self::default()
        }
    }
}
