//! Crop window sizing and the initial "cover" placement.
//!
//! The crop window is centered in the viewport and never moves during a
//! session. Its size comes from the target aspect ratio and two caps: a
//! fraction of the viewport width and a fraction of the viewport height.
//! Narrow ratios (below `narrow_ratio_threshold`) are sized from the height
//! cap, everything else from the width cap; the other cap is then enforced
//! so the window always fits inside the viewport.
//!
//! The image placement starts as a cover fit: scaled just enough to fill the
//! crop window, centered on it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::geometry::{Rect, Size};

/// Errors from solving a layout.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("Invalid crop ratio: {0}")]
    InvalidRatio(f64),

    #[error("Invalid source dimensions: {width}x{height}")]
    InvalidSource { width: f64, height: f64 },
}

/// Everything derived from viewport, ratio and source size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub viewport: Rect,
    pub crop: Rect,
    /// Initial placement of the image, unrotated.
    pub placement: Rect,
    /// Ceiling on the on-screen image size while zooming in.
    pub max_visible: Size,
}

/// Size and center the crop window for a viewport.
pub fn crop_window(viewport: Size, ratio: f64, config: &EngineConfig) -> Result<Rect, LayoutError> {
    if viewport.is_empty() {
        return Err(LayoutError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(LayoutError::InvalidRatio(ratio));
    }

    let width_cap = viewport.width * config.crop_width_percent;
    let height_cap = viewport.height * config.crop_height_percent;

    let (mut width, mut height) = if ratio < config.narrow_ratio_threshold {
        (height_cap * ratio, height_cap)
    } else {
        (width_cap, width_cap / ratio)
    };
    if width > width_cap {
        width = width_cap;
        height = width / ratio;
    }
    if height > height_cap {
        height = height_cap;
        width = height * ratio;
    }

    Ok(Rect::centered_at(
        Rect::from_size(viewport).center(),
        Size::new(width, height),
    ))
}

/// Place a `source`-sized image so it exactly covers `crop`.
pub fn cover_placement(crop: &Rect, source: Size) -> Result<Rect, LayoutError> {
    if source.is_empty() {
        return Err(LayoutError::InvalidSource {
            width: source.width,
            height: source.height,
        });
    }
    let scale = (source.width / crop.width()).min(source.height / crop.height());
    Ok(Rect::centered_at(
        crop.center(),
        Size::new(source.width / scale, source.height / scale),
    ))
}

/// Zoom ceiling: twice the viewport divided by each percentage cap.
pub fn max_visible_size(viewport: Size, config: &EngineConfig) -> Size {
    Size::new(
        viewport.width * 2.0 / config.crop_width_percent,
        viewport.height * 2.0 / config.crop_height_percent,
    )
}

/// Solve the full layout for a session.
pub fn solve_layout(
    viewport: Size,
    ratio: f64,
    source: Size,
    config: &EngineConfig,
) -> Result<Layout, LayoutError> {
    let crop = crop_window(viewport, ratio, config)?;
    let placement = cover_placement(&crop, source)?;
    Ok(Layout {
        viewport: Rect::from_size(viewport),
        crop,
        placement,
        max_visible: max_visible_size(viewport, config),
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
