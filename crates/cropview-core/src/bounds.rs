//! Boundary predicates between the on-screen image and the crop window.
//!
//! Every check here takes the placement *after* rotation (its screen-space
//! bounds), never the unrotated rectangle: the crop window is fixed on
//! screen while the image turns underneath it.

use crate::geometry::{Rect, Size, Vector, EPSILON};

/// The on-screen image bounds paired with the crop window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub screen: Rect,
    pub crop: Rect,
}

impl Coverage {
    pub fn new(screen: Rect, crop: Rect) -> Self {
        Self { screen, crop }
    }

    /// The image covers the whole crop window.
    pub fn covers(&self) -> bool {
        self.screen.contains_rect(&self.crop)
    }

    /// The image is narrower or shorter than the crop window.
    pub fn too_small(&self) -> bool {
        self.screen.width() < self.crop.width() || self.screen.height() < self.crop.height()
    }

    /// The image may still move right: its left edge is beyond the crop's.
    pub fn can_scroll_right(&self) -> bool {
        self.screen.left < self.crop.left
    }

    /// The image may still move left.
    pub fn can_scroll_left(&self) -> bool {
        self.crop.right < self.screen.right
    }

    /// The image may still move up.
    pub fn can_scroll_up(&self) -> bool {
        self.crop.bottom < self.screen.bottom
    }

    /// The image may still move down.
    pub fn can_scroll_down(&self) -> bool {
        self.screen.top < self.crop.top
    }

    /// Zero each velocity component that pushes into an edge already at its limit.
    pub fn filter_velocity(&self, velocity: Vector) -> Vector {
        let dx = if (velocity.dx > 0.0 && !self.can_scroll_right())
            || (velocity.dx < 0.0 && !self.can_scroll_left())
        {
            0.0
        } else {
            velocity.dx
        };
        let dy = if (velocity.dy > 0.0 && !self.can_scroll_down())
            || (velocity.dy < 0.0 && !self.can_scroll_up())
        {
            0.0
        } else {
            velocity.dy
        };
        Vector::new(dx, dy)
    }

    /// Clamp a pan so the leading edge stops exactly at the crop window.
    ///
    /// Moving left stops once the right edge would reach the crop's right
    /// edge; the other three directions are symmetric. Returns the delta that
    /// should actually be applied.
    pub fn clamp_pan(&self, delta: Vector) -> Vector {
        let moved = self.screen.translate(delta);
        let mut applied = delta;

        if delta.dx < 0.0 && moved.right <= self.crop.right {
            applied.dx = self.crop.right - self.screen.right;
        } else if delta.dx > 0.0 && moved.left >= self.crop.left {
            applied.dx = self.crop.left - self.screen.left;
        }

        if delta.dy < 0.0 && moved.bottom <= self.crop.bottom {
            applied.dy = self.crop.bottom - self.screen.bottom;
        } else if delta.dy > 0.0 && moved.top >= self.crop.top {
            applied.dy = self.crop.top - self.screen.top;
        }

        applied
    }
}

/// Largest pinch factor allowed for the current on-screen size.
///
/// Uses the larger of the two axis ratios, so zooming stops once *both*
/// dimensions have reached their caps.
pub fn max_scale(screen: &Rect, max_visible: Size) -> f64 {
    let scale_w = max_visible.width / screen.width();
    let scale_h = max_visible.height / screen.height();
    scale_w.max(scale_h)
}

/// The pinch factor actually applied for a requested finger-distance ratio.
///
/// A ratio that is not a positive finite number leaves the size unchanged.
pub fn pinch_scale(ratio: f64, screen: &Rect, max_visible: Size) -> f64 {
    if !ratio.is_finite() || ratio <= EPSILON {
        return 1.0;
    }
    ratio.min(max_scale(screen, max_visible))
}
