//! Mapping between the unrotated placement frame and screen space.
//!
//! The image is drawn rotated about the crop window's center, while every
//! gesture and every bound is expressed in screen space. Scaling about that
//! same center commutes with the rotation, so a screen-space edit maps back
//! to the placement frame exactly: keep the scale, rotate the translation by
//! the opposite angle.

use super::{Point, Rect, Vector};

/// A scale about the crop center followed by a translation, in screen space.
///
/// The order is fixed: scale first, then translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenEdit {
    pub scale: f64,
    pub translate: Vector,
}

impl Default for ScreenEdit {
    fn default() -> Self {
        Self::identity()
    }
}

impl ScreenEdit {
    pub const fn new(scale: f64, translate: Vector) -> Self {
        Self { scale, translate }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, Vector::ZERO)
    }

    pub const fn translation(translate: Vector) -> Self {
        Self::new(1.0, translate)
    }

    pub fn is_identity(&self) -> bool {
        (self.scale - 1.0).abs() < super::EPSILON && self.translate.is_zero()
    }

    /// The edit reached after `progress` (0.0 to 1.0) of the way from identity.
    pub fn interpolate(&self, progress: f64) -> ScreenEdit {
        ScreenEdit::new(
            1.0 + progress * (self.scale - 1.0),
            self.translate.scaled(progress),
        )
    }

    /// Apply the edit to a screen-space rectangle.
    pub fn apply(&self, rect: &Rect, pivot: Point) -> Rect {
        rect.scale_about(self.scale, pivot).translate(self.translate)
    }
}

/// Screen-space bounds of `placement` drawn at `angle` degrees about `pivot`.
pub fn to_screen(placement: &Rect, angle: f64, pivot: Point) -> Rect {
    placement.rotate_about(angle, pivot)
}

/// Apply a screen-space edit to the unrotated placement rectangle.
pub fn apply_screen_edit(placement: &Rect, edit: &ScreenEdit, angle: f64, pivot: Point) -> Rect {
    placement
        .scale_about(edit.scale, pivot)
        .translate(edit.translate.rotate(-angle))
}
