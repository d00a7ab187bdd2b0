//! Animated restoration of crop-window coverage.

use super::{accelerate_decelerate, AnimationClock};
use crate::geometry::{apply_screen_edit, Point, Rect, ScreenEdit, Vector, EPSILON};

/// The screen-space edit that makes `screen` cover `crop` again.
///
/// The image only ever grows: the scale is the smallest factor `>= 1` that
/// makes it at least as large as the crop window on both axes. After
/// scaling about the crop center, each axis is shifted just enough to close
/// a gap on that axis; an edge that already covers its side is left alone.
///
/// Returns `None` for a collapsed or non-finite `screen`, which no scale
/// can restore.
pub fn plan_correction(screen: &Rect, crop: &Rect) -> Option<ScreenEdit> {
    if screen.is_empty() || screen.width() <= EPSILON || screen.height() <= EPSILON {
        return None;
    }
    let scale = 1f64
        .max(crop.height() / screen.height())
        .max(crop.width() / screen.width());
    let scaled = screen.scale_about(scale, crop.center());

    let mut dx = 0.0;
    if scaled.left > crop.left {
        dx = crop.left - scaled.left;
    }
    if scaled.right < crop.right {
        dx = crop.right - scaled.right;
    }

    let mut dy = 0.0;
    if scaled.top > crop.top {
        dy = crop.top - scaled.top;
    }
    if scaled.bottom < crop.bottom {
        dy = crop.bottom - scaled.bottom;
    }

    Some(ScreenEdit::new(scale, Vector::new(dx, dy)))
}

/// A running correction tween.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionState {
    /// Unrotated placement when the correction started.
    base: Rect,
    edit: ScreenEdit,
    clock: AnimationClock,
}

impl CorrectionState {
    pub fn new(base: Rect, edit: ScreenEdit, duration_ms: f64) -> Self {
        Self {
            base,
            edit,
            clock: AnimationClock::new(duration_ms),
        }
    }

    pub fn edit(&self) -> ScreenEdit {
        self.edit
    }

    /// Placement at `now_ms` for an image drawn at `angle` about `pivot`,
    /// and whether the tween has finished.
    pub fn step(&mut self, now_ms: f64, angle: f64, pivot: Point) -> (Rect, bool) {
        let linear = self.clock.progress(now_ms);
        let eased = accelerate_decelerate(linear);
        let partial = self.edit.interpolate(eased);
        let finished = linear >= 1.0;
        let partial = if finished { self.edit } else { partial };
        (
            apply_screen_edit(&self.base, &partial, angle, pivot),
            finished,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::to_screen;
    use approx::assert_relative_eq;

    fn crop() -> Rect {
        Rect::new(100.0, 100.0, 300.0, 300.0)
    }

    #[test]
    fn test_covering_rect_needs_no_correction() {
        let edit = plan_correction(&Rect::new(50.0, 50.0, 400.0, 400.0), &crop()).unwrap();
        assert!(edit.is_identity());
    }

    #[test]
    fn test_gap_on_left_shifts_left() {
        let edit = plan_correction(&Rect::new(150.0, 50.0, 450.0, 350.0), &crop()).unwrap();
        assert_relative_eq!(edit.scale, 1.0);
        assert_relative_eq!(edit.translate.dx, -50.0);
        assert_relative_eq!(edit.translate.dy, 0.0);
    }

    #[test]
    fn test_gap_on_bottom_shifts_down() {
        let edit = plan_correction(&Rect::new(0.0, 0.0, 400.0, 250.0), &crop()).unwrap();
        assert_relative_eq!(edit.translate.dy, 50.0);
        assert_relative_eq!(edit.translate.dx, 0.0);
    }

    #[test]
    fn test_too_small_scales_up_to_crop() {
        // 100 wide against a 200 wide crop, centered.
        let edit = plan_correction(&Rect::new(150.0, 0.0, 250.0, 400.0), &crop()).unwrap();
        assert_relative_eq!(edit.scale, 2.0);
        let fixed = edit.apply(&Rect::new(150.0, 0.0, 250.0, 400.0), crop().center());
        assert!(fixed.contains_rect(&crop()));
    }

    #[test]
    fn test_collapsed_rect_cannot_be_planned() {
        let point = Rect::new(200.0, 200.0, 200.0, 200.0);
        assert!(plan_correction(&point, &crop()).is_none());
        let line = Rect::new(0.0, 200.0, 400.0, 200.0);
        assert!(plan_correction(&line, &crop()).is_none());
        let nan = Rect::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        assert!(plan_correction(&nan, &crop()).is_none());
    }

    #[test]
    fn test_tween_lands_on_target() {
        let crop = crop();
        let pivot = crop.center();
        let base = Rect::new(150.0, 50.0, 450.0, 350.0);
        let edit = plan_correction(&base, &crop).unwrap();
        let mut state = CorrectionState::new(base, edit, 200.0);

        let (start, done) = state.step(0.0, 0.0, pivot);
        assert!(!done);
        assert_relative_eq!(start.left, base.left, epsilon = 1e-9);

        let (mid, done) = state.step(100.0, 0.0, pivot);
        assert!(!done);
        assert!(mid.left < base.left && mid.left > crop.left);

        let (end, done) = state.step(200.0, 0.0, pivot);
        assert!(done);
        assert!(end.contains_rect(&crop));
    }

    #[test]
    fn test_tween_under_rotation_covers_on_screen() {
        let crop = crop();
        let pivot = crop.center();
        // Unrotated placement that is tall and narrow; at 90° it is wide and short.
        let base = Rect::new(150.0, 0.0, 250.0, 400.0);
        let screen = to_screen(&base, 90.0, pivot);
        let edit = plan_correction(&screen, &crop).unwrap();
        let mut state = CorrectionState::new(base, edit, 200.0);
        state.step(0.0, 90.0, pivot);
        let (end, done) = state.step(250.0, 90.0, pivot);
        assert!(done);
        assert!(to_screen(&end, 90.0, pivot).contains_rect(&crop));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-500.0f64..500.0, -500.0f64..500.0, 10.0f64..1000.0, 10.0f64..1000.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
    }

    proptest! {
        #[test]
        fn prop_correction_restores_coverage(screen in arb_rect()) {
            let crop = Rect::new(100.0, 100.0, 300.0, 250.0);
            let edit = plan_correction(&screen, &crop).unwrap();
            prop_assert!(edit.scale >= 1.0);
            let fixed = edit.apply(&screen, crop.center());
            prop_assert!(fixed.contains_rect(&crop), "{fixed:?} does not cover {crop:?}");
        }

        #[test]
        fn prop_correction_is_identity_when_covered(
            grow_l in 0.0f64..300.0,
            grow_t in 0.0f64..300.0,
            grow_r in 0.0f64..300.0,
            grow_b in 0.0f64..300.0,
        ) {
            let crop = Rect::new(100.0, 100.0, 300.0, 250.0);
            let screen = Rect::new(
                crop.left - grow_l,
                crop.top - grow_t,
                crop.right + grow_r,
                crop.bottom + grow_b,
            );
            let edit = plan_correction(&screen, &crop).unwrap();
            prop_assert!(edit.is_identity());
        }
    }
}
