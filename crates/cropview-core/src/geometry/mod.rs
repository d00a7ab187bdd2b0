//! Rectangle and point math in viewport coordinates.
//!
//! All values are `f64` device pixels with the origin at the top-left corner
//! and the y axis pointing down. Angles are in degrees; a positive angle
//! rotates clockwise on screen, which matches how a canvas rotates with a
//! y-down axis.

mod transform;

pub use transform::{apply_screen_edit, to_screen, ScreenEdit};

use serde::{Deserialize, Serialize};

/// Tolerance used by containment and coverage checks.
pub const EPSILON: f64 = 1e-6;

/// Sine and cosine of an angle in degrees.
///
/// Quarter turns return exact values so that repeated 90° rotations do not
/// accumulate drift.
pub fn sin_cos_degrees(degrees: f64) -> (f64, f64) {
    let normalized = degrees.rem_euclid(360.0);
    if normalized.abs() < 1e-9 || (normalized - 360.0).abs() < 1e-9 {
        return (0.0, 1.0);
    }
    if (normalized - 90.0).abs() < 1e-9 {
        return (1.0, 0.0);
    }
    if (normalized - 180.0).abs() < 1e-9 {
        return (0.0, -1.0);
    }
    if (normalized - 270.0).abs() < 1e-9 {
        return (-1.0, 0.0);
    }
    normalized.to_radians().sin_cos()
}

/// A position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Vector that moves `origin` onto `self`.
    pub fn offset_from(self, origin: Point) -> Vector {
        Vector::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn translate(self, v: Vector) -> Point {
        Point::new(self.x + v.dx, self.y + v.dy)
    }

    /// Rotate this point around `pivot`.
    pub fn rotate_about(self, degrees: f64, pivot: Point) -> Point {
        pivot.translate(self.offset_from(pivot).rotate(degrees))
    }
}

/// A displacement in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn scaled(self, factor: f64) -> Vector {
        Vector::new(self.dx * factor, self.dy * factor)
    }

    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    pub fn is_zero(self) -> bool {
        self.dx.abs() < EPSILON && self.dy.abs() < EPSILON
    }

    /// Rotate the vector about the origin.
    pub fn rotate(self, degrees: f64) -> Vector {
        let (sin, cos) = sin_cos_degrees(degrees);
        Vector::new(
            self.dx * cos - self.dy * sin,
            self.dx * sin + self.dy * cos,
        )
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> f64 {
        self.width * self.height
    }

    /// True unless both sides are finite and strictly positive.
    pub fn is_empty(self) -> bool {
        !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }
}

/// An axis-aligned rectangle stored as its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle of `size` whose center sits on `center`.
    pub fn centered_at(center: Point, size: Size) -> Self {
        let half_w = size.width / 2.0;
        let half_h = size.height / 2.0;
        Self::new(
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        )
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn translate(&self, v: Vector) -> Rect {
        Rect::new(
            self.left + v.dx,
            self.top + v.dy,
            self.right + v.dx,
            self.bottom + v.dy,
        )
    }

    /// Scale every edge away from (or toward) `pivot` by `factor`.
    pub fn scale_about(&self, factor: f64, pivot: Point) -> Rect {
        Rect::new(
            pivot.x + (self.left - pivot.x) * factor,
            pivot.y + (self.top - pivot.y) * factor,
            pivot.x + (self.right - pivot.x) * factor,
            pivot.y + (self.bottom - pivot.y) * factor,
        )
    }

    /// The four corners, clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }

    /// Axis-aligned bounding box of this rectangle rotated around `pivot`.
    ///
    /// For quarter turns the result is the rotated rectangle itself.
    pub fn rotate_about(&self, degrees: f64, pivot: Point) -> Rect {
        let corners = self.corners().map(|c| c.rotate_about(degrees, pivot));
        corners[1..].iter().fold(
            Rect::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y),
            |acc, c| {
                Rect::new(
                    acc.left.min(c.x),
                    acc.top.min(c.y),
                    acc.right.max(c.x),
                    acc.bottom.max(c.y),
                )
            },
        )
    }

    /// True if `other` lies entirely inside `self` (within [`EPSILON`]).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.left <= other.left + EPSILON
            && self.top <= other.top + EPSILON
            && self.right >= other.right - EPSILON
            && self.bottom >= other.bottom - EPSILON
    }

    /// True if the two rectangles share any area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}
