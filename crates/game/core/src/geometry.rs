//! Planar geometry helpers shared by the planner, the AI policies and the arena.
//!
//! Angles are radians measured with `atan2` in screen space (y grows
//! downwards). Every comparison between angles goes through
//! [`normalize_angle`] first so that `-0.1` and `2π - 0.1` are the same
//! heading.

use core::f64::consts::{PI, TAU};
use core::ops::{Add, AddAssign, Mul, Neg, Sub};

/// 2D vector in world units (pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle`.
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Returns the unit vector, or zero for a zero-length vector.
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// Normalizes and scales to `magnitude`, mirroring how every finalized
    /// heading is applied to a body.
    pub fn with_length(self, magnitude: f64) -> Self {
        self.normalize_or_zero() * magnitude
    }

    /// Heading of this vector in `[0, 2π)`.
    pub fn angle(self) -> f64 {
        normalize_angle(self.y.atan2(self.x))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangular hitbox, described by its full size.
///
/// Combatant bodies are rectangles, which is why clearance against a
/// projectile path is computed against the box and not a circle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hitbox {
    pub width: f64,
    pub height: f64,
}

impl Hitbox {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half_width(self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(self) -> f64 {
        self.height / 2.0
    }

    /// Axis-aligned bounds of this hitbox centered on `center`.
    pub fn bounds_at(self, center: Vec2) -> Rect {
        Rect::new(
            center.x - self.half_width(),
            center.y - self.half_height(),
            self.width,
            self.height,
        )
    }
}

impl Default for Hitbox {
    fn default() -> Self {
        Self::new(16.0, 16.0)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    pub fn contains(self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn intersects(self, other: Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True when a circle overlaps this rectangle.
    pub fn intersects_circle(self, center: Vec2, radius: f64) -> bool {
        let nearest = Vec2::new(
            center.x.clamp(self.x, self.right()),
            center.y.clamp(self.y, self.bottom()),
        );
        distance(nearest, center) <= radius
    }

    /// Clamps a point so that it stays inside the rectangle.
    pub fn clamp_point(self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.x, self.right()),
            point.y.clamp(self.y, self.bottom()),
        )
    }
}

/// Wraps any angle into `[0, 2π)`.
///
/// Non-finite input collapses to `0.0` so that a NaN heading can never leak
/// into a velocity.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Bearing from `from` to `to`, as returned by `atan2` (range `(-π, π]`).
pub fn angle_of(from: Vec2, to: Vec2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Bearing from `from` to `to`, normalized into `[0, 2π)`.
pub fn angle_of_normalized(from: Vec2, to: Vec2) -> f64 {
    normalize_angle(angle_of(from, to))
}

/// Euclidean distance.
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Inclusive membership test of `angle` in `[lower, upper]`.
///
/// When `lower > upper` the range crosses the 0/2π seam and the test becomes
/// `angle >= lower || angle <= upper`.
pub fn angle_in_range(angle: f64, lower: f64, upper: f64) -> bool {
    let angle = normalize_angle(angle);
    let lower = normalize_angle(lower);
    let upper = normalize_angle(upper);
    if lower <= upper {
        angle >= lower && angle <= upper
    } else {
        angle >= lower || angle <= upper
    }
}

/// Smallest absolute difference between two headings, in `[0, π]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (normalize_angle(a) - normalize_angle(b)).abs();
    if diff > PI { TAU - diff } else { diff }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn normalize_wraps_into_range() {
        assert!((normalize_angle(-0.5) - (TAU - 0.5)).abs() < EPS);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < EPS);
        assert_eq!(normalize_angle(TAU), 0.0);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }

    #[test]
    fn angle_of_points_down_the_screen() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(0.0, 10.0);
        assert!((angle_of(a, b) - PI / 2.0).abs() < EPS);
        assert!((angle_of_normalized(b, a) - 3.0 * PI / 2.0).abs() < EPS);
    }

    #[test]
    fn angle_in_range_handles_wraparound() {
        assert!(angle_in_range(6.0, 5.8, 0.3));
        assert!(angle_in_range(0.1, 5.8, 0.3));
        assert!(!angle_in_range(3.0, 5.8, 0.3));
        assert!(angle_in_range(1.2, 1.0, 1.5));
        assert!(!angle_in_range(1.6, 1.0, 1.5));
    }

    #[test]
    fn angular_distance_takes_the_short_way() {
        assert!((angular_distance(0.1, TAU - 0.1) - 0.2).abs() < EPS);
        assert!((angular_distance(1.0, 2.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn with_length_scales_unit_vectors() {
        let v = Vec2::new(3.0, 4.0).with_length(10.0);
        assert!((v.x - 6.0).abs() < EPS);
        assert!((v.y - 8.0).abs() < EPS);
        assert_eq!(Vec2::ZERO.with_length(5.0), Vec2::ZERO);
    }

    #[test]
    fn rect_circle_overlap() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.intersects_circle(Vec2::new(12.0, 5.0), 3.0));
        assert!(!rect.intersects_circle(Vec2::new(14.0, 5.0), 3.0));
    }
}
