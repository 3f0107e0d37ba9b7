use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::Vector2;

use super::{approx_eq, Mat2, EPSILON};
use crate::error::GeometryError;

/// An immutable 2D vector (or point) with single-precision coordinates.
///
/// Every operation returns a new value. Equality is fuzzy: two vectors are
/// equal when each coordinate differs by less than [`EPSILON`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec2(Vector2<f32>);

impl Vec2 {
    /// Creates a vector from its coordinates.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vector2::new(x, y))
    }

    /// The zero vector.
    #[must_use]
    pub fn zero() -> Self {
        Self(Vector2::zeros())
    }

    /// Unit vector pointing at `angle` radians from the +X axis.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[must_use]
    pub fn x(self) -> f32 {
        self.0.x
    }

    #[must_use]
    pub fn y(self) -> f32 {
        self.0.y
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.0.dot(&other.0)
    }

    /// Z component of the 3D cross product (`self.x * other.y - self.y * other.x`).
    ///
    /// Positive when `other` lies counter-clockwise of `self`.
    #[must_use]
    pub fn perp_dot(self, other: Self) -> f32 {
        self.0.perp(&other.0)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.0.norm()
    }

    /// Squared Euclidean length.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.0.norm_squared()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Returns the unit vector with the same direction.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the length is below [`EPSILON`].
    pub fn normalize(self) -> Result<Self, GeometryError> {
        let len = self.length();
        if len < EPSILON {
            return Err(GeometryError::ZeroVector);
        }
        Ok(Self(self.0 / len))
    }

    /// Rotates this point by `angle` radians counter-clockwise around `pivot`.
    #[must_use]
    pub fn rotate_around(self, pivot: Self, angle: f32) -> Self {
        pivot + Mat2::rotation(angle) * (self - pivot)
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x().min(other.x()), self.y().min(other.y()))
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x().max(other.x()), self.y().max(other.y()))
    }

    /// Lexicographic `self <= other` (x first, then y), with fuzzy ties.
    #[must_use]
    pub fn lex_le(self, other: Self) -> bool {
        if approx_eq(self.x(), other.x()) {
            self.y() <= other.y() + EPSILON
        } else {
            self.x() < other.x()
        }
    }

    /// Both coordinates of `self` are at most those of `other`, with tolerance.
    #[must_use]
    pub fn componentwise_le(self, other: Self) -> bool {
        self.x() <= other.x() + EPSILON && self.y() <= other.y() + EPSILON
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x().is_finite() && self.y().is_finite()
    }

    /// Borrows the underlying `nalgebra` vector.
    #[must_use]
    pub fn as_vector(&self) -> &Vector2<f32> {
        &self.0
    }
}

impl PartialEq for Vec2 {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.x(), other.x()) && approx_eq(self.y(), other.y())
    }
}

impl From<Vector2<f32>> for Vec2 {
    fn from(v: Vector2<f32>) -> Self {
        Self(v)
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self(self.0 * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn fuzzy_equality() {
        assert_eq!(Vec2::new(1.0, 2.0), Vec2::new(1.0004, 1.9996));
        assert_ne!(Vec2::new(1.0, 2.0), Vec2::new(1.002, 2.0));
    }

    #[test]
    fn arithmetic_yields_new_values() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(a - b, Vec2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert_eq!(a, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn dot_and_perp_dot() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert_abs_diff_eq!(a.dot(b), 0.0);
        assert_abs_diff_eq!(a.perp_dot(b), 1.0);
        assert_abs_diff_eq!(b.perp_dot(a), -1.0);
    }

    #[test]
    fn normalize_unit_length() {
        let n = Vec2::new(3.0, 4.0).normalize().unwrap();
        assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-6);
        assert_eq!(n, Vec2::new(0.6, 0.8));
    }

    #[test]
    fn normalize_zero_fails() {
        assert!(matches!(
            Vec2::zero().normalize(),
            Err(GeometryError::ZeroVector)
        ));
    }

    #[test]
    fn rotate_around_pivot() {
        let p = Vec2::new(2.0, 1.0);
        let pivot = Vec2::new(1.0, 1.0);
        assert_eq!(p.rotate_around(pivot, FRAC_PI_2), Vec2::new(1.0, 2.0));
        assert_eq!(p.rotate_around(pivot, PI), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn lexicographic_order() {
        assert!(Vec2::new(0.0, 5.0).lex_le(Vec2::new(1.0, 0.0)));
        assert!(Vec2::new(1.0, 0.0).lex_le(Vec2::new(1.0, 1.0)));
        assert!(!Vec2::new(1.0, 2.0).lex_le(Vec2::new(1.0, 1.0)));
    }
}
