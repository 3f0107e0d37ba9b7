use std::ops::Mul;

use nalgebra::Matrix2;

use super::{Vec2, EPSILON};
use crate::error::GeometryError;

/// A 2×2 linear transform (rotation and scale; never translation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2(Matrix2<f32>);

impl Mat2 {
    /// Creates a matrix from its entries in row-major order.
    #[must_use]
    pub fn new(m11: f32, m12: f32, m21: f32, m22: f32) -> Self {
        Self(Matrix2::new(m11, m12, m21, m22))
    }

    #[must_use]
    pub fn identity() -> Self {
        Self(Matrix2::identity())
    }

    /// Counter-clockwise rotation by `angle` radians.
    #[must_use]
    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, -s, s, c)
    }

    /// Axis-aligned scale.
    #[must_use]
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy)
    }

    /// Builds the matrix whose columns are `c1` and `c2`.
    #[must_use]
    pub fn from_columns(c1: Vec2, c2: Vec2) -> Self {
        Self::new(c1.x(), c2.x(), c1.y(), c2.y())
    }

    #[must_use]
    pub fn determinant(&self) -> f32 {
        self.0.determinant()
    }

    /// Returns the inverse transform.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Singular`] when `|det| < EPSILON²`.
    pub fn inverse(&self) -> Result<Self, GeometryError> {
        let determinant = self.determinant();
        if determinant.abs() < EPSILON * EPSILON {
            return Err(GeometryError::Singular { determinant });
        }
        self.0
            .try_inverse()
            .map(Self)
            .ok_or(GeometryError::Singular { determinant })
    }

    /// Applies the transform to a vector.
    #[must_use]
    pub fn apply(&self, v: Vec2) -> Vec2 {
        Vec2::from(self.0 * v.as_vector())
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        self.apply(rhs)
    }
}

impl Mul for Mat2 {
    type Output = Self;

    /// Composition: `(a * b).apply(v) == a.apply(b.apply(v))`.
    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}
