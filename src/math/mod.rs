pub mod distance_2d;
pub mod intersect_2d;
mod matrix_2d;
mod vector_2d;

pub use matrix_2d::Mat2;
pub use vector_2d::Vec2;

/// 3D point type, used only at the input boundary before projecting to XY.
pub type Point3 = nalgebra::Point3<f32>;

/// Global tolerance for fuzzy coordinate comparisons, in meters.
///
/// Absorbs the rounding accumulated by trigonometric construction of
/// rotated shapes and direction vectors.
pub const EPSILON: f32 = 1e-3;

/// Returns `true` if `a` and `b` differ by less than [`EPSILON`].
#[must_use]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Returns `true` if `value` is within [`EPSILON`] of zero.
#[must_use]
pub fn is_near_zero(value: f32) -> bool {
    value.abs() < EPSILON
}
