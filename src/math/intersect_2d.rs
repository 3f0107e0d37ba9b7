use super::{Mat2, Vec2, EPSILON};
use crate::error::GeometryError;

/// Signed doubled area of the triangle `(a, b, c)`.
///
/// Positive when `c` lies to the left of the directed line `a -> b`.
#[must_use]
pub fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Parametric line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, solves the 2×2 system
/// `[d1 | -d2] * (t, u) = p2 - p1` and returns `(t, u)`.
///
/// # Errors
///
/// Returns [`GeometryError::Parallel`] if the directions are parallel
/// (the sine of the angle between them is below [`EPSILON`]).
pub fn line_line_intersect_2d(
    p1: Vec2,
    d1: Vec2,
    p2: Vec2,
    d2: Vec2,
) -> Result<(f32, f32), GeometryError> {
    let cross = d1.perp_dot(d2);
    if cross.abs() <= EPSILON * d1.length() * d2.length() {
        return Err(GeometryError::Parallel);
    }
    let system = Mat2::from_columns(d1, -d2);
    let inverse = system.inverse().map_err(|_| GeometryError::Parallel)?;
    let params = inverse * (p2 - p1);
    Ok((params.x(), params.y()))
}

/// Point where the infinite lines through `a0 -> a1` and `b0 -> b1` meet.
///
/// # Errors
///
/// Returns [`GeometryError::Parallel`] for parallel or collinear lines.
pub fn line_intersection_point(
    a0: Vec2,
    a1: Vec2,
    b0: Vec2,
    b1: Vec2,
) -> Result<Vec2, GeometryError> {
    let d1 = a1 - a0;
    let (t, _) = line_line_intersect_2d(a0, d1, b0, b1 - b0)?;
    Ok(a0 + d1 * t)
}

/// Touches-or-crosses test for the bounded segments `a0 -> a1` and `b0 -> b1`.
///
/// Prunes on bounding boxes first, then requires each segment's endpoints
/// to lie on opposite sides of (or on) the other segment's line. Collinear
/// overlapping segments intersect. The test is symmetric in its arguments.
#[must_use]
pub fn segments_intersect_2d(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let a_min = a0.min(a1);
    let a_max = a0.max(a1);
    let b_min = b0.min(b1);
    let b_max = b0.max(b1);
    if a_max.x() + EPSILON < b_min.x()
        || b_max.x() + EPSILON < a_min.x()
        || a_max.y() + EPSILON < b_min.y()
        || b_max.y() + EPSILON < a_min.y()
    {
        return false;
    }

    let len_a = (a1 - a0).length();
    let len_b = (b1 - b0).length();
    let side = |value: f32, scale: f32| -> i8 {
        if value.abs() <= EPSILON * scale {
            0
        } else if value > 0.0 {
            1
        } else {
            -1
        }
    };

    let s1 = side(orientation(b0, b1, a0), len_b);
    let s2 = side(orientation(b0, b1, a1), len_b);
    let s3 = side(orientation(a0, a1, b0), len_a);
    let s4 = side(orientation(a0, a1, b1), len_a);

    s1 * s2 <= 0 && s3 * s4 <= 0
}
