use crate::math::{Vec2, EPSILON};

use super::{Aabb, HasExtent};

/// A triangle given by three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
}

impl Triangle {
    #[must_use]
    pub fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self { a, b, c }
    }

    /// Barycentric coordinates `(u, v, w)` of `p`, with `p = u*a + v*b + w*c`.
    ///
    /// Returns `None` for a degenerate (zero-area) triangle.
    #[must_use]
    pub fn barycentric(&self, p: Vec2) -> Option<(f32, f32, f32)> {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = p - self.a;
        let denom = v0.perp_dot(v1);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let v = v2.perp_dot(v1) / denom;
        let w = v0.perp_dot(v2) / denom;
        Some((1.0 - v - w, v, w))
    }

    /// Boundary-inclusive point containment.
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        self.barycentric(p)
            .is_some_and(|(u, v, w)| u >= -EPSILON && v >= -EPSILON && w >= -EPSILON)
    }

    /// Unsigned area.
    #[must_use]
    pub fn area(&self) -> f32 {
        0.5 * (self.b - self.a).perp_dot(self.c - self.a).abs()
    }
}

impl HasExtent for Triangle {
    fn extent(&self) -> Aabb {
        Aabb::spanning(self.a, self.b).union(Aabb::spanning(self.c, self.c))
    }
}
