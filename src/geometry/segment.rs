use crate::error::GeometryError;
use crate::math::distance_2d::{point_to_segment_dist, segment_to_segment_dist};
use crate::math::intersect_2d::{line_intersection_point, segments_intersect_2d};
use crate::math::{is_near_zero, Vec2, EPSILON};

use super::{Aabb, HasExtent};

fn check_not_degenerate(p1: Vec2, p2: Vec2) -> Result<(), GeometryError> {
    if is_near_zero(p2.x() - p1.x()) && is_near_zero(p2.y() - p1.y()) {
        return Err(GeometryError::Degenerate(format!(
            "zero-length segment at ({}, {})",
            p1.x(),
            p1.y()
        )));
    }
    Ok(())
}

fn unordered(p1: Vec2, p2: Vec2) -> GeometryError {
    GeometryError::Unordered {
        x1: p1.x(),
        y1: p1.y(),
        x2: p2.x(),
        y2: p2.y(),
    }
}

/// A line through two points with `p2 >= p1` componentwise.
///
/// Only used for extended-line intersection; it carries no bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedLine {
    p1: Vec2,
    p2: Vec2,
}

impl OrderedLine {
    /// Creates a line through `p1` and `p2`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Unordered`] unless `p1 <= p2` componentwise,
    /// or [`GeometryError::Degenerate`] if the points coincide.
    pub fn new(p1: Vec2, p2: Vec2) -> Result<Self, GeometryError> {
        if !p1.componentwise_le(p2) {
            return Err(unordered(p1, p2));
        }
        check_not_degenerate(p1, p2)?;
        Ok(Self { p1, p2 })
    }

    #[must_use]
    pub fn p1(&self) -> Vec2 {
        self.p1
    }

    #[must_use]
    pub fn p2(&self) -> Vec2 {
        self.p2
    }

    /// Intersection of the two infinite lines.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Parallel`] for parallel lines.
    pub fn intersection_point(&self, other: &Self) -> Result<Vec2, GeometryError> {
        line_intersection_point(self.p1, self.p2, other.p1, other.p2)
    }
}

/// A bounded, non-degenerate line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    p1: Vec2,
    p2: Vec2,
}

impl Segment {
    /// Creates a segment whose endpoints are already weakly ordered
    /// (lexicographically, `p1 <= p2`).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a zero-length segment and
    /// [`GeometryError::Unordered`] if `p1 > p2`.
    pub fn new(p1: Vec2, p2: Vec2) -> Result<Self, GeometryError> {
        check_not_degenerate(p1, p2)?;
        if !p1.lex_le(p2) {
            return Err(unordered(p1, p2));
        }
        Ok(Self { p1, p2 })
    }

    /// Creates a segment from endpoints in any order, swapping them if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a zero-length segment.
    pub fn ordered(a: Vec2, b: Vec2) -> Result<Self, GeometryError> {
        if a.lex_le(b) {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    #[must_use]
    pub fn p1(&self) -> Vec2 {
        self.p1
    }

    #[must_use]
    pub fn p2(&self) -> Vec2 {
        self.p2
    }

    /// Vector from `p1` to `p2`.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        self.p2 - self.p1
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    #[must_use]
    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }

    /// Point at parameter `t` (`0` is `p1`, `1` is `p2`).
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.p1 + self.direction() * t
    }

    /// `p` is collinear with the segment and projects inside it.
    ///
    /// Collinear means the cross product of `p2 - p1` and `p - p1` is within
    /// [`EPSILON`] (scaled by the segment length, i.e. a perpendicular offset
    /// below [`EPSILON`]); inside means the projection lies in `[0, |S|²]`.
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        let d = self.direction();
        let w = p - self.p1;
        let len = d.length();
        if d.perp_dot(w).abs() > EPSILON * len {
            return false;
        }
        let projection = d.dot(w);
        projection >= -EPSILON * len && projection <= d.length_squared() + EPSILON * len
    }

    /// Touches-or-crosses test.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        segments_intersect_2d(self.p1, self.p2, other.p1, other.p2)
    }

    /// Point where the lines through both segments meet.
    ///
    /// The point is not required to lie on either segment; combine with
    /// [`Segment::intersects`] for bounded intersection.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Parallel`] for parallel segments.
    pub fn intersection_point(&self, other: &Self) -> Result<Vec2, GeometryError> {
        line_intersection_point(self.p1, self.p2, other.p1, other.p2)
    }

    /// Minimum Euclidean distance between the two segments.
    ///
    /// Exactly `0.0` when they touch or cross.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        if self.intersects(other) {
            return 0.0;
        }
        segment_to_segment_dist(self.p1, self.p2, other.p1, other.p2)
    }

    /// Minimum distance from `p` to the segment.
    #[must_use]
    pub fn distance_to_point(&self, p: Vec2) -> f32 {
        point_to_segment_dist(p, self.p1, self.p2)
    }
}

impl HasExtent for Segment {
    fn extent(&self) -> Aabb {
        Aabb::spanning(self.p1, self.p2)
    }
}
