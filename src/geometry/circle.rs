use crate::error::GeometryError;
use crate::math::{Vec2, EPSILON};

use super::{Aabb, HasExtent, Rect};

/// A circle given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Vec2,
    radius: f32,
}

impl Circle {
    /// Creates a circle.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the radius is not positive.
    pub fn new(center: Vec2, radius: f32) -> Result<Self, GeometryError> {
        if radius.is_nan() || radius < EPSILON {
            return Err(GeometryError::Degenerate(
                "circle radius must be positive".into(),
            ));
        }
        Ok(Self { center, radius })
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Overlapping or touching, by squared center distance.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius + EPSILON;
        (self.center - other.center).length_squared() <= reach * reach
    }

    #[must_use]
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        rect.intersects_circle(self)
    }

    #[must_use]
    pub fn contains_point(&self, p: Vec2) -> bool {
        (p - self.center).length_squared() <= self.radius * self.radius
    }
}

impl HasExtent for Circle {
    fn extent(&self) -> Aabb {
        Aabb::spanning(self.center, self.center).inflate(self.radius)
    }
}
