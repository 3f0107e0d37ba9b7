use crate::error::GeometryError;
use crate::math::{Vec2, EPSILON};

use super::HasExtent;

/// An axis-aligned extent.
///
/// May have zero thickness along one axis (apertures projected to 2D are
/// line-like); use [`Aabb::with_min_thickness`] before area-overlap tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Aabb {
    /// Creates an extent from its corners.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if `min` exceeds `max` on either
    /// axis or a coordinate is not finite.
    pub fn new(min: Vec2, max: Vec2) -> Result<Self, GeometryError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GeometryError::Degenerate(
                "extent coordinates must be finite".into(),
            ));
        }
        if !min.componentwise_le(max) {
            return Err(GeometryError::Degenerate(format!(
                "extent min ({}, {}) exceeds max ({}, {})",
                min.x(),
                min.y(),
                max.x(),
                max.y()
            )));
        }
        Ok(Self { min, max })
    }

    /// Extent spanning two arbitrary corner points.
    #[must_use]
    pub fn spanning(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest extent containing all `points`, or `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::spanning(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x() - self.min.x()
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y() - self.min.y()
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shares a region of strictly positive area with `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let dx = self.max.x().min(other.max.x()) - self.min.x().max(other.min.x());
        let dy = self.max.y().min(other.max.y()) - self.min.y().max(other.min.y());
        dx > EPSILON && dy > EPSILON
    }

    /// Overlaps or shares boundary with `other`.
    #[must_use]
    pub fn touches_or_overlaps(&self, other: &Self) -> bool {
        self.min.x() <= other.max.x() + EPSILON
            && other.min.x() <= self.max.x() + EPSILON
            && self.min.y() <= other.max.y() + EPSILON
            && other.min.y() <= self.max.y() + EPSILON
    }

    /// `other` lies wholly inside this extent (boundary inclusive).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.componentwise_le(other.min) && other.max.componentwise_le(self.max)
    }

    /// `other` lies inside this extent clear of its boundary by more than
    /// [`EPSILON`] on every side.
    #[must_use]
    pub fn strictly_contains(&self, other: &Self) -> bool {
        self.min.x() + EPSILON < other.min.x()
            && self.min.y() + EPSILON < other.min.y()
            && other.max.x() < self.max.x() - EPSILON
            && other.max.y() < self.max.y() - EPSILON
    }

    #[must_use]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.min.componentwise_le(p) && p.componentwise_le(self.max)
    }

    /// Grows the extent by `margin` on every side.
    #[must_use]
    pub fn inflate(self, margin: f32) -> Self {
        let m = Vec2::new(margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Widens any axis thinner than `thickness` to exactly `thickness`,
    /// keeping it centered.
    #[must_use]
    pub fn with_min_thickness(self, thickness: f32) -> Self {
        let c = self.center();
        let half_w = self.width().max(thickness) * 0.5;
        let half_h = self.height().max(thickness) * 0.5;
        Self {
            min: Vec2::new(c.x() - half_w, c.y() - half_h),
            max: Vec2::new(c.x() + half_w, c.y() + half_h),
        }
    }

    /// Smallest extent containing both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl HasExtent for Aabb {
    fn extent(&self) -> Aabb {
        *self
    }
}
