use crate::error::GeometryError;
use crate::math::{Vec2, EPSILON};

use super::{Aabb, Circle, HasExtent, Segment, Triangle};

/// A possibly rotated rectangle.
///
/// Defined by an unrotated axis-aligned `base` extent, a rotation `angle`
/// (radians, counter-clockwise) and the point the rotation is applied around.
/// World-space vertices, boundary edges and the world extent are derived once
/// at construction; the value is immutable afterwards.
///
/// Vertices follow a fixed counter-clockwise convention: `A` is the rotated
/// image of the base minimum corner, then `B`, `C`, `D`. Edges are `AB`, `BC`,
/// `CD`, `DA`, each stored with its endpoints in lexicographic order.
///
/// A rectangle built with a pivot keeps the pivot on exactly one edge, the
/// *base edge*. Directional queries ([`Rect::distance`]) measure from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    base: Aabb,
    angle: f32,
    pivot: Option<Vec2>,
    base_edge: Option<usize>,
    vertices: [Vec2; 4],
    edges: [Segment; 4],
    extent: Aabb,
}

impl Rect {
    /// Axis-aligned rectangle `[x, y, width, height]` with `(x, y)` the
    /// minimum corner.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if either side is below
    /// [`EPSILON`].
    pub fn from_extent(x: f32, y: f32, width: f32, height: f32) -> Result<Self, GeometryError> {
        let base = Aabb::new(Vec2::new(x, y), Vec2::new(x + width, y + height))?;
        Self::build(base, 0.0, None, base.min)
    }

    /// Axis-aligned rectangle covering `aabb`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a zero-thickness extent.
    pub fn from_aabb(aabb: Aabb) -> Result<Self, GeometryError> {
        Self::build(aabb, 0.0, None, aabb.min)
    }

    /// Rectangle `[x, y, width, height]` rotated by `angle` around `pivot`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a degenerate extent and
    /// [`GeometryError::PivotNotOnEdge`] unless `pivot` lies on exactly one
    /// edge of the unrotated rectangle (corners lie on two).
    pub fn rotated(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        angle: f32,
        pivot: Vec2,
    ) -> Result<Self, GeometryError> {
        let base = Aabb::new(Vec2::new(x, y), Vec2::new(x + width, y + height))?;
        Self::build(base, angle, Some(pivot), pivot)
    }

    /// Rectangle of the given size centered on `center`, rotated by `angle`
    /// around its center. Has no pivot.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a degenerate size.
    pub fn centered(
        center: Vec2,
        width: f32,
        height: f32,
        angle: f32,
    ) -> Result<Self, GeometryError> {
        let half = Vec2::new(width * 0.5, height * 0.5);
        let base = Aabb::new(center - half, center + half)?;
        Self::build(base, angle, None, center)
    }

    fn build(
        base: Aabb,
        angle: f32,
        pivot: Option<Vec2>,
        rotate_about: Vec2,
    ) -> Result<Self, GeometryError> {
        if base.width() < EPSILON || base.height() < EPSILON {
            return Err(GeometryError::Degenerate(format!(
                "rectangle extent {} x {}",
                base.width(),
                base.height()
            )));
        }

        let corners = [
            base.min,
            Vec2::new(base.max.x(), base.min.y()),
            base.max,
            Vec2::new(base.min.x(), base.max.y()),
        ];
        let vertices = corners.map(|c| c.rotate_around(rotate_about, angle));
        let edges = [
            Segment::ordered(vertices[0], vertices[1])?,
            Segment::ordered(vertices[1], vertices[2])?,
            Segment::ordered(vertices[2], vertices[3])?,
            Segment::ordered(vertices[3], vertices[0])?,
        ];
        let extent = Aabb::spanning(vertices[0], vertices[1])
            .union(Aabb::spanning(vertices[2], vertices[3]));

        let base_edge = match pivot {
            Some(p) => {
                let mut hits = edges
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.contains(p))
                    .map(|(i, _)| i);
                match (hits.next(), hits.next()) {
                    (Some(i), None) => Some(i),
                    _ => return Err(GeometryError::PivotNotOnEdge),
                }
            }
            None => None,
        };

        Ok(Self {
            base,
            angle,
            pivot,
            base_edge,
            vertices,
            edges,
            extent,
        })
    }

    /// Unrotated extent the rectangle was defined from.
    #[must_use]
    pub fn base(&self) -> Aabb {
        self.base
    }

    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[must_use]
    pub fn pivot(&self) -> Option<Vec2> {
        self.pivot
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.base.width()
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.base.height()
    }

    /// World-space vertices `[A, B, C, D]`.
    #[must_use]
    pub fn vertices(&self) -> &[Vec2; 4] {
        &self.vertices
    }

    #[must_use]
    pub fn a(&self) -> Vec2 {
        self.vertices[0]
    }

    #[must_use]
    pub fn b(&self) -> Vec2 {
        self.vertices[1]
    }

    #[must_use]
    pub fn c(&self) -> Vec2 {
        self.vertices[2]
    }

    #[must_use]
    pub fn d(&self) -> Vec2 {
        self.vertices[3]
    }

    /// Boundary edges `[AB, BC, CD, DA]`.
    #[must_use]
    pub fn edges(&self) -> &[Segment; 4] {
        &self.edges
    }

    /// The edge containing the pivot, if the rectangle has one.
    #[must_use]
    pub fn base_edge(&self) -> Option<Segment> {
        self.base_edge.map(|i| self.edges[i])
    }

    /// The two edges adjacent to the base edge.
    #[must_use]
    pub fn side_edges(&self) -> Option<[Segment; 2]> {
        self.base_edge
            .map(|i| [self.edges[(i + 1) % 4], self.edges[(i + 3) % 4]])
    }

    /// Unit vector pointing from the base edge into the rectangle.
    #[must_use]
    pub fn forward(&self) -> Option<Vec2> {
        let i = self.base_edge?;
        let from = self.vertices[(i + 1) % 4];
        let to = self.vertices[(i + 2) % 4];
        (to - from).normalize().ok()
    }

    /// Center of the rectangle in world space.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.vertices[0] + self.vertices[2]) * 0.5
    }

    /// Boundary-inclusive point containment, via the triangles `ABC` and `ACD`.
    #[must_use]
    pub fn contains_point(&self, p: Vec2) -> bool {
        let [a, b, c, d] = self.vertices;
        Triangle::new(a, b, c).contains(p) || Triangle::new(a, c, d).contains(p)
    }

    /// `other` lies wholly inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.vertices.iter().all(|&v| self.contains_point(v))
    }

    /// Unit edge directions `AB` and `AD`, the separating-axis candidates.
    fn axes(&self) -> [Vec2; 2] {
        let ab = self.vertices[1] - self.vertices[0];
        let ad = self.vertices[3] - self.vertices[0];
        [ab * (1.0 / ab.length()), ad * (1.0 / ad.length())]
    }

    fn project(&self, axis: Vec2) -> (f32, f32) {
        self.vertices
            .iter()
            .map(|v| v.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            })
    }

    /// Smallest projected overlap over the four separating-axis candidates.
    ///
    /// Positive: the rectangles share area. Near zero: they touch.
    /// Negative: a separating gap of at least that size exists.
    #[must_use]
    pub fn overlap_depth(&self, other: &Self) -> f32 {
        self.axes()
            .into_iter()
            .chain(other.axes())
            .map(|axis| {
                let (a0, a1) = self.project(axis);
                let (b0, b1) = other.project(axis);
                a1.min(b1) - a0.max(b0)
            })
            .fold(f32::INFINITY, f32::min)
    }

    /// Overlapping or touching.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.extent.touches_or_overlaps(&other.extent) && self.overlap_depth(other) >= -EPSILON
    }

    /// Edge-adjacent without sharing any area.
    #[must_use]
    pub fn touches(&self, other: &Self) -> bool {
        self.intersects(other) && self.overlap_depth(other) <= EPSILON
    }

    /// Shares a region of strictly positive area.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.extent.touches_or_overlaps(&other.extent) && self.overlap_depth(other) > EPSILON
    }

    #[must_use]
    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        self.contains_point(circle.center())
            || self
                .edges
                .iter()
                .any(|e| e.distance_to_point(circle.center()) <= circle.radius() + EPSILON)
    }

    /// Points where the boundaries of the two rectangles cross.
    #[must_use]
    pub fn intersection_points(&self, other: &Self) -> Vec<Vec2> {
        let mut points = Vec::new();
        for e in &self.edges {
            for f in &other.edges {
                if e.intersects(f) {
                    if let Ok(p) = e.intersection_point(f) {
                        points.push(p);
                    }
                }
            }
        }
        points
    }

    /// Minimum distance to another rectangle.
    ///
    /// - touching: `0`
    /// - disjoint: minimum over the sixteen edge-pair distances
    /// - overlapping, with a pivot: distance from the base edge to the
    ///   nearest point where `other` enters the rectangle, found along the two
    ///   side edges (or at a vertex of `other` lying inside)
    /// - overlapping, without a pivot: `0`
    ///
    /// Returns `None` when the rectangles overlap but no hit point exists,
    /// as when `other` wholly contains a pivoted rectangle.
    #[must_use]
    pub fn distance(&self, other: &Self) -> Option<f32> {
        self.distance_filtered(other, |_| true)
    }

    /// [`Rect::distance`], ignoring overlap hit points rejected by `accept`.
    ///
    /// Returns `None` when the rectangles overlap but no hit point was
    /// accepted.
    #[must_use]
    pub fn distance_filtered(&self, other: &Self, accept: impl Fn(Vec2) -> bool) -> Option<f32> {
        let depth = self.overlap_depth(other);
        if depth < -EPSILON {
            let mut best = f32::INFINITY;
            for e in &self.edges {
                for f in &other.edges {
                    best = best.min(e.distance(f));
                }
            }
            return Some(best);
        }
        if depth <= EPSILON {
            return Some(0.0);
        }

        let (Some(pivot), Some(forward), Some(sides)) =
            (self.pivot, self.forward(), self.side_edges())
        else {
            return Some(0.0);
        };

        let crossings = sides.into_iter().flat_map(|side| {
            other
                .edges
                .iter()
                .filter(move |e| side.intersects(e))
                .filter_map(move |e| side.intersection_point(e).ok())
        });
        let inside = other
            .vertices
            .iter()
            .copied()
            .filter(|&v| self.contains_point(v));

        crossings
            .chain(inside)
            .filter(|&p| accept(p))
            .map(|p| (p - pivot).dot(forward).max(0.0))
            .reduce(f32::min)
    }
}

impl HasExtent for Rect {
    fn extent(&self) -> Aabb {
        self.extent
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    use super::*;

    fn strip(origin: Vec2, length: f32, width: f32, angle: f32) -> Rect {
        Rect::rotated(
            origin.x(),
            origin.y() - width * 0.5,
            length,
            width,
            angle,
            origin,
        )
        .unwrap()
    }

    #[test]
    fn degenerate_extent_rejected() {
        assert!(Rect::from_extent(0.0, 0.0, 0.0, 1.0).is_err());
        assert!(Rect::from_extent(0.0, 0.0, 1.0, -1.0).is_err());
    }

    #[test]
    fn axis_aligned_vertices_ccw() {
        let r = Rect::from_extent(1.0, 2.0, 3.0, 4.0).unwrap();
        assert_eq!(r.a(), Vec2::new(1.0, 2.0));
        assert_eq!(r.b(), Vec2::new(4.0, 2.0));
        assert_eq!(r.c(), Vec2::new(4.0, 6.0));
        assert_eq!(r.d(), Vec2::new(1.0, 6.0));
        assert!(r.base_edge().is_none());
    }

    #[test]
    fn edges_are_lexicographically_ordered() {
        let r = strip(Vec2::new(2.0, 2.0), 3.0, 1.0, 2.5);
        for e in r.edges() {
            assert!(e.p1().lex_le(e.p2()));
        }
    }

    #[test]
    fn rotation_about_pivot() {
        let r = strip(Vec2::zero(), 2.0, 1.0, FRAC_PI_2);
        assert_eq!(r.a(), Vec2::new(0.5, 0.0));
        assert_eq!(r.b(), Vec2::new(0.5, 2.0));
        assert_eq!(r.c(), Vec2::new(-0.5, 2.0));
        assert_eq!(r.d(), Vec2::new(-0.5, 0.0));
        assert_eq!(r.forward().unwrap(), Vec2::new(0.0, 1.0));
        assert_eq!(r.extent().min, Vec2::new(-0.5, 0.0));
        assert_eq!(r.extent().max, Vec2::new(0.5, 2.0));
    }

    #[test]
    fn pivot_at_corner_rejected() {
        let r = Rect::rotated(0.0, 0.0, 2.0, 1.0, 0.3, Vec2::new(0.0, 0.0));
        assert!(matches!(r, Err(GeometryError::PivotNotOnEdge)));
        let r = Rect::rotated(0.0, 0.0, 2.0, 1.0, 0.3, Vec2::new(1.0, 0.5));
        assert!(matches!(r, Err(GeometryError::PivotNotOnEdge)));
    }

    #[test]
    fn contains_point_rotated() {
        let r = Rect::centered(Vec2::zero(), 2.0, 2.0, FRAC_PI_4).unwrap();
        assert!(r.contains_point(Vec2::new(0.0, 1.3)));
        assert!(!r.contains_point(Vec2::new(0.95, 0.95)));
        assert!(r.contains_point(Vec2::zero()));
    }

    #[test]
    fn rect_containment() {
        let outer = Rect::from_extent(0.0, 0.0, 10.0, 10.0).unwrap();
        let inner = strip(Vec2::new(5.0, 5.0), 2.0, 0.5, 1.0);
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
    }

    #[test]
    fn touching_rectangles() {
        let a = Rect::from_extent(0.0, 0.0, 1.0, 1.0).unwrap();
        let b = Rect::from_extent(1.0, 0.0, 1.0, 1.0).unwrap();
        assert!(a.intersects(&b));
        assert!(a.touches(&b));
        assert!(!a.overlaps(&b));
        assert_abs_diff_eq!(a.distance(&b).unwrap(), 0.0);
    }

    #[test]
    fn disjoint_distance_over_edge_pairs() {
        let a = Rect::from_extent(0.0, 0.0, 1.0, 1.0).unwrap();
        let b = Rect::from_extent(3.0, 0.5, 1.0, 1.0).unwrap();
        assert!(!a.intersects(&b));
        assert_abs_diff_eq!(a.distance(&b).unwrap(), 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b.distance(&a).unwrap(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn rotated_rect_intersects_without_vertex_inside() {
        // A thin diamond crossing a square's middle.
        let square = Rect::from_extent(0.0, 0.0, 2.0, 2.0).unwrap();
        let bar = Rect::centered(Vec2::new(1.0, 1.0), 4.0, 0.2, FRAC_PI_4).unwrap();
        assert!(square.intersects(&bar));
        assert!(square.overlaps(&bar));
        assert!(!square.intersection_points(&bar).is_empty());
    }

    #[test]
    fn overlapping_distance_along_side_edges() {
        let vis = strip(Vec2::zero(), 5.0, 0.5, 0.0);
        let wall = Rect::from_extent(3.0, -1.0, 1.0, 2.0).unwrap();
        assert!(vis.overlaps(&wall));
        assert_abs_diff_eq!(vis.distance(&wall).unwrap(), 3.0, epsilon = 1e-4);

        let vis = strip(Vec2::zero(), 5.0, 0.5, FRAC_PI_2);
        let wall = Rect::from_extent(-1.0, 3.0, 2.0, 1.0).unwrap();
        assert_abs_diff_eq!(vis.distance(&wall).unwrap(), 3.0, epsilon = 1e-4);
    }

    #[test]
    fn overlapping_distance_small_obstacle_inside_strip() {
        let vis = strip(Vec2::zero(), 5.0, 2.0, 0.0);
        let post = Rect::from_extent(2.0, -0.2, 0.4, 0.4).unwrap();
        assert_abs_diff_eq!(vis.distance(&post).unwrap(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn enclosing_rectangle_has_no_hit() {
        let vis = strip(Vec2::new(2.0, 2.0), 1.0, 0.5, FRAC_PI_4);
        let hall = Rect::from_extent(0.0, 0.0, 5.0, 5.0).unwrap();
        assert!(vis.overlaps(&hall));
        assert!(vis.distance(&hall).is_none());
    }

    #[test]
    fn filtered_distance_skips_rejected_hits() {
        let vis = strip(Vec2::zero(), 5.0, 0.5, 0.0);
        let wall = Rect::from_extent(3.0, -1.0, 1.0, 2.0).unwrap();
        let d = vis.distance_filtered(&wall, |p| p.x() > 3.5);
        assert_abs_diff_eq!(d.unwrap(), 4.0, epsilon = 1e-4);
        assert!(vis.distance_filtered(&wall, |_| false).is_none());
    }

    #[test]
    fn circle_intersection() {
        let r = Rect::from_extent(0.0, 0.0, 2.0, 2.0).unwrap();
        assert!(r.intersects_circle(&Circle::new(Vec2::new(3.0, 1.0), 1.0).unwrap()));
        assert!(r.intersects_circle(&Circle::new(Vec2::new(1.0, 1.0), 0.1).unwrap()));
        assert!(!r.intersects_circle(&Circle::new(Vec2::new(3.0, 3.0), 1.0).unwrap()));
    }

    proptest! {
        #[test]
        fn exactly_one_edge_holds_the_pivot(
            angle in -TAU..TAU,
            x in -20.0f32..20.0,
            y in -20.0f32..20.0,
            length in 0.5f32..10.0,
            width in 0.2f32..1.0,
        ) {
            let r = strip(Vec2::new(x, y), length, width, angle);
            let pivot = r.pivot().unwrap();
            let holding = r.edges().iter().filter(|e| e.contains(pivot)).count();
            prop_assert_eq!(holding, 1);
            prop_assert!(r.base_edge().unwrap().contains(pivot));
        }

        #[test]
        fn forward_matches_rotation(angle in 0.0f32..TAU) {
            let r = strip(Vec2::new(1.0, -1.0), 3.0, 0.5, angle);
            prop_assert_eq!(r.forward().unwrap(), Vec2::from_angle(angle));
        }

        #[test]
        fn overlap_is_symmetric(
            ax in -5.0f32..5.0, ay in -5.0f32..5.0, aa in 0.0f32..PI,
            bx in -5.0f32..5.0, by in -5.0f32..5.0, ba in 0.0f32..PI,
        ) {
            let a = Rect::centered(Vec2::new(ax, ay), 3.0, 1.0, aa).unwrap();
            let b = Rect::centered(Vec2::new(bx, by), 2.0, 2.0, ba).unwrap();
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }
    }
}
