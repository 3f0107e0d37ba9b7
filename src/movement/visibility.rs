use crate::catalog::ObstacleCatalog;
use crate::error::GeometryError;
use crate::geometry::{HasExtent, Rect};
use crate::math::{is_near_zero, Vec2};

/// Rectangle of length `reach` and width `diameter` ahead of `position`
/// along `angle`.
///
/// Its base edge is the occupant's body footprint, with `position` at the
/// middle.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] for a reach or diameter below
/// tolerance.
pub fn visibility_rect(
    position: Vec2,
    reach: f32,
    diameter: f32,
    angle: f32,
) -> Result<Rect, GeometryError> {
    Rect::rotated(
        position.x(),
        position.y() - diameter * 0.5,
        reach,
        diameter,
        angle,
        position,
    )
}

/// Distance from the base edge of `view` to the nearest blocking element
/// inside it, or `None` if the view is clear.
///
/// Elements that wholly contain the view (the room the occupant stands
/// in) are skipped, hits inside an element's carve-outs are ignored, and
/// near-zero distances (the body already touching a wall) are discarded.
#[must_use]
pub fn nearest_obstacle(catalog: &ObstacleCatalog, view: &Rect) -> Option<f32> {
    let view_extent = view.extent();
    catalog
        .blocking()
        .filter(|o| o.extent().touches_or_overlaps(&view_extent))
        .filter(|o| o.shape().intersects(view) && !o.shape().contains_rect(view))
        .filter_map(|o| view.distance_filtered(o.shape(), |p| !o.is_carved(p)))
        .filter(|d| !is_near_zero(*d))
        .reduce(f32::min)
}
