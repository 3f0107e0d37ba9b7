mod aabb;
mod circle;
mod rect;
mod segment;
mod triangle;

pub use aabb::Aabb;
pub use circle::Circle;
pub use rect::Rect;
pub use segment::{OrderedLine, Segment};
pub use triangle::Triangle;

/// Shapes that expose an axis-aligned extent for coarse spatial tests.
pub trait HasExtent {
    /// Returns the axis-aligned bounding extent of the shape.
    fn extent(&self) -> Aabb;
}
