use crate::error::ConfigError;
use crate::geometry::{Aabb, HasExtent, Rect};
use crate::math::{is_near_zero, Vec2};

use super::{Drawable, HasId};

/// Aperture type codes as they appear in loaded floor data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ApertureKind {
    /// Door between two rooms of the same floor.
    InnerDoor = 0,
    /// Window; blocks movement.
    Window = 1,
    /// Passable gap in a wall without a door leaf.
    Fake = 2,
    /// Door leading out of the building.
    Exit = 3,
}

impl TryFrom<u8> for ApertureKind {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::InnerDoor),
            1 => Ok(Self::Window),
            2 => Ok(Self::Fake),
            3 => Ok(Self::Exit),
            other => Err(ConfigError::UnknownApertureType(other)),
        }
    }
}

/// What a catalog entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    /// One box of a room's floor space. Its boundary acts as wall.
    Room,
    /// Stairway flight or platform footprint.
    Stairway,
    Furniture,
    Aperture(ApertureKind),
}

/// How an entry obstructs movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingMode {
    /// The whole footprint blocks.
    Solid,
    /// Only the outline blocks; the interior is walkable.
    Boundary,
    /// Never blocks.
    PassThrough,
}

/// A single immutable catalog entry.
#[derive(Debug, Clone)]
pub struct Obstacle {
    source_id: u32,
    kind: ObstacleKind,
    shape: Rect,
    extent: Aabb,
    carve_outs: Vec<Aabb>,
    exit_number: Option<u32>,
}

impl Obstacle {
    pub(crate) fn new(source_id: u32, kind: ObstacleKind, shape: Rect, extent: Aabb) -> Self {
        Self {
            source_id,
            kind,
            shape,
            extent,
            carve_outs: Vec::new(),
            exit_number: None,
        }
    }

    pub(crate) fn with_carve_outs(mut self, carve_outs: Vec<Aabb>) -> Self {
        self.carve_outs = carve_outs;
        self
    }

    pub(crate) fn with_exit_number(mut self, number: u32) -> Self {
        self.exit_number = Some(number);
        self
    }

    #[must_use]
    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    /// True shape, used for refined tests.
    #[must_use]
    pub fn shape(&self) -> &Rect {
        &self.shape
    }

    /// Pass-through openings (doors, exits, gaps) embedded in this entry's
    /// outline.
    #[must_use]
    pub fn carve_outs(&self) -> &[Aabb] {
        &self.carve_outs
    }

    /// 1-based exit number for exit apertures.
    #[must_use]
    pub fn exit_number(&self) -> Option<u32> {
        self.exit_number
    }

    #[must_use]
    pub fn aperture_kind(&self) -> Option<ApertureKind> {
        match self.kind {
            ObstacleKind::Aperture(kind) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn blocking_mode(&self) -> BlockingMode {
        match self.kind {
            ObstacleKind::Room => BlockingMode::Boundary,
            ObstacleKind::Stairway
            | ObstacleKind::Furniture
            | ObstacleKind::Aperture(ApertureKind::Window) => BlockingMode::Solid,
            ObstacleKind::Aperture(_) => BlockingMode::PassThrough,
        }
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.blocking_mode() != BlockingMode::PassThrough
    }

    /// `p` lies inside one of the carve-outs.
    #[must_use]
    pub fn is_carved(&self, p: Vec2) -> bool {
        self.carve_outs.iter().any(|c| c.contains_point(p))
    }

    /// Whether this entry obstructs the grid cell `cell`.
    ///
    /// Requires strictly positive shared area. A `Boundary` entry obstructs
    /// only cells reaching its outline, never cells strictly inside it. No
    /// entry obstructs cells wholly inside one of its carve-outs. Rotated
    /// shapes are refined against their true outline.
    #[must_use]
    pub fn covers_cell(&self, cell: &Aabb) -> bool {
        if !self.extent.overlaps(cell) {
            return false;
        }
        if self.blocking_mode() == BlockingMode::Boundary
            && self.extent.strictly_contains(cell)
        {
            return false;
        }
        if self.carve_outs.iter().any(|c| c.contains(cell)) {
            return false;
        }
        if is_near_zero(self.shape.angle()) {
            return true;
        }
        Rect::from_aabb(*cell).is_ok_and(|r| self.shape.overlaps(&r))
    }
}

impl HasId for Obstacle {
    type Id = u32;

    fn id(&self) -> u32 {
        self.source_id
    }
}

impl HasExtent for Obstacle {
    fn extent(&self) -> Aabb {
        self.extent
    }
}

impl Drawable for Obstacle {
    fn outline(&self) -> Vec<Vec2> {
        self.shape.vertices().to_vec()
    }
}
