use crate::error::{ConfigError, GeometryError, Result};
use crate::geometry::{Aabb, Rect};
use crate::math::{Point3, Vec2};

use super::{ApertureKind, ObstacleCatalog};

fn project(p: &Point3) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// An axis-aligned box from the loaded building model.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    pub min: Point3,
    pub max: Point3,
}

impl Cuboid {
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// XY projection of the box.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the corners are inverted.
    pub fn footprint(&self) -> std::result::Result<Aabb, GeometryError> {
        Aabb::new(project(&self.min), project(&self.max))
    }
}

/// A room: one or more boxes of walkable floor space.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: u32,
    pub boxes: Vec<Cuboid>,
}

impl Room {
    #[must_use]
    pub fn new(id: u32, boxes: Vec<Cuboid>) -> Self {
        Self { id, boxes }
    }
}

/// An aperture as loaded: two 3D endpoints and a type code
/// (`0` inner door, `1` window, `2` gap, `3` exit).
#[derive(Debug, Clone, PartialEq)]
pub struct ApertureSpec {
    pub id: u32,
    pub type_code: u8,
    pub start: Point3,
    pub end: Point3,
}

impl ApertureSpec {
    #[must_use]
    pub fn new(id: u32, type_code: u8, start: Point3, end: Point3) -> Self {
        Self {
            id,
            type_code,
            start,
            end,
        }
    }

    /// Decodes the type code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownApertureType`] for codes above `3`.
    pub fn kind(&self) -> std::result::Result<ApertureKind, ConfigError> {
        ApertureKind::try_from(self.type_code)
    }

    /// XY projection; usually line-like.
    #[must_use]
    pub fn footprint(&self) -> Aabb {
        Aabb::spanning(project(&self.start), project(&self.end))
    }
}

/// A furniture item: center position, footprint size and rotation (radians).
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureSpec {
    pub id: u32,
    pub position: Point3,
    pub width: f32,
    pub depth: f32,
    pub rotation: f32,
}

impl FurnitureSpec {
    #[must_use]
    pub fn new(id: u32, position: Point3, width: f32, depth: f32, rotation: f32) -> Self {
        Self {
            id,
            position,
            width,
            depth,
            rotation,
        }
    }

    /// Rotated footprint centered on the item's position.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a non-positive size.
    pub fn shape(&self) -> std::result::Result<Rect, GeometryError> {
        Rect::centered(project(&self.position), self.width, self.depth, self.rotation)
    }
}

/// A stairway between `lower_floor` and the floor above it, as an
/// alternating sequence of flight and platform boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stairway {
    pub id: u32,
    pub lower_floor: usize,
    pub segments: Vec<Cuboid>,
}

impl Stairway {
    /// Splits the segments evenly between the two floors; with an odd count
    /// the lower floor receives the extra one.
    #[must_use]
    pub fn split_between_floors(&self) -> (&[Cuboid], &[Cuboid]) {
        self.segments.split_at(self.segments.len().div_ceil(2))
    }
}

/// Everything loaded for one floor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorPlan {
    pub rooms: Vec<Room>,
    pub apertures: Vec<ApertureSpec>,
    pub furniture: Vec<FurnitureSpec>,
    /// Stairway footprints on this floor, tagged with their stairway id.
    pub stair_segments: Vec<(u32, Cuboid)>,
}

/// A validated multi-floor building.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    floors: Vec<FloorPlan>,
}

impl Building {
    /// Assembles floors and distributes stairway segments onto them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoFloors`] for an empty building and
    /// [`ConfigError::FloorCountMismatch`] when a stairway references a floor
    /// pair outside the building.
    pub fn new(mut floors: Vec<FloorPlan>, stairways: &[Stairway]) -> Result<Self> {
        if floors.is_empty() {
            return Err(ConfigError::NoFloors.into());
        }
        for stairway in stairways {
            let upper = stairway.lower_floor + 1;
            if upper >= floors.len() {
                return Err(ConfigError::FloorCountMismatch {
                    what: "stairways",
                    expected: floors.len(),
                    found: upper + 1,
                }
                .into());
            }
            let (lower_half, upper_half) = stairway.split_between_floors();
            floors[stairway.lower_floor]
                .stair_segments
                .extend(lower_half.iter().map(|c| (stairway.id, c.clone())));
            floors[upper]
                .stair_segments
                .extend(upper_half.iter().map(|c| (stairway.id, c.clone())));
        }
        Ok(Self { floors })
    }

    /// Assembles floors from per-floor lists as delivered by a loader.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoFloors`] or
    /// [`ConfigError::FloorCountMismatch`] if the lists disagree on the
    /// number of floors.
    pub fn from_parts(
        rooms: Vec<Vec<Room>>,
        apertures: Vec<Vec<ApertureSpec>>,
        furniture: Vec<Vec<FurnitureSpec>>,
        stairways: &[Stairway],
    ) -> Result<Self> {
        let expected = rooms.len();
        if expected == 0 {
            return Err(ConfigError::NoFloors.into());
        }
        check_floor_count("apertures", expected, apertures.len())?;
        check_floor_count("furniture", expected, furniture.len())?;

        let floors = rooms
            .into_iter()
            .zip(apertures)
            .zip(furniture)
            .map(|((rooms, apertures), furniture)| FloorPlan {
                rooms,
                apertures,
                furniture,
                stair_segments: Vec::new(),
            })
            .collect();
        Self::new(floors, stairways)
    }

    #[must_use]
    pub fn floors(&self) -> &[FloorPlan] {
        &self.floors
    }

    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Checks that a per-floor list (e.g. occupant placements) matches the
    /// building.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FloorCountMismatch`] on disagreement.
    pub fn check_per_floor<T>(&self, what: &'static str, per_floor: &[T]) -> Result<()> {
        check_floor_count(what, self.floors.len(), per_floor.len())
    }

    /// Builds one obstacle catalog per floor.
    ///
    /// # Errors
    ///
    /// Propagates catalog construction errors.
    pub fn catalogs(&self) -> Result<Vec<ObstacleCatalog>> {
        self.floors.iter().map(ObstacleCatalog::from_floor).collect()
    }
}

fn check_floor_count(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ConfigError::FloorCountMismatch {
            what,
            expected,
            found,
        }
        .into())
    }
}
