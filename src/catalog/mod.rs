//! Read-only catalog of a floor's geometric elements.
//!
//! Built once per floor from a [`FloorPlan`]; the movement and field
//! components only read it.

mod entry;
mod floor;

pub use entry::{ApertureKind, BlockingMode, Obstacle, ObstacleKind};
pub use floor::{ApertureSpec, Building, Cuboid, FloorPlan, FurnitureSpec, Room, Stairway};

use slotmap::SlotMap;

use crate::error::Result;
use crate::geometry::{Aabb, HasExtent, Rect};
use crate::math::Vec2;

slotmap::new_key_type! {
    /// Handle to an entry of an [`ObstacleCatalog`].
    pub struct ObstacleId;
}

/// Items carrying the numeric id they were loaded with.
pub trait HasId {
    type Id;

    fn id(&self) -> Self::Id;
}

/// Items a rendering layer can outline.
pub trait Drawable {
    /// Closed outline in world coordinates.
    fn outline(&self) -> Vec<Vec2>;
}

/// Minimum thickness given to line-like apertures so they have a true shape.
const APERTURE_MIN_THICKNESS: f32 = 0.02;

/// Arena of one floor's obstacles and apertures.
///
/// Exits are numbered `1..=exit_count()` in load order.
#[derive(Debug, Default)]
pub struct ObstacleCatalog {
    entries: SlotMap<ObstacleId, Obstacle>,
    exits: Vec<ObstacleId>,
    extent: Option<Aabb>,
}

impl ObstacleCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects a floor plan to 2D and catalogs every element.
    ///
    /// Room boxes receive the door, exit and gap apertures touching them as
    /// carve-outs.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown aperture codes and a
    /// geometry error for degenerate footprints.
    pub fn from_floor(plan: &FloorPlan) -> Result<Self> {
        let mut catalog = Self::new();

        let mut apertures = Vec::with_capacity(plan.apertures.len());
        for spec in &plan.apertures {
            let kind = spec.kind()?;
            let footprint = spec.footprint().with_min_thickness(APERTURE_MIN_THICKNESS);
            let shape = Rect::from_aabb(footprint)?;
            apertures.push((spec.id, kind, shape.extent(), shape));
        }

        let openings: Vec<Aabb> = apertures
            .iter()
            .filter(|(_, kind, _, _)| *kind != ApertureKind::Window)
            .map(|(_, _, extent, _)| *extent)
            .collect();

        for room in &plan.rooms {
            for cuboid in &room.boxes {
                let extent = cuboid.footprint()?;
                let shape = Rect::from_aabb(extent)?;
                let carve_outs = openings
                    .iter()
                    .copied()
                    .filter(|o| o.touches_or_overlaps(&extent))
                    .collect();
                catalog.insert(
                    Obstacle::new(room.id, ObstacleKind::Room, shape, extent)
                        .with_carve_outs(carve_outs),
                );
            }
        }

        for (id, kind, extent, shape) in apertures {
            catalog.insert(Obstacle::new(id, ObstacleKind::Aperture(kind), shape, extent));
        }

        for item in &plan.furniture {
            let shape = item.shape()?;
            let extent = shape.extent();
            catalog.insert(Obstacle::new(item.id, ObstacleKind::Furniture, shape, extent));
        }

        for (id, cuboid) in &plan.stair_segments {
            let extent = cuboid.footprint()?;
            let shape = Rect::from_aabb(extent)?;
            catalog.insert(Obstacle::new(*id, ObstacleKind::Stairway, shape, extent));
        }

        tracing::debug!(
            entries = catalog.len(),
            exits = catalog.exit_count(),
            "obstacle catalog built"
        );
        Ok(catalog)
    }

    fn insert(&mut self, mut obstacle: Obstacle) -> ObstacleId {
        let is_exit = obstacle.aperture_kind() == Some(ApertureKind::Exit);
        if is_exit {
            let number = u32::try_from(self.exits.len() + 1).unwrap_or(u32::MAX);
            obstacle = obstacle.with_exit_number(number);
        }
        if obstacle.aperture_kind().is_none() {
            let extent = obstacle.extent();
            self.extent = Some(self.extent.map_or(extent, |e| e.union(extent)));
        }
        let id = self.entries.insert(obstacle);
        if is_exit {
            self.exits.push(id);
        }
        id
    }

    /// Returns the entry for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of the given kind.
    pub fn of_kind(&self, kind: ObstacleKind) -> impl Iterator<Item = &Obstacle> {
        self.entries.values().filter(move |o| o.kind() == kind)
    }

    /// Entries that obstruct movement or sight.
    pub fn blocking(&self) -> impl Iterator<Item = &Obstacle> {
        self.entries.values().filter(|o| o.is_blocking())
    }

    /// Number of exits on this floor.
    #[must_use]
    pub fn exit_count(&self) -> u32 {
        u32::try_from(self.exits.len()).unwrap_or(u32::MAX)
    }

    /// Exit number `number` (1-based).
    #[must_use]
    pub fn exit(&self, number: u32) -> Option<&Obstacle> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.exits.get(index).and_then(|id| self.entries.get(*id))
    }

    /// Exits in numbering order.
    pub fn exits(&self) -> impl Iterator<Item = &Obstacle> {
        self.exits.iter().filter_map(|id| self.entries.get(*id))
    }

    /// Door-like aperture (inner door, gap, or exit) whose shape contains `p`.
    #[must_use]
    pub fn doorway_at(&self, p: Vec2) -> Option<&Obstacle> {
        self.entries.values().find(|o| {
            matches!(
                o.aperture_kind(),
                Some(ApertureKind::InnerDoor | ApertureKind::Fake | ApertureKind::Exit)
            ) && o.shape().contains_point(p)
        })
    }

    /// Extent of the rooms, stairways and furniture, or `None` when there
    /// are none. Apertures sit on room outlines and do not widen it.
    #[must_use]
    pub fn extent(&self) -> Option<Aabb> {
        self.extent
    }
}
