use crate::catalog::{ApertureKind, ObstacleCatalog, ObstacleKind};
use crate::geometry::{Aabb, HasExtent};

use super::{CellState, Grid, GridSpec};

/// Classifies every cell of `spec` for the pass of exit `exit` (1-based).
///
/// Priority, first match wins:
/// 1. overlaps exit `exit` → [`CellState::Exit`]
/// 2. overlaps any exit or inner door → [`CellState::Free`]
/// 3. obstructed by a room outline or stairway, unless it overlaps a gap
///    (fake aperture) → [`CellState::Obstacle`]
/// 4. obstructed by furniture or a window → [`CellState::Obstacle`]
/// 5. otherwise [`CellState::Free`]
///
/// Apertures thinner than a cell are widened to one cell before testing.
#[must_use]
pub fn classify(catalog: &ObstacleCatalog, spec: &GridSpec, exit: u32) -> Grid<CellState> {
    let a = spec.cell_size();
    let widened = |kinds: &[ApertureKind]| -> Vec<(Option<u32>, Aabb)> {
        catalog
            .iter()
            .map(|(_, o)| o)
            .filter(|o| o.aperture_kind().is_some_and(|k| kinds.contains(&k)))
            .map(|o| (o.exit_number(), o.extent().with_min_thickness(a)))
            .collect()
    };
    let passages = widened(&[ApertureKind::Exit, ApertureKind::InnerDoor]);
    let gaps = widened(&[ApertureKind::Fake]);

    let structural: Vec<_> = catalog
        .iter()
        .map(|(_, o)| o)
        .filter(|o| matches!(o.kind(), ObstacleKind::Room | ObstacleKind::Stairway))
        .collect();
    let solid: Vec<_> = catalog
        .iter()
        .map(|(_, o)| o)
        .filter(|o| {
            matches!(
                o.kind(),
                ObstacleKind::Furniture | ObstacleKind::Aperture(ApertureKind::Window)
            )
        })
        .collect();

    let mut states = Grid::filled(spec.cols(), spec.rows(), CellState::Free);
    for j in 0..spec.rows() {
        for i in 0..spec.cols() {
            let cell = spec.cell_rect(i, j);
            let state = if passages
                .iter()
                .any(|(n, e)| *n == Some(exit) && e.overlaps(&cell))
            {
                CellState::Exit(exit)
            } else if passages.iter().any(|(_, e)| e.overlaps(&cell)) {
                CellState::Free
            } else if structural.iter().any(|o| o.covers_cell(&cell))
                && !gaps.iter().any(|(_, e)| e.overlaps(&cell))
            {
                CellState::Obstacle
            } else if solid.iter().any(|o| o.covers_cell(&cell)) {
                CellState::Obstacle
            } else {
                CellState::Free
            };
            states.set(i, j, state);
        }
    }
    states
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{ApertureSpec, Cuboid, FloorPlan, FurnitureSpec, Room};
    use crate::math::Point3;

    fn corridor(gap: bool) -> ObstacleCatalog {
        let mut plan = FloorPlan {
            rooms: vec![
                Room::new(
                    1,
                    vec![Cuboid::new(
                        Point3::new(0.0, 0.0, 0.0),
                        Point3::new(3.0, 2.0, 3.0),
                    )],
                ),
                Room::new(
                    2,
                    vec![Cuboid::new(
                        Point3::new(3.0, 0.0, 0.0),
                        Point3::new(6.0, 2.0, 3.0),
                    )],
                ),
            ],
            apertures: vec![ApertureSpec::new(
                5,
                3,
                Point3::new(6.0, 0.5, 0.0),
                Point3::new(6.0, 1.5, 2.0),
            )],
            furniture: vec![FurnitureSpec::new(9, Point3::new(1.5, 1.0, 0.0), 0.6, 0.6, 0.0)],
            stair_segments: Vec::new(),
        };
        if gap {
            plan.apertures.push(ApertureSpec::new(
                6,
                2,
                Point3::new(3.0, 0.0, 0.0),
                Point3::new(3.0, 2.0, 2.0),
            ));
        }
        ObstacleCatalog::from_floor(&plan).unwrap()
    }

    fn grid(catalog: &ObstacleCatalog) -> GridSpec {
        GridSpec::covering(catalog.extent().unwrap(), 0.5).unwrap()
    }

    #[test]
    fn exit_cells_marked_on_outline() {
        let catalog = corridor(false);
        let spec = grid(&catalog);
        let states = classify(&catalog, &spec, 1);
        assert_eq!(spec.cols(), 12);
        assert_eq!(states.get(11, 1), Some(&CellState::Exit(1)));
        assert_eq!(states.get(11, 2), Some(&CellState::Exit(1)));
        assert_eq!(states.get(11, 0), Some(&CellState::Obstacle));
    }

    #[test]
    fn outline_and_furniture_block() {
        let catalog = corridor(false);
        let spec = grid(&catalog);
        let states = classify(&catalog, &spec, 1);
        // Outer wall, shared wall, interior, furniture.
        assert_eq!(states.get(0, 1), Some(&CellState::Obstacle));
        assert_eq!(states.get(5, 1), Some(&CellState::Obstacle));
        assert_eq!(states.get(6, 1), Some(&CellState::Obstacle));
        assert_eq!(states.get(8, 1), Some(&CellState::Free));
        assert_eq!(states.get(2, 1), Some(&CellState::Obstacle));
    }

    #[test]
    fn gap_opens_shared_wall() {
        let catalog = corridor(true);
        let spec = grid(&catalog);
        let states = classify(&catalog, &spec, 1);
        assert_eq!(states.get(5, 1), Some(&CellState::Free));
        assert_eq!(states.get(6, 2), Some(&CellState::Free));
        assert_eq!(states.get(0, 1), Some(&CellState::Obstacle));
    }

    #[test]
    fn adjoining_rooms_are_walled() {
        let plan = FloorPlan {
            rooms: vec![
                Room::new(
                    1,
                    vec![Cuboid::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 3.0))],
                ),
                Room::new(
                    2,
                    vec![Cuboid::new(Point3::new(4.0, 0.0, 0.0), Point3::new(8.0, 4.0, 3.0))],
                ),
            ],
            apertures: vec![ApertureSpec::new(
                1,
                3,
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 2.0, 2.0),
            )],
            ..FloorPlan::default()
        };
        let catalog = ObstacleCatalog::from_floor(&plan).unwrap();
        let spec = grid(&catalog);
        let states = classify(&catalog, &spec, 1);
        let count = |wanted: CellState| states.iter().filter(|(_, s)| **s == wanted).count();
        assert_eq!(count(CellState::Exit(1)), 2);
        // Ring of each 8x8 room.
        assert_eq!(count(CellState::Obstacle), 2 * 28 - 2);
        for j in 1..7 {
            assert_eq!(states.get(7, j), Some(&CellState::Obstacle));
            assert_eq!(states.get(8, j), Some(&CellState::Obstacle));
            assert_eq!(states.get(15, j), Some(&CellState::Obstacle));
        }
        assert_eq!(states.get(3, 3), Some(&CellState::Free));
    }

    #[test]
    fn other_exit_cells_are_free() {
        let mut plan = FloorPlan {
            rooms: vec![Room::new(
                1,
                vec![Cuboid::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 3.0))],
            )],
            ..FloorPlan::default()
        };
        for (id, x) in [(1, 4.0), (2, 0.0)] {
            plan.apertures.push(ApertureSpec::new(
                id,
                3,
                Point3::new(x, 1.0, 0.0),
                Point3::new(x, 2.0, 2.0),
            ));
        }
        let catalog = ObstacleCatalog::from_floor(&plan).unwrap();
        let spec = GridSpec::covering(catalog.extent().unwrap(), 1.0).unwrap();
        let first = classify(&catalog, &spec, 1);
        let second = classify(&catalog, &spec, 2);
        assert_eq!(first.get(3, 1), Some(&CellState::Exit(1)));
        assert_eq!(first.get(0, 1), Some(&CellState::Free));
        assert_eq!(second.get(0, 1), Some(&CellState::Exit(2)));
        assert_eq!(second.get(3, 1), Some(&CellState::Free));
    }
}
