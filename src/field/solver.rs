#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::info;

use crate::catalog::ObstacleCatalog;
use crate::error::{FieldError, Result};

use super::{classify, relax, DistanceField, ExitField, GridSpec};

/// What to do with free cells that cannot reach an exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnreachablePolicy {
    /// Fail the solve with [`FieldError::UnreachableExit`].
    #[default]
    Fail,
    /// Give stranded cells the obstacle value and log a warning.
    MarkObstacle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverOptions {
    pub unreachable: UnreachablePolicy,
}

/// Computes the combined distance field of a floor.
///
/// Each exit is classified and relaxed independently (in parallel with the
/// `parallel` feature); the per-exit fields are merged by cellwise minimum
/// once all of them are complete.
#[derive(Debug)]
pub struct DistanceFieldSolver<'a> {
    catalog: &'a ObstacleCatalog,
    grid: GridSpec,
    options: SolverOptions,
}

impl<'a> DistanceFieldSolver<'a> {
    /// Creates a solver with default options.
    #[must_use]
    pub fn new(catalog: &'a ObstacleCatalog, grid: GridSpec) -> Self {
        Self {
            catalog,
            grid,
            options: SolverOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Classifies and relaxes the field of exit `exit` (1-based).
    ///
    /// # Errors
    ///
    /// See [`relax`].
    pub fn solve_exit(&self, exit: u32) -> Result<ExitField> {
        info!(exit, cols = self.grid.cols(), rows = self.grid.rows(), "solving exit field");
        let states = classify(self.catalog, &self.grid, exit);
        let values = relax(
            &states,
            exit,
            self.grid.obstacle_value(),
            self.options.unreachable,
        )?;
        Ok(ExitField {
            exit,
            states,
            values,
        })
    }

    /// Solves every exit and merges the results.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::NoExits`] for a catalog without exits, or the
    /// first per-exit failure.
    pub fn execute(&self) -> Result<DistanceField> {
        let count = self.catalog.exit_count();
        if count == 0 {
            return Err(FieldError::NoExits.into());
        }

        #[cfg(feature = "parallel")]
        let exits = (1..=count)
            .into_par_iter()
            .map(|exit| self.solve_exit(exit))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let exits = (1..=count)
            .map(|exit| self.solve_exit(exit))
            .collect::<Result<Vec<_>>>()?;

        info!(exits = count, "distance field solved");
        Ok(DistanceField::merge(self.grid, exits))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::SQRT_2;

    use super::*;
    use crate::catalog::{ApertureSpec, Cuboid, FloorPlan, FurnitureSpec, Room};
    use crate::field::CellState;
    use crate::math::{Point3, Vec2};
    use crate::EgressError;

    fn room(x0: f32, x1: f32) -> Room {
        Room::new(
            1,
            vec![Cuboid::new(Point3::new(x0, 0.0, 0.0), Point3::new(x1, 4.0, 3.0))],
        )
    }

    fn east_exit_room() -> ObstacleCatalog {
        let plan = FloorPlan {
            rooms: vec![room(0.0, 6.0)],
            apertures: vec![ApertureSpec::new(
                2,
                3,
                Point3::new(6.0, 1.5, 0.0),
                Point3::new(6.0, 2.5, 2.0),
            )],
            ..FloorPlan::default()
        };
        ObstacleCatalog::from_floor(&plan).unwrap()
    }

    fn two_exit_floor() -> ObstacleCatalog {
        let plan = FloorPlan {
            rooms: vec![room(0.0, 4.0), room(4.0, 8.0)],
            apertures: vec![
                ApertureSpec::new(10, 0, Point3::new(4.0, 1.5, 0.0), Point3::new(4.0, 2.5, 2.0)),
                ApertureSpec::new(11, 3, Point3::new(8.0, 1.0, 0.0), Point3::new(8.0, 2.0, 2.0)),
                ApertureSpec::new(13, 3, Point3::new(1.0, 4.0, 0.0), Point3::new(2.0, 4.0, 2.0)),
            ],
            furniture: vec![FurnitureSpec::new(20, Point3::new(2.0, 2.0, 0.0), 1.0, 0.5, 0.3)],
            stair_segments: Vec::new(),
        };
        ObstacleCatalog::from_floor(&plan).unwrap()
    }

    fn solve(catalog: &ObstacleCatalog, a: f32) -> DistanceField {
        let grid = GridSpec::covering(catalog.extent().unwrap(), a).unwrap();
        DistanceFieldSolver::new(catalog, grid).execute().unwrap()
    }

    #[test]
    fn free_cells_resolved_and_obstacles_sentinel() {
        let catalog = two_exit_floor();
        let field = solve(&catalog, 0.5);
        let sentinel = field.spec().obstacle_value();
        for exit in field.exit_fields() {
            for ((i, j), state) in exit.states.iter() {
                let v = *exit.values.get(i, j).unwrap();
                match state {
                    CellState::Obstacle => assert!((v - sentinel).abs() < f64::EPSILON),
                    CellState::Exit(_) => assert!((v - 1.0).abs() < f64::EPSILON),
                    CellState::Free => assert!(v >= 1.0 && v < sentinel),
                }
            }
        }
    }

    #[test]
    fn combined_is_cellwise_minimum() {
        let catalog = two_exit_floor();
        let field = solve(&catalog, 0.5);
        assert_eq!(field.exit_fields().len(), 2);
        for ((i, j), v) in field.values().iter() {
            let min = field
                .exit_fields()
                .iter()
                .map(|e| *e.values.get(i, j).unwrap())
                .fold(f64::INFINITY, f64::min);
            assert!((v - min).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn neighbour_differences_bounded() {
        let catalog = two_exit_floor();
        let field = solve(&catalog, 0.5);
        let sentinel = field.spec().obstacle_value();
        let values = field.values();
        for ((i, j), &v) in values.iter() {
            if v >= sentinel {
                continue;
            }
            for (di, dj, bound) in [(1, 0, 1.0), (0, 1, 1.0), (1, 1, SQRT_2), (1, -1, SQRT_2)] {
                if let Some(&n) = values.get_offset(i, j, di, dj) {
                    if n < sentinel {
                        assert!((v - n).abs() <= bound + 1e-9, "({i},{j}) -> {di},{dj}");
                    }
                }
            }
        }
    }

    #[test]
    fn east_exit_decreases_eastward() {
        let catalog = east_exit_room();
        let field = solve(&catalog, 0.5);
        let row = 4;
        let interior: Vec<f64> = (1..11).map(|i| field.value(i, row).unwrap()).collect();
        assert!(interior.windows(2).all(|w| w[0] > w[1]), "{interior:?}");
        assert!(field.values().as_slice().iter().all(|v| *v > 0.0));
        assert!(field.is_exit(Vec2::new(5.9, 2.0)));
        assert!(field.is_blocked(Vec2::new(0.1, 2.0)));
        assert!(!field.is_blocked(Vec2::new(3.0, 2.0)));
        assert!(field.sample(Vec2::new(7.0, 2.0)).is_none());
    }

    #[test]
    fn catalog_without_exits_rejected() {
        let plan = FloorPlan {
            rooms: vec![room(0.0, 4.0)],
            ..FloorPlan::default()
        };
        let catalog = ObstacleCatalog::from_floor(&plan).unwrap();
        let grid = GridSpec::covering(catalog.extent().unwrap(), 1.0).unwrap();
        assert!(matches!(
            DistanceFieldSolver::new(&catalog, grid).execute(),
            Err(EgressError::Field(FieldError::NoExits))
        ));
    }

    fn sealed_room_floor() -> ObstacleCatalog {
        // The second room has no door to the first.
        let plan = FloorPlan {
            rooms: vec![room(0.0, 4.0), room(4.0, 8.0)],
            apertures: vec![ApertureSpec::new(
                11,
                3,
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 2.0, 2.0),
            )],
            ..FloorPlan::default()
        };
        ObstacleCatalog::from_floor(&plan).unwrap()
    }

    #[test]
    fn unreachable_exit_errors() {
        let catalog = sealed_room_floor();
        let grid = GridSpec::covering(catalog.extent().unwrap(), 0.5).unwrap();
        let result = DistanceFieldSolver::new(&catalog, grid).execute();
        assert!(matches!(
            result,
            Err(EgressError::Field(FieldError::UnreachableExit { exit: 1, .. }))
        ));
    }

    #[test]
    fn stranded_cells_sealed_on_request() {
        let catalog = sealed_room_floor();
        let grid = GridSpec::covering(catalog.extent().unwrap(), 0.5).unwrap();
        let field = DistanceFieldSolver::new(&catalog, grid)
            .with_options(SolverOptions {
                unreachable: UnreachablePolicy::MarkObstacle,
            })
            .execute()
            .unwrap();
        assert!(field.is_blocked(Vec2::new(6.0, 2.0)));
        assert!(!field.is_blocked(Vec2::new(2.0, 2.0)));
    }
}
