use std::f64::consts::SQRT_2;

use tracing::{debug, warn};

use crate::error::{FieldError, Result};

use super::{CellState, Grid, UnreachablePolicy};

const KNIGHT: f64 = 2.236_067_977_499_79;

/// Smallest decrease that counts as an improvement.
const TOLERANCE: f64 = 1e-9;

/// Relaxes a classified grid into path costs toward its exit cells.
///
/// Exit cells start at `1`, obstacles at `obstacle_value`, everything else
/// unresolved (`0`). Wavefront sweeps resolve cells from the previous
/// sweep's values over a 16-neighbour stencil: orthogonal steps cost `1`,
/// diagonal steps `√2`, and knight steps `√5` through a resolved diagonal.
/// Improvement sweeps then run until no value decreases.
///
/// # Errors
///
/// Returns [`FieldError::EmptyExit`] if no cell belongs to the exit, and
/// [`FieldError::UnreachableExit`] if free cells cannot reach it under
/// [`UnreachablePolicy::Fail`]. With [`UnreachablePolicy::MarkObstacle`]
/// stranded cells get `obstacle_value` instead.
pub fn relax(
    states: &Grid<CellState>,
    exit: u32,
    obstacle_value: f64,
    policy: UnreachablePolicy,
) -> Result<Grid<f64>> {
    let mut values = states.map(|s| match s {
        CellState::Obstacle => obstacle_value,
        CellState::Exit(_) => 1.0,
        CellState::Free => 0.0,
    });
    if !states.as_slice().iter().any(|s| matches!(s, CellState::Exit(_))) {
        return Err(FieldError::EmptyExit { exit }.into());
    }

    let mut unresolved = values.as_slice().iter().filter(|v| **v == 0.0).count();
    let mut wavefronts = 0usize;
    while unresolved > 0 {
        wavefronts += 1;
        let snapshot = values.clone();
        let mut resolved = 0usize;
        for ((i, j), v) in snapshot.iter() {
            if *v != 0.0 {
                continue;
            }
            if let Some(best) = best_neighbour(&snapshot, i, j, obstacle_value) {
                values.set(i, j, best);
                resolved += 1;
            }
        }
        if resolved == 0 {
            match policy {
                UnreachablePolicy::Fail => {
                    return Err(FieldError::UnreachableExit { exit, unresolved }.into());
                }
                UnreachablePolicy::MarkObstacle => {
                    warn!(exit, stranded = unresolved, "sealing cells that cannot reach exit");
                    let stranded: Vec<_> = values
                        .iter()
                        .filter(|(_, v)| **v == 0.0)
                        .map(|(c, _)| c)
                        .collect();
                    for (i, j) in stranded {
                        values.set(i, j, obstacle_value);
                    }
                    break;
                }
            }
        }
        unresolved -= resolved;
    }

    let mut improvements = 0usize;
    loop {
        let mut changed = false;
        for j in 0..values.rows() {
            for i in 0..values.cols() {
                if states.get(i, j) != Some(&CellState::Free) {
                    continue;
                }
                let Some(&current) = values.get(i, j) else {
                    continue;
                };
                if current >= obstacle_value {
                    continue;
                }
                if let Some(best) = best_neighbour(&values, i, j, obstacle_value) {
                    if best < current - TOLERANCE {
                        values.set(i, j, best);
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
        improvements += 1;
    }

    debug!(exit, wavefronts, improvements, "relaxation converged");
    Ok(values)
}

/// Cheapest cost to reach `(i, j)` from a resolved neighbour, if any.
fn best_neighbour(values: &Grid<f64>, i: usize, j: usize, obstacle_value: f64) -> Option<f64> {
    let resolved = |di: isize, dj: isize| {
        values
            .get_offset(i, j, di, dj)
            .copied()
            .filter(|v| *v > 0.0 && *v < obstacle_value)
    };

    let mut best: Option<f64> = None;
    let mut offer = |candidate: f64| {
        best = Some(best.map_or(candidate, |b: f64| b.min(candidate)));
    };

    for (di, dj) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
        if let Some(v) = resolved(di, dj) {
            offer(v + 1.0);
        }
    }
    for (sx, sy) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let Some(diagonal) = resolved(sx, sy) else {
            continue;
        };
        offer(diagonal + SQRT_2);
        for (di, dj) in [(2 * sx, sy), (sx, 2 * sy)] {
            if let Some(v) = resolved(di, dj) {
                offer(v + KNIGHT);
            }
        }
    }
    best
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn open_grid(cols: usize, rows: usize) -> Grid<CellState> {
        Grid::filled(cols, rows, CellState::Free)
    }

    #[test]
    fn straight_line_costs() {
        let mut states = open_grid(5, 1);
        states.set(0, 0, CellState::Exit(1));
        let values = relax(&states, 1, 9.0, UnreachablePolicy::Fail).unwrap();
        assert_eq!(values.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn diagonal_and_knight_costs() {
        let mut states = open_grid(3, 3);
        states.set(0, 0, CellState::Exit(1));
        let values = relax(&states, 1, 9.0, UnreachablePolicy::Fail).unwrap();
        assert_relative_eq!(*values.get(1, 1).unwrap(), 1.0 + SQRT_2);
        assert_relative_eq!(*values.get(2, 2).unwrap(), 1.0 + 2.0 * SQRT_2);
        // (2, 1) is a knight's move away once (1, 1) has resolved.
        assert_relative_eq!(*values.get(2, 1).unwrap(), 1.0 + KNIGHT);
    }

    #[test]
    fn walls_force_detours() {
        // Exit at the left, wall in column 1 except for the top row.
        let mut states = open_grid(3, 3);
        states.set(0, 0, CellState::Exit(1));
        states.set(1, 0, CellState::Obstacle);
        states.set(1, 1, CellState::Obstacle);
        let values = relax(&states, 1, 9.0, UnreachablePolicy::Fail).unwrap();
        assert_relative_eq!(*values.get(1, 0).unwrap(), 9.0);
        assert!(*values.get(2, 0).unwrap() > *values.get(2, 2).unwrap());
    }

    #[test]
    fn missing_exit_cells_rejected() {
        let states = open_grid(2, 2);
        assert!(matches!(
            relax(&states, 4, 4.0, UnreachablePolicy::Fail),
            Err(crate::EgressError::Field(FieldError::EmptyExit { exit: 4 }))
        ));
    }

    fn walled_pocket() -> Grid<CellState> {
        let mut states = open_grid(4, 1);
        states.set(0, 0, CellState::Exit(1));
        states.set(2, 0, CellState::Obstacle);
        states
    }

    #[test]
    fn unreachable_cells_fail() {
        let err = relax(&walled_pocket(), 1, 4.0, UnreachablePolicy::Fail).unwrap_err();
        assert!(matches!(
            err,
            crate::EgressError::Field(FieldError::UnreachableExit { exit: 1, unresolved: 1 })
        ));
    }

    #[test]
    fn unreachable_cells_sealed_on_request() {
        let values = relax(&walled_pocket(), 1, 4.0, UnreachablePolicy::MarkObstacle).unwrap();
        assert_eq!(values.as_slice(), &[1.0, 2.0, 4.0, 4.0]);
    }
}
