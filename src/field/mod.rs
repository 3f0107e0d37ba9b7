//! Grid rasterization of a floor and per-exit distance fields.

mod classify;
mod relax;
mod solver;

pub use classify::classify;
pub use relax::relax;
pub use solver::{DistanceFieldSolver, SolverOptions, UnreachablePolicy};

use crate::error::ConfigError;
use crate::geometry::Aabb;
use crate::math::Vec2;

/// Placement and resolution of the discretization grid.
///
/// Cell `(i, j)` covers `[x0 + a·i, y0 + a·j]` to `[x0 + a·(i+1), y0 + a·(j+1)]`
/// for `i < cols` (M) and `j < rows` (N).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    origin: Vec2,
    cell_size: f32,
    cols: usize,
    rows: usize,
}

impl GridSpec {
    /// Creates a grid description.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGrid`] for a non-positive cell size or
    /// an empty grid.
    pub fn new(
        origin: Vec2,
        cell_size: f32,
        cols: usize,
        rows: usize,
    ) -> Result<Self, ConfigError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::InvalidGrid(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        if cols == 0 || rows == 0 {
            return Err(ConfigError::InvalidGrid(format!(
                "grid must have at least one cell, got {cols} x {rows}"
            )));
        }
        if !origin.is_finite() {
            return Err(ConfigError::InvalidGrid("origin must be finite".into()));
        }
        Ok(Self {
            origin,
            cell_size,
            cols,
            rows,
        })
    }

    /// Smallest grid with cell size `cell_size` covering `extent`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGrid`] for a non-positive cell size.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn covering(extent: Aabb, cell_size: f32) -> Result<Self, ConfigError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::InvalidGrid(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        let cols = ((extent.width() / cell_size).ceil() as usize).max(1);
        let rows = ((extent.height() / cell_size).ceil() as usize).max(1);
        Self::new(extent.min, cell_size, cols, rows)
    }

    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of columns (M).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows (N).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Value assigned to obstacle cells: `M·N`, larger than any path cost.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn obstacle_value(&self) -> f64 {
        self.cell_count() as f64
    }

    /// World-space extent of cell `(i, j)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_rect(&self, i: usize, j: usize) -> Aabb {
        let a = self.cell_size;
        let min = self.origin + Vec2::new(a * i as f32, a * j as f32);
        Aabb::spanning(min, min + Vec2::new(a, a))
    }

    /// Center of cell `(i, j)`.
    #[must_use]
    pub fn cell_center(&self, i: usize, j: usize) -> Vec2 {
        self.cell_rect(i, j).center()
    }

    /// Cell containing world point `p`, or `None` off the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell_of(&self, p: Vec2) -> Option<(usize, usize)> {
        let local = (p - self.origin) * (1.0 / self.cell_size);
        if !local.is_finite() || local.x() < 0.0 || local.y() < 0.0 {
            return None;
        }
        let (i, j) = (local.x().floor() as usize, local.y().floor() as usize);
        (i < self.cols && j < self.rows).then_some((i, j))
    }
}

/// Dense `cols × rows` storage, row-major by `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    cols: usize,
    rows: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Grid filled with `value`.
    #[must_use]
    pub fn filled(cols: usize, rows: usize, value: T) -> Self {
        Self {
            cols,
            rows,
            cells: vec![value; cols * rows],
        }
    }
}

impl<T> Grid<T> {
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn index(&self, i: usize, j: usize) -> usize {
        j * self.cols + i
    }

    /// Cell `(i, j)`, or `None` out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        (i < self.cols && j < self.rows).then(|| &self.cells[self.index(i, j)])
    }

    /// Cell at a signed offset from `(i, j)`, or `None` out of bounds.
    #[must_use]
    pub fn get_offset(&self, i: usize, j: usize, di: isize, dj: isize) -> Option<&T> {
        let ii = i.checked_add_signed(di)?;
        let jj = j.checked_add_signed(dj)?;
        self.get(ii, jj)
    }

    /// Overwrites cell `(i, j)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        if i < self.cols && j < self.rows {
            let idx = self.index(i, j);
            self.cells[idx] = value;
        }
    }

    /// Cells in storage order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// `((i, j), &value)` for every cell.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, v)| ((idx % cols, idx / cols), v))
    }

    /// Applies `f` to every cell.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid<U> {
        Grid {
            cols: self.cols,
            rows: self.rows,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

/// Classification of one cell for one exit's pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Free,
    Obstacle,
    /// Boundary cell of the given (1-based) exit.
    Exit(u32),
}

impl CellState {
    /// Integer code: `-1` free, `0` obstacle, `k` for exit `k`.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Free => -1,
            Self::Obstacle => 0,
            Self::Exit(k) => i32::try_from(k).unwrap_or(i32::MAX),
        }
    }
}

/// Classification and relaxed field for a single exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitField {
    pub exit: u32,
    pub states: Grid<CellState>,
    pub values: Grid<f64>,
}

impl ExitField {
    /// Classification as integer codes, for debugging overlays.
    #[must_use]
    pub fn codes(&self) -> Grid<i32> {
        self.states.map(|s| s.code())
    }
}

/// Cost-to-nearest-exit over the whole grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    spec: GridSpec,
    values: Grid<f64>,
    exits: Vec<ExitField>,
}

impl DistanceField {
    /// Merges per-exit fields by cellwise minimum.
    pub(crate) fn merge(spec: GridSpec, exits: Vec<ExitField>) -> Self {
        let mut values = Grid::filled(spec.cols(), spec.rows(), spec.obstacle_value());
        for field in &exits {
            for (cell, merged) in values.cells.iter_mut().zip(field.values.as_slice()) {
                *cell = cell.min(*merged);
            }
        }
        Self {
            spec,
            values,
            exits,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Combined values.
    #[must_use]
    pub fn values(&self) -> &Grid<f64> {
        &self.values
    }

    /// Per-exit fields, in exit order.
    #[must_use]
    pub fn exit_fields(&self) -> &[ExitField] {
        &self.exits
    }

    #[must_use]
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i, j).copied()
    }

    /// Cell containing world point `p`, or `None` off the grid.
    #[must_use]
    pub fn cell_of(&self, p: Vec2) -> Option<(usize, usize)> {
        self.spec.cell_of(p)
    }

    /// Value of the cell containing `p`, or `None` off the grid.
    #[must_use]
    pub fn sample(&self, p: Vec2) -> Option<f64> {
        let (i, j) = self.spec.cell_of(p)?;
        self.value(i, j)
    }

    /// `p` lies in an obstacle cell, an unreachable cell, or off the grid.
    #[must_use]
    pub fn is_blocked(&self, p: Vec2) -> bool {
        self.sample(p)
            .is_none_or(|v| v >= self.spec.obstacle_value())
    }

    /// `p` lies in a boundary cell of any exit.
    #[must_use]
    pub fn is_exit(&self, p: Vec2) -> bool {
        self.spec.cell_of(p).is_some_and(|(i, j)| {
            self.exits
                .iter()
                .any(|f| matches!(f.states.get(i, j), Some(CellState::Exit(_))))
        })
    }
}
