use thiserror::Error;

/// Top-level error type for the evacuation core.
#[derive(Debug, Error)]
pub enum EgressError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Violated invariants of the 2D geometry kernel.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("segment endpoints out of order: ({x1}, {y1}) -> ({x2}, {y2})")]
    Unordered { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("zero-length vector")]
    ZeroVector,

    #[error("lines are parallel")]
    Parallel,

    #[error("matrix is singular (determinant {determinant})")]
    Singular { determinant: f32 },

    #[error("rotation pivot must lie on exactly one rectangle edge")]
    PivotNotOnEdge,
}

/// Invalid or missing configuration, detected before any simulation step.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing model parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("model parameter `{key}` must be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },

    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("building has no floors")]
    NoFloors,

    #[error("{what} lists {found} floors, expected {expected}")]
    FloorCountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unknown aperture type code {0}")]
    UnknownApertureType(u8),

    #[error("no lookup table entry for {0}")]
    MissingLookup(String),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

/// Failures of the distance field solver.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("floor has no exits")]
    NoExits,

    #[error("exit {exit} does not overlap any grid cell")]
    EmptyExit { exit: u32 },

    #[error("exit {exit} cannot reach {unresolved} remaining cells")]
    UnreachableExit { exit: u32, unresolved: usize },
}

/// Convenience type alias for results using [`EgressError`].
pub type Result<T> = std::result::Result<T, EgressError>;
