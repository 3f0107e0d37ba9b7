pub mod catalog;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod math;
pub mod movement;

pub use error::{EgressError, Result};
