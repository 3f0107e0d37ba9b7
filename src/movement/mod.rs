//! Per-occupant movement decisions and the step loop that commits them.
//!
//! Each step every occupant scores `q` evenly spaced headings against the
//! distance field, nearby obstacles and the surrounding crowd, draws one,
//! and proposes a move. Proposals are then clipped against each other and
//! contended destinations resolved before positions are committed together.

mod collision;
mod decision;
mod desirability;
mod sampling;
mod simulation;
mod visibility;

pub use collision::{clip_step, contention_groups, ContentionResolver, CLIP_STEPS};
pub use decision::{DecisionContext, Heading, Proposal};
pub use desirability::{crowd_density, log_desirability, normalize, Footprint};
pub use sampling::sample_index;
pub use simulation::{OccupantStep, Simulation, StepReport};
pub use visibility::{nearest_obstacle, visibility_rect};

use crate::config::EmotionalState;
use crate::geometry::Rect;
use crate::math::Vec2;

/// A person on the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub id: u32,
    pub position: Vec2,
    /// Projection diameter (m).
    pub diameter: f32,
    pub emotion: EmotionalState,
}

impl Occupant {
    #[must_use]
    pub fn new(id: u32, position: Vec2, diameter: f32) -> Self {
        Self {
            id,
            position,
            diameter,
            emotion: EmotionalState::default(),
        }
    }

    #[must_use]
    pub fn with_emotion(mut self, emotion: EmotionalState) -> Self {
        self.emotion = emotion;
        self
    }
}

/// One candidate heading as evaluated for an occupant.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionTrace {
    /// Heading angle (radians).
    pub angle: f32,
    pub direction: Vec2,
    /// Visibility rectangle, pivoted on the occupant.
    pub visibility: Rect,
    /// Distance to the nearest obstacle ahead, if one is in range.
    pub nearest_obstacle: Option<f32>,
    /// Effective free reach, `min(r, nearest_obstacle)`.
    pub reach: f32,
    /// Normalized probability of choosing this heading.
    pub probability: f64,
}

/// Everything an occupant considered during one step.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupantTrace {
    pub occupant: u32,
    pub directions: Vec<DirectionTrace>,
    /// Index into `directions` of the drawn heading.
    pub chosen: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Every heading had zero desirability.
    NoDesirableDirection,
    /// No positive step length keeps clear of other occupants.
    NoClearance,
    /// Lost the draw for a contended destination cell.
    ContentionDenied,
}

/// Result of one step for one occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Blocked(BlockReason),
    /// Reached an exit and left the floor.
    Evacuated,
}
