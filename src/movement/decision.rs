use std::f32::consts::TAU;

use rand::Rng;

use crate::catalog::ObstacleCatalog;
use crate::config::{ModelParams, PathType, SpeedTable};
use crate::error::{ConfigError, Result};
use crate::field::DistanceField;
use crate::math::Vec2;

use super::desirability::{crowd_density, log_desirability, normalize, Footprint};
use super::sampling::sample_index;
use super::visibility::{nearest_obstacle, visibility_rect};
use super::{DirectionTrace, Occupant, OccupantTrace};

/// The drawn heading and the full step it allows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    pub direction: Vec2,
    pub length: f32,
}

/// An occupant's intended move for the current step.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub trace: OccupantTrace,
    /// `None` when no heading was desirable.
    pub heading: Option<Heading>,
}

/// Read-only inputs shared by every decision of one step.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub catalog: &'a ObstacleCatalog,
    pub field: &'a DistanceField,
    pub params: &'a ModelParams,
    pub speeds: &'a SpeedTable,
}

impl DecisionContext<'_> {
    /// Doorway inside a door-like aperture, horizontal otherwise.
    #[must_use]
    pub fn path_type(&self, position: Vec2) -> PathType {
        if self.catalog.doorway_at(position).is_some() {
            PathType::Doorway
        } else {
            PathType::Horizontal
        }
    }

    /// Scores the `q` headings of `occupant` and draws one.
    ///
    /// `crowd` holds every other occupant's footprint at the previous
    /// positions. Headings whose probe point one cell ahead is off the grid
    /// or in an obstacle are ruled out. The full step is `v·dt`, shortened
    /// so the body stays clear of the obstacle ahead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] if the visual range does not
    /// exceed the occupant's half diameter, and
    /// [`ConfigError::MissingLookup`] if no speed is configured for the
    /// occupant's situation.
    #[allow(clippy::cast_precision_loss)]
    pub fn propose<R: Rng + ?Sized>(
        &self,
        occupant: &Occupant,
        crowd: &[Footprint],
        rng: &mut R,
    ) -> Result<Proposal> {
        let params = self.params;
        let position = occupant.position;
        let diameter = occupant.diameter;
        let half = diameter * 0.5;
        if params.r <= half {
            return Err(ConfigError::OutOfRange {
                parameter: "r",
                value: f64::from(params.r),
                min: f64::from(half),
                max: f64::from(f32::MAX),
            }
            .into());
        }

        let probe = self.field.spec().cell_size();
        let blocked_value = self.field.spec().obstacle_value();
        let here = self.field.sample(position);

        let mut directions = Vec::with_capacity(params.q);
        let mut exponents = Vec::with_capacity(params.q);
        for j in 1..=params.q {
            let angle = TAU * j as f32 / params.q as f32;
            let direction = Vec2::from_angle(angle);
            let visibility = visibility_rect(position, params.r, diameter, angle)?;
            let nearest = nearest_obstacle(self.catalog, &visibility);
            let reach = nearest.map_or(params.r, |d| d.min(params.r));

            let ahead = self.field.sample(position + direction * probe);
            let exponent = match (here, ahead) {
                (Some(h), Some(t)) if t < blocked_value => {
                    let density = visibility_rect(position, reach, diameter, angle)
                        .map_or(1.0, |strip| crowd_density(&strip, diameter, reach, crowd));
                    log_desirability(params, diameter, h - t, reach, density)
                }
                _ => None,
            };

            exponents.push(exponent);
            directions.push(DirectionTrace {
                angle,
                direction,
                visibility,
                nearest_obstacle: nearest,
                reach,
                probability: 0.0,
            });
        }

        let mut trace = OccupantTrace {
            occupant: occupant.id,
            directions,
            chosen: None,
        };
        let Some(probabilities) = normalize(&exponents) else {
            return Ok(Proposal {
                trace,
                heading: None,
            });
        };
        for (d, p) in trace.directions.iter_mut().zip(&probabilities) {
            d.probability = *p;
        }

        let Some(chosen) = sample_index(&probabilities, rng.random::<f64>()) else {
            return Ok(Proposal {
                trace,
                heading: None,
            });
        };
        trace.chosen = Some(chosen);

        let speed = self
            .speeds
            .speed(self.path_type(position), occupant.emotion)?;
        let target = &trace.directions[chosen];
        let length = (speed * params.dt).min(target.reach - half).max(0.0);
        let heading = Heading {
            direction: target.direction,
            length,
        };
        Ok(Proposal {
            trace,
            heading: Some(heading),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::catalog::{ApertureSpec, Cuboid, FloorPlan, Room};
    use crate::field::{DistanceFieldSolver, GridSpec};
    use crate::math::Point3;

    struct Fixture {
        catalog: ObstacleCatalog,
        field: DistanceField,
        params: ModelParams,
        speeds: SpeedTable,
    }

    impl Fixture {
        fn new() -> Self {
            let plan = FloorPlan {
                rooms: vec![Room::new(
                    1,
                    vec![Cuboid::new(Point3::new(0.0, 0.0, 0.0), Point3::new(6.0, 4.0, 3.0))],
                )],
                apertures: vec![ApertureSpec::new(
                    2,
                    3,
                    Point3::new(6.0, 1.5, 0.0),
                    Point3::new(6.0, 2.5, 2.0),
                )],
                ..FloorPlan::default()
            };
            let catalog = ObstacleCatalog::from_floor(&plan).unwrap();
            let grid = GridSpec::covering(catalog.extent().unwrap(), 0.5).unwrap();
            let field = DistanceFieldSolver::new(&catalog, grid).execute().unwrap();
            Self {
                catalog,
                field,
                params: ModelParams {
                    r: 2.0,
                    w: 0.1,
                    delta_d: 0.0,
                    kw: 1.0,
                    kp: 1.0,
                    ks: 6.0,
                    q: 8,
                    tau: 0.3,
                    dt: 1.0,
                },
                speeds: SpeedTable::new()
                    .with_path(PathType::Horizontal, 1.0)
                    .with_path(PathType::Doorway, 0.8),
            }
        }

        fn context(&self) -> DecisionContext<'_> {
            DecisionContext {
                catalog: &self.catalog,
                field: &self.field,
                params: &self.params,
                speeds: &self.speeds,
            }
        }
    }

    #[test]
    fn traces_every_heading() {
        let fx = Fixture::new();
        let occupant = Occupant::new(1, Vec2::new(2.0, 2.0), 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let proposal = fx.context().propose(&occupant, &[], &mut rng).unwrap();
        assert_eq!(proposal.trace.directions.len(), 8);
        let total: f64 = proposal.trace.directions.iter().map(|d| d.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        // Facing west the outer wall is 2 m away, exactly the visual range.
        let west = &proposal.trace.directions[3];
        assert!((west.reach - 2.0).abs() < 1e-3);
        assert!(proposal.trace.chosen.is_some());
    }

    #[test]
    fn prefers_heading_down_the_field() {
        let fx = Fixture::new();
        let occupant = Occupant::new(1, Vec2::new(2.0, 2.0), 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let proposal = fx.context().propose(&occupant, &[], &mut rng).unwrap();
        let east = proposal.trace.directions[7].probability;
        let west = proposal.trace.directions[3].probability;
        assert!(east > west * 100.0, "east {east}, west {west}");
    }

    #[test]
    fn step_stops_short_of_wall() {
        let fx = Fixture::new();
        // 0.5 m from the north wall; only headings away from it have room.
        let occupant = Occupant::new(1, Vec2::new(3.0, 3.5), 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let proposal = fx.context().propose(&occupant, &[], &mut rng).unwrap();
        let north = &proposal.trace.directions[1];
        assert!(north.nearest_obstacle.is_some());
        assert!(north.probability.abs() < f64::EPSILON);
        let heading = proposal.heading.unwrap();
        let destination = occupant.position + heading.direction * heading.length;
        assert!(destination.y() <= 4.0 - 0.2 + 1e-3);
    }

    #[test]
    fn doorway_speed_used_in_doorway() {
        let fx = Fixture::new();
        assert_eq!(fx.context().path_type(Vec2::new(6.0, 2.0)), PathType::Doorway);
        assert_eq!(fx.context().path_type(Vec2::new(3.0, 2.0)), PathType::Horizontal);
    }

    #[test]
    fn range_must_exceed_body() {
        let fx = Fixture::new();
        let occupant = Occupant::new(1, Vec2::new(2.0, 2.0), 5.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(fx.context().propose(&occupant, &[], &mut rng).is_err());
    }

    #[test]
    fn missing_speed_is_an_error() {
        let mut fx = Fixture::new();
        fx.speeds = SpeedTable::new();
        let occupant = Occupant::new(1, Vec2::new(2.0, 2.0), 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(fx.context().propose(&occupant, &[], &mut rng).is_err());
    }
}
