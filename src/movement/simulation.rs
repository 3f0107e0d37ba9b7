use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::ObstacleCatalog;
use crate::config::{ModelParams, SimulationOptions, SpeedTable};
use crate::error::Result;
use crate::field::DistanceField;
use crate::math::{Vec2, EPSILON};

use super::collision::{clip_step, contention_groups, ContentionResolver};
use super::decision::{DecisionContext, Proposal};
use super::desirability::Footprint;
use super::{BlockReason, Occupant, OccupantTrace, StepOutcome};

/// What happened to one occupant during a step.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupantStep {
    pub occupant: u32,
    /// Position after the step (the exit position for evacuees).
    pub position: Vec2,
    /// Destination of the drawn heading before contention and clipping.
    pub proposed: Vec2,
    pub outcome: StepOutcome,
    pub trace: OccupantTrace,
}

/// Result of one simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// 1-based step number.
    pub step: u64,
    pub occupants: Vec<OccupantStep>,
}

impl StepReport {
    /// Number of occupants with the given outcome.
    #[must_use]
    pub fn count(&self, outcome: StepOutcome) -> usize {
        self.occupants.iter().filter(|o| o.outcome == outcome).count()
    }
}

/// Stepwise evacuation of one floor.
///
/// Proposals read an immutable snapshot of the previous positions and are
/// computed independently per occupant, each with its own generator seeded
/// from the simulation seed, the step and the occupant id. Contention and
/// clipping run afterwards on the complete set of proposals; positions
/// are committed together at the end of the step.
#[derive(Debug)]
pub struct Simulation<'a> {
    catalog: &'a ObstacleCatalog,
    field: &'a DistanceField,
    params: ModelParams,
    speeds: SpeedTable,
    occupants: Vec<Occupant>,
    evacuated: Vec<(u32, u64)>,
    seed: u64,
    rng: ChaCha8Rng,
    step: u64,
}

impl<'a> Simulation<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a ObstacleCatalog,
        field: &'a DistanceField,
        params: ModelParams,
        speeds: SpeedTable,
        occupants: Vec<Occupant>,
        options: SimulationOptions,
    ) -> Self {
        Self {
            catalog,
            field,
            params,
            speeds,
            occupants,
            evacuated: Vec::new(),
            seed: options.seed,
            rng: ChaCha8Rng::seed_from_u64(options.seed),
            step: 0,
        }
    }

    /// Occupants still on the floor.
    #[must_use]
    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// `(occupant id, step)` for everyone who has left, in order.
    #[must_use]
    pub fn evacuated(&self) -> &[(u32, u64)] {
        &self.evacuated
    }

    /// Number of completed steps.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.step
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.occupants.is_empty()
    }

    fn occupant_rng(&self, id: u32) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed ^ (self.step << 32) ^ u64::from(id))
    }

    /// Advances every occupant by one step.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from the decision procedure, such as
    /// a missing speed table entry.
    pub fn step(&mut self) -> Result<StepReport> {
        self.step += 1;
        let footprints: Vec<Footprint> = self
            .occupants
            .iter()
            .map(|o| Footprint {
                center: o.position,
                diameter: o.diameter,
            })
            .collect();
        let proposals = self.propose_all(&footprints)?;

        let targets: Vec<Option<(Vec2, f32)>> = proposals
            .iter()
            .map(|p| p.heading.map(|h| (h.direction, h.length)))
            .collect();
        let proposed: Vec<Vec2> = self
            .occupants
            .iter()
            .zip(&targets)
            .map(|(o, t)| t.map_or(o.position, |(dir, len)| o.position + dir * len))
            .collect();
        let mut outcomes: Vec<StepOutcome> = targets
            .iter()
            .map(|t| match t {
                None => StepOutcome::Blocked(BlockReason::NoDesirableDirection),
                Some((_, length)) if *length <= EPSILON => {
                    StepOutcome::Blocked(BlockReason::NoClearance)
                }
                Some(_) => StepOutcome::Moved,
            })
            .collect();

        self.resolve_contention(&mut outcomes, &proposed);
        let destinations = self.clip_admitted(&mut outcomes, &targets, &proposed, &footprints);
        Ok(self.commit(proposals, outcomes, &proposed, &destinations))
    }

    fn propose_all(&self, footprints: &[Footprint]) -> Result<Vec<Proposal>> {
        let context = DecisionContext {
            catalog: self.catalog,
            field: self.field,
            params: &self.params,
            speeds: &self.speeds,
        };
        let propose = |(i, occupant): (usize, &Occupant)| {
            let crowd: Vec<Footprint> = footprints
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i)
                .map(|(_, f)| *f)
                .collect();
            let mut rng = self.occupant_rng(occupant.id);
            context.propose(occupant, &crowd, &mut rng)
        };

        #[cfg(feature = "parallel")]
        let occupants = self.occupants.par_iter();
        #[cfg(not(feature = "parallel"))]
        let occupants = self.occupants.iter();
        occupants.enumerate().map(propose).collect()
    }

    /// Movers whose proposed destinations come closer than the collision
    /// gap, or share a grid cell, contend as one group; each group is
    /// settled by a single draw.
    fn resolve_contention(&mut self, outcomes: &mut [StepOutcome], proposed: &[Vec2]) {
        let movers: Vec<usize> = (0..outcomes.len())
            .filter(|&i| outcomes[i] == StepOutcome::Moved)
            .collect();
        let groups = contention_groups(movers.len(), |a, b| {
            let (i, k) = (movers[a], movers[b]);
            let gap = (self.occupants[i].diameter + self.occupants[k].diameter) * 0.5
                - self.params.delta_d;
            proposed[i].distance(proposed[k]) < gap || {
                let cell = self.field.cell_of(proposed[i]);
                cell.is_some() && cell == self.field.cell_of(proposed[k])
            }
        });

        let resolver = ContentionResolver::new(self.params.tau);
        for group in groups {
            let admitted = resolver.resolve(&group, &mut self.rng);
            for (slot, &a) in group.iter().enumerate() {
                if admitted != Some(slot) {
                    outcomes[movers[a]] = StepOutcome::Blocked(BlockReason::ContentionDenied);
                }
            }
        }
    }

    /// Shortens every admitted move until it clears the others. Earlier
    /// movers are checked at their clipped destination, later ones at
    /// their proposed one, everyone also at their current position.
    fn clip_admitted(
        &self,
        outcomes: &mut [StepOutcome],
        targets: &[Option<(Vec2, f32)>],
        proposed: &[Vec2],
        footprints: &[Footprint],
    ) -> Vec<Vec2> {
        let mut destinations: Vec<Vec2> = self.occupants.iter().map(|o| o.position).collect();
        for (i, occupant) in self.occupants.iter().enumerate() {
            let (Some((direction, length)), StepOutcome::Moved) = (targets[i], outcomes[i]) else {
                continue;
            };
            let neighbours: Vec<Footprint> = footprints
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i)
                .flat_map(|(k, f)| {
                    let ahead = if k < i || outcomes[k] != StepOutcome::Moved {
                        destinations[k]
                    } else {
                        proposed[k]
                    };
                    [
                        *f,
                        Footprint {
                            center: ahead,
                            diameter: f.diameter,
                        },
                    ]
                })
                .collect();
            match clip_step(
                occupant.position,
                direction,
                length,
                occupant.diameter,
                self.params.delta_d,
                &neighbours,
            ) {
                Some(step) if step > EPSILON => {
                    destinations[i] = occupant.position + direction * step;
                }
                _ => outcomes[i] = StepOutcome::Blocked(BlockReason::NoClearance),
            }
        }
        destinations
    }

    fn commit(
        &mut self,
        proposals: Vec<Proposal>,
        outcomes: Vec<StepOutcome>,
        proposed: &[Vec2],
        destinations: &[Vec2],
    ) -> StepReport {
        let mut report = StepReport {
            step: self.step,
            occupants: Vec::with_capacity(self.occupants.len()),
        };
        let mut remaining = Vec::with_capacity(self.occupants.len());

        let moves = self.occupants.drain(..).zip(proposals).zip(outcomes);
        for (i, ((mut occupant, proposal), mut outcome)) in moves.enumerate() {
            if outcome == StepOutcome::Moved {
                occupant.position = destinations[i];
                let left_grid = self.field.cell_of(occupant.position).is_none();
                if left_grid || self.field.is_exit(occupant.position) {
                    outcome = StepOutcome::Evacuated;
                }
            }
            report.occupants.push(OccupantStep {
                occupant: occupant.id,
                position: occupant.position,
                proposed: proposed[i],
                outcome,
                trace: proposal.trace,
            });
            if outcome == StepOutcome::Evacuated {
                info!(occupant = occupant.id, step = self.step, "occupant evacuated");
                self.evacuated.push((occupant.id, self.step));
            } else {
                remaining.push(occupant);
            }
        }
        self.occupants = remaining;

        debug!(
            step = self.step,
            moved = report.count(StepOutcome::Moved),
            evacuated = report.count(StepOutcome::Evacuated),
            remaining = self.occupants.len(),
            "simulation step"
        );
        report
    }

    /// Steps until everyone has left or `max_steps` more steps have run.
    /// Returns the number of steps taken.
    ///
    /// # Errors
    ///
    /// See [`Simulation::step`].
    pub fn run(&mut self, max_steps: u64) -> Result<u64> {
        let start = self.step;
        while !self.is_finished() && self.step - start < max_steps {
            self.step()?;
        }
        Ok(self.step - start)
    }
}
