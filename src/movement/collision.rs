use rand::Rng;

use crate::math::Vec2;

use super::desirability::Footprint;

/// Number of equal fractions a blocked step is shortened by.
pub const CLIP_STEPS: u16 = 10;

/// Longest step along `direction` (a unit vector), at most `length`, that
/// keeps `origin`'s occupant at least `d_i/2 + d_l/2 − delta_d` from every
/// footprint in `others`.
///
/// The step shrinks in tenths of `length`. Returns `None` if no positive
/// step clears.
#[must_use]
pub fn clip_step(
    origin: Vec2,
    direction: Vec2,
    length: f32,
    diameter: f32,
    delta_d: f32,
    others: &[Footprint],
) -> Option<f32> {
    (1..=CLIP_STEPS).rev().find_map(|k| {
        let step = length * f32::from(k) / f32::from(CLIP_STEPS);
        let destination = origin + direction * step;
        let clear = others.iter().all(|other| {
            let min_gap = (diameter + other.diameter) * 0.5 - delta_d;
            destination.distance(other.center) >= min_gap
        });
        clear.then_some(step)
    })
}

/// Partitions `0..count` into groups linked by `conflicts` (taken as
/// symmetric), transitively.
///
/// Only groups of two or more are returned, members ascending and groups
/// ordered by their first member.
pub fn contention_groups(
    count: usize,
    mut conflicts: impl FnMut(usize, usize) -> bool,
) -> Vec<Vec<usize>> {
    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut parent: Vec<usize> = (0..count).collect();
    for a in 0..count {
        for b in a + 1..count {
            if conflicts(a, b) {
                let (ra, rb) = (root(&mut parent, a), root(&mut parent, b));
                if ra != rb {
                    parent[ra.max(rb)] = ra.min(rb);
                }
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); count];
    for i in 0..count {
        let r = root(&mut parent, i);
        groups[r].push(i);
    }
    groups.retain(|g| g.len() > 1);
    groups
}

/// Draws which of several conflicting occupants gets to move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentionResolver {
    tau: f64,
}

impl ContentionResolver {
    /// `tau` is the probability that nobody is admitted.
    #[must_use]
    pub fn new(tau: f64) -> Self {
        Self {
            tau: tau.clamp(0.0, 1.0),
        }
    }

    /// Index into `contenders` of the admitted occupant, or `None` if all
    /// are denied. A lone contender is always admitted.
    pub fn resolve<T, R: Rng + ?Sized>(&self, contenders: &[T], rng: &mut R) -> Option<usize> {
        match contenders.len() {
            0 => None,
            1 => Some(0),
            n => {
                if rng.random::<f64>() < self.tau {
                    None
                } else {
                    Some(rng.random_range(0..n))
                }
            }
        }
    }
}
