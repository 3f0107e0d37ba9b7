use std::f64::consts::PI;

use crate::config::ModelParams;
use crate::geometry::Rect;
use crate::math::{Vec2, EPSILON};

/// Body of another occupant, for the crowd-density term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub center: Vec2,
    pub diameter: f32,
}

impl Footprint {
    fn area(self) -> f64 {
        let radius = f64::from(self.diameter) * 0.5;
        PI * radius * radius
    }
}

/// Exponent of the unnormalized desirability of one heading, or `None`
/// when the heading is ruled out.
///
/// `ks·ΔS − kw·(1 − (r* − d/2)/(r − d/2))·H(ΔS) − kp·F`, where `ΔS` is
/// the drop of the distance field along the heading, `r*` the free reach
/// and `F` the crowd density ahead. Headings whose reach is below
/// `w + d/2` are ruled out.
#[must_use]
pub fn log_desirability(
    params: &ModelParams,
    diameter: f32,
    field_drop: f64,
    reach: f32,
    density: f64,
) -> Option<f64> {
    let half = diameter * 0.5;
    if reach < params.w + half {
        return None;
    }
    let heaviside = if field_drop >= 0.0 { 1.0 } else { 0.0 };
    let closeness = 1.0 - f64::from(reach - half) / f64::from(params.r - half);
    Some(
        params.ks * field_drop
            - params.kw * closeness * heaviside
            - params.kp * density.clamp(0.0, 1.0),
    )
}

/// Fraction of `strip` (of area `width · length`) covered by the
/// footprints whose centers lie inside it, clamped to `[0, 1]`.
#[must_use]
pub fn crowd_density(strip: &Rect, width: f32, length: f32, others: &[Footprint]) -> f64 {
    let area = f64::from(width) * f64::from(length);
    if area <= 0.0 {
        return 0.0;
    }
    let covered: f64 = others
        .iter()
        .filter(|f| strip.contains_point(f.center))
        .map(|f| f.area())
        .sum();
    (covered / area).clamp(0.0, 1.0)
}

/// Turns exponents into probabilities, shifting by the largest exponent
/// first. Ruled-out headings get probability `0`.
///
/// Returns `None` if every heading is ruled out.
#[must_use]
pub fn normalize(exponents: &[Option<f64>]) -> Option<Vec<f64>> {
    let max = exponents.iter().flatten().copied().reduce(f64::max)?;
    let weights: Vec<f64> = exponents
        .iter()
        .map(|e| e.map_or(0.0, |e| (e - max).exp()))
        .collect();
    let total: f64 = weights.iter().sum();
    if total < f64::from(EPSILON) || !total.is_finite() {
        return None;
    }
    Some(weights.into_iter().map(|w| w / total).collect())
}
