use super::Vec2;

/// Returns the minimum distance from point `p` to the segment `a -> b`.
///
/// A zero-length segment degrades to point-to-point distance.
#[must_use]
pub fn point_to_segment_dist(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    let len_sq = d.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }

    // Project onto the infinite line, clamp to the segment.
    let t = ((p - a).dot(d) / len_sq).clamp(0.0, 1.0);
    p.distance(a + d * t)
}

/// Closest points between two segments, as `(s, t, c1, c2)`.
///
/// `c1 = p1 + s * (q1 - p1)` and `c2 = p2 + t * (q2 - p2)` minimize
/// `|c1 - c2|²` over the unit square of parameters. The quadratic is
/// minimized in closed form on the unconstrained line pair, then clamped to
/// the square edge that contains the constrained minimum. Zero-length inputs
/// are the limiting case where the corresponding parameter is pinned to 0.
#[must_use]
pub fn closest_points_segments(p1: Vec2, q1: Vec2, p2: Vec2, q2: Vec2) -> (f32, f32, Vec2, Vec2) {
    const DEGENERATE: f64 = 1e-12;

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;

    // Widen the quadratic's coefficients to keep the closed form stable.
    let a = f64::from(d1.dot(d1));
    let e = f64::from(d2.dot(d2));
    let f = f64::from(d2.dot(r));

    let (s, t) = if a <= DEGENERATE && e <= DEGENERATE {
        (0.0, 0.0)
    } else if a <= DEGENERATE {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = f64::from(d1.dot(r));
        if e <= DEGENERATE {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = f64::from(d1.dot(d2));
            let denom = a * e - b * b;
            let mut s = if denom > DEGENERATE {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                // Parallel: any s works, pick the start.
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    #[allow(clippy::cast_possible_truncation)]
    let (s, t) = (s as f32, t as f32);
    (s, t, p1 + d1 * s, p2 + d2 * t)
}

/// Minimum Euclidean distance between segments `p1 -> q1` and `p2 -> q2`.
#[must_use]
pub fn segment_to_segment_dist(p1: Vec2, q1: Vec2, p2: Vec2, q2: Vec2) -> f32 {
    let (_, _, c1, c2) = closest_points_segments(p1, q1, p2, q2);
    c1.distance(c2)
}
