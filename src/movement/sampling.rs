/// Index drawn from the distribution `probabilities` by a uniform `draw`
/// in `[0, 1)`, walking the cumulative sum.
///
/// Rounding shortfalls fall back to the last index with nonzero
/// probability. Returns `None` if every probability is zero.
#[must_use]
pub fn sample_index(probabilities: &[f64], draw: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last = None;
    for (i, &p) in probabilities.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last = Some(i);
        if draw < cumulative {
            return Some(i);
        }
    }
    last
}
