//! Detection-to-track similarity scoring.

use crate::shared::point::Point;

const DISTANCE_WEIGHT: f64 = 0.7;
const SIZE_WEIGHT: f64 = 0.3;

/// Weighted blend of center proximity and size agreement, in `[0, 1]`.
///
/// The distance term falls linearly to zero at `match_threshold`; the size
/// term is one minus the relative size difference. Non-finite centers or
/// NaN sizes score zero.
pub fn similarity(
    center_a: &Point,
    size_a: f64,
    center_b: &Point,
    size_b: f64,
    match_threshold: f64,
) -> f64 {
    if !(center_a.is_finite() && center_b.is_finite()) || size_a.is_nan() || size_b.is_nan() {
        return 0.0;
    }

    let distance = center_a.distance_to(center_b);
    let distance_score = (1.0 - distance / match_threshold).max(0.0);

    let larger = size_a.max(size_b);
    let size_score = if larger > 0.0 {
        (1.0 - (size_a - size_b).abs() / larger).max(0.0)
    } else {
        1.0
    };

    DISTANCE_WEIGHT * distance_score + SIZE_WEIGHT * size_score
}

/// Highest-scoring candidate whose score strictly exceeds `min_similarity`.
///
/// Candidates are `(key, center, size)`; ties keep the earliest candidate.
pub fn best_match<K, I>(
    center: &Point,
    size: f64,
    candidates: I,
    match_threshold: f64,
    min_similarity: f64,
) -> Option<(K, f64)>
where
    I: IntoIterator<Item = (K, Point, f64)>,
{
    let mut best: Option<(K, f64)> = None;
    for (key, candidate_center, candidate_size) in candidates {
        let score = similarity(center, size, &candidate_center, candidate_size, match_threshold);
        if score <= min_similarity {
            continue;
        }
        if best.as_ref().map_or(true, |(_, s)| score > *s) {
            best = Some((key, score));
        }
    }
    best
}
