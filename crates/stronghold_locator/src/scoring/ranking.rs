//! Normalization, fallback substitution, ordering and truncation of candidates.
use tracing::warn;

use crate::scoring::candidate::{CalculationPath, Candidate};
use crate::scoring::scorer::Scored;
use crate::scoring::{Diagnostic, ScoringConfig, Sighting};

/// Sets `normalized_probability` to each raw score's share of the total. Leaves the
/// candidates untouched and returns `false` when the total is not positive.
pub fn normalize(candidates: &mut [Candidate]) -> bool {
    let total: f64 = candidates.iter().map(|c| c.raw_score).sum();
    if !(total > 0.0 && total.is_finite()) {
        return false;
    }
    for c in candidates.iter_mut() {
        c.normalized_probability = c.raw_score / total;
    }
    true
}

/// Orders candidates by descending probability. Candidates within `epsilon` of the
/// most probable member of their run are ordered by ascending distance instead.
///
/// The order is total and deterministic: equal keys keep their input order.
pub fn rank(candidates: &mut [Candidate], epsilon: f64) {
    candidates.sort_by(|a, b| b.normalized_probability.total_cmp(&a.normalized_probability));

    let mut start = 0;
    while start < candidates.len() {
        let lead = candidates[start].normalized_probability;
        let end = candidates[start + 1..]
            .iter()
            .position(|c| lead - c.normalized_probability >= epsilon)
            .map_or(candidates.len(), |offset| start + 1 + offset);
        candidates[start..end]
            .sort_by(|a, b| a.distance_from_observer.total_cmp(&b.distance_from_observer));
        start = end;
    }
}

/// Long-range projection along `sighting`'s ray.
pub fn fallback_candidate(sighting: &Sighting, config: &ScoringConfig) -> Candidate {
    let point = sighting.ray().at(config.fallback_distance);
    Candidate::new(
        point,
        sighting.eye,
        None,
        config.fallback_confidence,
        CalculationPath::LongRangeFallback,
    )
}

/// Absolute confidence for paths that do not derive it from the probability share.
fn fixed_confidence(path: CalculationPath, config: &ScoringConfig) -> Option<f64> {
    match path {
        CalculationPath::Triangulated | CalculationPath::TriangulatedOutsideCells => {
            Some(config.triangulation_confidence)
        }
        CalculationPath::LongRangeFallback => Some(config.fallback_confidence),
        CalculationPath::DistanceExactPoint => Some(config.exact_point_prior),
        CalculationPath::AngleProjection | CalculationPath::DistanceSnap => None,
    }
}

/// Turns scored candidates into the final result set.
///
/// Substitutes a long-range fallback along `sighting` when the total score is zero,
/// normalizes, ranks, keeps at most `top_k` (at least one) and renormalizes over the
/// kept set so the returned probabilities sum to one.
pub fn finalize(scored: Scored, sighting: &Sighting, config: &ScoringConfig, top_k: usize) -> Scored {
    let Scored {
        mut candidates,
        mut diagnostics,
    } = scored;

    if !normalize(&mut candidates) {
        warn!(
            "No cell matched heading {:.2}; projecting {} blocks ahead.",
            sighting.heading, config.fallback_distance
        );
        candidates = vec![fallback_candidate(sighting, config)];
        normalize(&mut candidates);
        if !diagnostics.contains(&Diagnostic::NoRayCellIntersection) {
            diagnostics.push(Diagnostic::NoRayCellIntersection);
        }
    }

    rank(&mut candidates, config.tie_epsilon);
    candidates.truncate(top_k.max(1));
    normalize(&mut candidates);

    for c in &mut candidates {
        c.confidence = fixed_confidence(c.path, config).unwrap_or(c.normalized_probability);
    }

    Scored {
        candidates,
        diagnostics,
    }
}
