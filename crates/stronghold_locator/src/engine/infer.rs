//! Mode selection and the stateless inference entry point.
use tracing::{info, warn};

use crate::cells::CellSet;
use crate::engine::events::{EventSink, InferenceEvent, InferenceEventKind};
use crate::engine::observation::{PositionSource, RecordedThrow, ThrowObservation};
use crate::engine::state::{EngineConfig, InferenceResult, ResolutionMode, MAX_THROWS};
use crate::error::{Error, Result};
use crate::scoring::{finalize, Diagnostic, Scored, Scorer};

/// Ranks candidates for one or two throws without keeping any session state.
///
/// Unreadable positions are substituted from an earlier readable throw in `throws`,
/// else from the configured default position. Of two throws, an unreadable one is
/// left out and the other is scored alone.
pub fn infer(
    cells: &CellSet,
    config: &EngineConfig,
    throws: &[ThrowObservation],
    top_k: usize,
) -> Result<InferenceResult> {
    config.validate()?;
    check_throw_count(throws.len())?;

    let mut last_known = None;
    let mut recorded = Vec::with_capacity(throws.len());
    for observation in throws {
        let throw = RecordedThrow::resolve(*observation, last_known, config.default_position)?;
        if throw.source == PositionSource::Read {
            last_known = Some(throw.position);
        }
        recorded.push(throw);
    }
    run(cells, config, &recorded, top_k, &mut ())
}

fn check_throw_count(count: usize) -> Result<()> {
    match count {
        0 => Err(Error::NoObservation),
        n if n > MAX_THROWS => Err(Error::MalformedInput(format!(
            "at most {MAX_THROWS} throws can be combined, got {n}"
        ))),
        _ => Ok(()),
    }
}

/// Scores already-resolved throws and assembles the final result.
pub(crate) fn run(
    cells: &CellSet,
    config: &EngineConfig,
    throws: &[RecordedThrow],
    top_k: usize,
    sink: &mut dyn EventSink,
) -> Result<InferenceResult> {
    check_throw_count(throws.len())?;
    if top_k == 0 {
        return Err(Error::MalformedInput("top_k must be > 0".into()));
    }

    let scoring = &config.scoring;
    let scorer = Scorer::new(cells, scoring);

    // A substituted position never takes part in triangulation while the other
    // throw was read; the readable one is scored alone.
    let mut diagnostics = Vec::new();
    let (slot, primary, secondary) = match throws {
        [first, second] if second.is_substituted() => {
            warn!("Second throw has no readable position; scoring the first throw alone.");
            diagnostics.push(Diagnostic::ThrowSkipped { slot: 1 });
            (0, first, None)
        }
        [first, second] if first.is_substituted() => {
            warn!("First throw has no readable position; scoring the second throw alone.");
            diagnostics.push(Diagnostic::ThrowSkipped { slot: 0 });
            (1, second, None)
        }
        [first, second] => (0, first, Some(second)),
        [only, ..] => (0, only, None),
        [] => return Err(Error::NoObservation),
    };
    if primary.is_substituted() {
        diagnostics.push(Diagnostic::InvalidObservation {
            slot,
            substitute: primary.source,
        });
    }

    let primary_sighting = primary.sighting(scoring.eye_offset);
    let planned = match secondary {
        Some(_) => ResolutionMode::Triangulated,
        None if primary_sighting.measured_distance.is_some() => {
            ResolutionMode::SingleRayWithDistance
        }
        None => ResolutionMode::SingleRay,
    };
    if sink.wants(InferenceEventKind::CalculationStarted) {
        sink.send(InferenceEvent::CalculationStarted {
            mode: planned,
            throw_count: throws.len(),
        });
    }

    let (mode, scored) = match secondary {
        Some(second) => {
            match scorer.triangulate(&primary_sighting, &second.sighting(scoring.eye_offset)) {
                Ok(scored) => (planned, scored),
                Err(failure) => {
                    warn!("Triangulation failed ({failure:?}); scoring the first throw alone.");
                    diagnostics.push(Diagnostic::ParallelOrDivergentRays(failure));
                    (
                        ResolutionMode::TriangulationFallback,
                        scorer.score_angle_only(&primary_sighting),
                    )
                }
            }
        }
        None => (planned, scorer.score_single(&primary_sighting)),
    };

    diagnostics.extend(scored.diagnostics);
    let Scored {
        mut candidates,
        diagnostics,
    } = finalize(
        Scored {
            candidates: scored.candidates,
            diagnostics,
        },
        &primary_sighting,
        scoring,
        top_k,
    );

    let degraded = diagnostics.iter().any(Diagnostic::degrades_confidence);
    for candidate in &mut candidates {
        if degraded {
            candidate.confidence *= config.degraded_confidence_factor;
        }
        for diagnostic in &diagnostics {
            candidate.annotate(&diagnostic.to_string());
        }
    }

    if sink.wants(InferenceEventKind::Diagnostic) {
        for diagnostic in &diagnostics {
            sink.send(InferenceEvent::Diagnostic {
                diagnostic: *diagnostic,
            });
        }
    }
    info!(
        "Calculated {} candidates in {:?} mode.",
        candidates.len(),
        mode
    );
    if sink.wants(InferenceEventKind::CalculationFinished) {
        sink.send(InferenceEvent::CalculationFinished {
            mode,
            candidates: candidates.clone(),
        });
    }

    Ok(InferenceResult {
        mode,
        candidates,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;
    use crate::scoring::CalculationPath;

    #[test]
    fn infer_rejects_empty_and_oversized_input() {
        let cells = CellSet::standard();
        let config = EngineConfig::default();
        assert!(matches!(
            infer(&cells, &config, &[], 5),
            Err(Error::NoObservation)
        ));
        let throw = ThrowObservation::new(IVec3::ZERO, 0.0);
        assert!(matches!(
            infer(&cells, &config, &[throw; 3], 5),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            infer(&cells, &config, &[throw], 0),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn infer_respects_top_k() {
        let cells = CellSet::standard();
        let config = EngineConfig::default();
        let throw = ThrowObservation::new(IVec3::new(0, 70, 0), 90.0);
        for k in [1, 2, 3] {
            let result = infer(&cells, &config, &[throw], k).expect("infers");
            assert!(result.candidates.len() <= k);
            assert!(!result.candidates.is_empty());
        }
    }

    #[test]
    fn ray_through_a_gap_gets_long_range_fallback() {
        let cells = CellSet::standard();
        let config = EngineConfig::default();
        let throw = ThrowObservation::new(IVec3::new(350, 70, 0), 0.0);
        let result = infer(&cells, &config, &[throw], 5).expect("infers");
        assert_eq!(result.candidates.len(), 1);
        let c = &result.candidates[0];
        assert_eq!(c.path, CalculationPath::LongRangeFallback);
        assert_eq!(c.confidence, 0.5);
        assert_eq!(result.diagnostics, vec![Diagnostic::NoRayCellIntersection]);
        assert!(c.diagnostic_label.starts_with("long-range-fallback; no cell on the ray"));
    }

    #[test]
    fn unreadable_throw_in_slice_borrows_earlier_position() {
        let cells = CellSet::standard();
        let config = EngineConfig::default();
        let throws = [
            ThrowObservation::new(IVec3::new(0, 70, 100), 90.0),
            ThrowObservation::unreadable(0.0),
        ];
        let result = infer(&cells, &config, &throws, 5).expect("infers");
        assert_eq!(result.mode, ResolutionMode::SingleRay);
        assert_eq!(result.diagnostics[0], Diagnostic::ThrowSkipped { slot: 1 });
    }

    #[test]
    fn unreadable_first_throw_is_skipped_in_favor_of_second() {
        let cells = CellSet::standard();
        let config = EngineConfig::default();
        let second = ThrowObservation::new(IVec3::new(600, 70, 600), 0.0);
        let throws = [ThrowObservation::unreadable(90.0), second];
        let result = infer(&cells, &config, &throws, 5).expect("infers");

        assert_eq!(result.mode, ResolutionMode::SingleRay);
        assert_eq!(result.diagnostics[0], Diagnostic::ThrowSkipped { slot: 0 });
        assert!(!result.is_degraded());
        let alone = infer(&cells, &config, &[second], 5).expect("infers");
        let points = |r: &InferenceResult| r.candidates.iter().map(|c| c.point).collect::<Vec<_>>();
        assert_eq!(points(&result), points(&alone));
        assert!(result.candidates.iter().all(|c| !c.is_triangulated));
    }

    #[test]
    fn two_unreadable_throws_score_the_first_degraded() {
        let cells = CellSet::standard();
        let config = EngineConfig::default();
        let throws = [
            ThrowObservation::unreadable(90.0),
            ThrowObservation::unreadable(180.0),
        ];
        let result = infer(&cells, &config, &throws, 5).expect("infers");
        assert_eq!(result.mode, ResolutionMode::SingleRay);
        assert_eq!(
            &result.diagnostics[..2],
            &[
                Diagnostic::ThrowSkipped { slot: 1 },
                Diagnostic::InvalidObservation {
                    slot: 0,
                    substitute: PositionSource::Default,
                },
            ]
        );
        assert!(result.is_degraded());
    }
}
