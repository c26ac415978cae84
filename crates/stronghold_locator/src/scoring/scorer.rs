//! Cell scoring for single sightings and triangulation.
use tracing::debug;

use crate::cells::{CellSet, PlacementCell};
use crate::geometry::{intersect_rays, IntersectionFailure};
use crate::scoring::candidate::{CalculationPath, Candidate};
use crate::scoring::likelihood::{
    combined_sigma, gaussian_kernel, gaussian_pdf, uniform_spread_deg,
};
use crate::scoring::refine::{best_target, perpendicular_likelihood};
use crate::scoring::{Diagnostic, ScoringConfig, Sighting};

/// Unranked candidates plus what went wrong producing them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scored {
    pub candidates: Vec<Candidate>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Scored {
    fn from_candidates(candidates: Vec<Candidate>, empty_diagnostic: Diagnostic) -> Self {
        let diagnostics = if candidates.is_empty() {
            vec![empty_diagnostic]
        } else {
            Vec::new()
        };
        Self {
            candidates,
            diagnostics,
        }
    }
}

/// Scores the cells of a [`CellSet`] under a [`ScoringConfig`].
#[derive(Clone, Copy, Debug)]
pub struct Scorer<'a> {
    cells: &'a CellSet,
    config: &'a ScoringConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(cells: &'a CellSet, config: &'a ScoringConfig) -> Self {
        Self { cells, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.config
    }

    /// Prior weight of `cell`, shared across its distance bucket when configured.
    pub fn prior(&self, cell: &PlacementCell) -> f64 {
        if !self.config.bucket_normalized_prior {
            return cell.prior_probability;
        }
        let population = self
            .cells
            .bucket_population(cell.structure_class, cell.distance_bucket)
            .max(1);
        cell.prior_probability / population as f64
    }

    /// Scores a lone sighting, using its measured distance when present.
    pub fn score_single(&self, sighting: &Sighting) -> Scored {
        match sighting.measured_distance {
            Some(distance) => self.score_with_distance(sighting, distance),
            None => self.score_angle_only(sighting),
        }
    }

    /// Scores every cell whose center projects onto the ray inside the cell.
    ///
    /// The score is the prior times a Gaussian density of the angular deviation to the
    /// cell center. With `cell_spread` on, the density is widened by the bearing spread
    /// of a position uniformly distributed over the cell at the hit range.
    pub fn score_angle_only(&self, sighting: &Sighting) -> Scored {
        let ray = sighting.ray();
        let mut candidates = Vec::new();

        for (id, cell) in self.cells.iter() {
            let Some(hit) = ray.intersect_cell(&cell.bounds) else {
                continue;
            };
            let sigma = if self.config.cell_spread {
                let extent = cell.bounds.width().max(cell.bounds.depth());
                combined_sigma(sighting.angle_std_dev, uniform_spread_deg(extent, hit.t))
            } else {
                sighting.angle_std_dev
            };
            let mut score = self.prior(cell) * gaussian_pdf(ray.angular_deviation(cell.center), sigma);
            let mut point = hit.point;

            if let Some(precision) = &self.config.sub_cell {
                if let Some(best) = best_target(&cell.bounds, precision, |target| {
                    perpendicular_likelihood(&ray, sighting.angle_std_dev, precision, target)
                }) {
                    score *= best.likelihood;
                    point = best.point;
                }
            }

            if score > 0.0 && score.is_finite() {
                candidates.push(Candidate::new(
                    point,
                    sighting.eye,
                    Some(id),
                    score,
                    CalculationPath::AngleProjection,
                ));
            }
        }

        debug!(
            "Angle-only scoring at heading {:.2} kept {} cells.",
            sighting.heading,
            candidates.len()
        );
        Scored::from_candidates(candidates, Diagnostic::NoRayCellIntersection)
    }

    /// Scores cells near the point `distance` blocks along the ray.
    ///
    /// Each cell's nearest point to the measured point must lie within
    /// `distance_tolerance`. The score is the prior times the angular density of the
    /// bearing to that nearest point and the radial density of its range error. When no
    /// cell qualifies, the measured point itself is reported with `exact_point_prior`.
    pub fn score_with_distance(&self, sighting: &Sighting, distance: f64) -> Scored {
        let ray = sighting.ray();
        let exact = ray.at(distance);
        let mut candidates = Vec::new();

        for (id, cell) in self.cells.iter() {
            let nearest = cell.bounds.clamp(exact);
            if nearest.distance(exact) > self.config.distance_tolerance {
                continue;
            }
            let angular = gaussian_pdf(ray.angular_deviation(nearest), sighting.angle_std_dev);
            let radial = gaussian_pdf(
                nearest.distance(sighting.eye) - distance,
                sighting.distance_std_dev,
            );
            let mut score = self.prior(cell) * angular * radial;
            let mut point = nearest;

            if let Some(precision) = &self.config.sub_cell {
                let sigma = sighting.distance_std_dev.max(precision.min_sigma);
                if let Some(best) = best_target(&cell.bounds, precision, |target| {
                    Some(gaussian_kernel(target.distance(exact), sigma))
                }) {
                    score *= best.likelihood;
                    point = best.point;
                }
            }

            if score > 0.0 && score.is_finite() {
                candidates.push(Candidate::new(
                    point,
                    sighting.eye,
                    Some(id),
                    score,
                    CalculationPath::DistanceSnap,
                ));
            }
        }

        debug!(
            "Distance scoring at {:.1} blocks kept {} cells.",
            distance,
            candidates.len()
        );
        if candidates.is_empty() {
            return Scored {
                candidates: vec![Candidate::new(
                    exact,
                    sighting.eye,
                    None,
                    self.config.exact_point_prior,
                    CalculationPath::DistanceExactPoint,
                )],
                diagnostics: vec![Diagnostic::NoCellNearMeasuredDistance],
            };
        }
        Scored::from_candidates(candidates, Diagnostic::NoCellNearMeasuredDistance)
    }

    /// Intersects two sightings and reports the crossing as a single candidate, tagged
    /// with the first cell in arena order that contains it.
    ///
    /// Distance is measured from the second observer, who is the one still looking.
    pub fn triangulate(
        &self,
        first: &Sighting,
        second: &Sighting,
    ) -> Result<Scored, IntersectionFailure> {
        let crossing = intersect_rays(&first.ray(), &second.ray())?;
        let (source, path) = match self.cells.containing(crossing.point) {
            Some((id, _)) => (Some(id), CalculationPath::Triangulated),
            None => (None, CalculationPath::TriangulatedOutsideCells),
        };
        debug!(
            "Rays cross at ({:.1}, {:.1}), {} and {} blocks out.",
            crossing.point.x, crossing.point.y, crossing.t1, crossing.t2
        );
        Ok(Scored {
            candidates: vec![Candidate::new(
                crossing.point,
                second.eye,
                source,
                self.config.triangulation_confidence,
                path,
            )],
            diagnostics: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::DVec2;

    use super::*;
    use crate::cells::CellId;
    use crate::scoring::SubCellPrecision;

    fn sighting(eye: DVec2, heading: f64) -> Sighting {
        Sighting {
            eye,
            heading,
            angle_std_dev: 0.1,
            measured_distance: None,
            distance_std_dev: 40.0,
        }
    }

    #[test]
    fn angle_only_scores_only_cells_on_the_ray() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        let s = sighting(DVec2::new(0.5, 0.5), 90.0);
        let scored = scorer.score_angle_only(&s);
        assert!(scored.diagnostics.is_empty());
        assert!(!scored.candidates.is_empty());
        for c in &scored.candidates {
            let cell = cells.get(c.source_cell.expect("cell")).expect("valid id");
            assert!(cell.bounds.contains(c.point));
            assert!(c.point.x > 0.0);
            assert!(c.raw_score > 0.0);
        }
    }

    #[test]
    fn ray_through_a_gap_finds_no_cells() {
        // x = 350 runs through the gap between tile columns 0 and 1.
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        let scored = scorer.score_angle_only(&sighting(DVec2::new(350.0, 0.0), 0.0));
        assert!(scored.candidates.is_empty());
        assert_eq!(scored.diagnostics, vec![Diagnostic::NoRayCellIntersection]);
    }

    #[test]
    fn bucket_normalization_divides_by_population() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        let cell = cells.get(CellId(0)).expect("cell");
        let n = cells.bucket_population(cell.structure_class, cell.distance_bucket);
        assert!(n > 1);
        assert_abs_diff_eq!(scorer.prior(cell), cell.prior_probability / n as f64);

        let raw = config.clone().with_bucket_normalized_prior(false);
        assert_eq!(Scorer::new(&cells, &raw).prior(cell), cell.prior_probability);
    }

    #[test]
    fn measured_distance_snaps_to_nearby_cells() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        // East along z = 100: the point 600 blocks out sits inside the (1, 0) tile.
        let mut s = sighting(DVec2::new(0.0, 100.0), 90.0);
        s.measured_distance = Some(600.0);
        let scored = scorer.score_single(&s);
        assert!(scored.diagnostics.is_empty());
        let best = scored
            .candidates
            .iter()
            .max_by(|a, b| a.raw_score.total_cmp(&b.raw_score))
            .expect("candidates");
        assert_eq!(best.path, CalculationPath::DistanceSnap);
        assert_abs_diff_eq!(best.point.x, 600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(best.point.y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn measured_distance_far_from_cells_reports_exact_point() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        let mut s = sighting(DVec2::new(0.0, 0.0), 0.0);
        s.measured_distance = Some(20_000.0);
        let scored = scorer.score_single(&s);
        assert_eq!(scored.candidates.len(), 1);
        let c = &scored.candidates[0];
        assert_eq!(c.path, CalculationPath::DistanceExactPoint);
        assert_eq!(c.source_cell, None);
        assert_eq!(c.raw_score, 0.1);
        assert_abs_diff_eq!(c.point.y, -20_000.0, epsilon = 1e-6);
        assert_eq!(scored.diagnostics, vec![Diagnostic::NoCellNearMeasuredDistance]);
    }

    #[test]
    fn distance_tolerance_is_inclusive() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        // East along z = 500; tile (0, 1) ends at x = 272 and tile (1, 1) starts at 432.
        let mut s = sighting(DVec2::new(0.0, 500.0), 90.0);

        s.measured_distance = Some(322.0);
        let kept = scorer.score_single(&s);
        assert!(kept.diagnostics.is_empty());
        assert_eq!(kept.candidates.len(), 1);
        let c = &kept.candidates[0];
        assert_eq!(c.path, CalculationPath::DistanceSnap);
        assert_abs_diff_eq!(c.point.x, 272.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.point.y, 500.0, epsilon = 1e-9);

        s.measured_distance = Some(322.5);
        let dropped = scorer.score_single(&s);
        assert_eq!(dropped.candidates.len(), 1);
        assert_eq!(dropped.candidates[0].path, CalculationPath::DistanceExactPoint);
        assert_eq!(dropped.diagnostics, vec![Diagnostic::NoCellNearMeasuredDistance]);
    }

    #[test]
    fn sub_cell_precision_refines_distance_snaps() {
        let cells = CellSet::standard();
        let plain_config = ScoringConfig::default();
        let refined_config =
            ScoringConfig::default().with_sub_cell_precision(Some(SubCellPrecision::default()));
        let mut s = sighting(DVec2::new(0.0, 100.0), 90.0);
        s.measured_distance = Some(600.0);

        let plain = Scorer::new(&cells, &plain_config).score_single(&s);
        let refined = Scorer::new(&cells, &refined_config).score_single(&s);
        assert_eq!(plain.candidates.len(), 1);
        assert_eq!(refined.candidates.len(), 1);

        // The measured point (600, 100) is 4 blocks from the target of chunk (37, 6).
        let c = &refined.candidates[0];
        assert_eq!(c.path, CalculationPath::DistanceSnap);
        assert_eq!(c.point, DVec2::new(596.0, 100.0));
        assert_eq!(c.source_cell, plain.candidates[0].source_cell);
        assert_abs_diff_eq!(
            c.raw_score,
            plain.candidates[0].raw_score * gaussian_kernel(4.0, 40.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn triangulation_reports_containing_cell() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        // Both rays meet at (600, 100), inside the (1, 0) tile.
        let a = sighting(DVec2::new(0.0, 100.0), 90.0);
        let b = sighting(DVec2::new(600.0, 600.0), 0.0);
        let scored = scorer.triangulate(&a, &b).expect("rays cross");
        assert_eq!(scored.candidates.len(), 1);
        let c = &scored.candidates[0];
        assert_eq!(c.path, CalculationPath::Triangulated);
        assert!(c.is_triangulated);
        let cell = cells.get(c.source_cell.expect("cell")).expect("valid id");
        assert_eq!(cell.bounds.x_min, 432.0);
        assert_abs_diff_eq!(c.distance_from_observer, 500.0, epsilon = 1e-9);
        assert_eq!(c.raw_score, 0.95);
    }

    #[test]
    fn triangulation_outside_cells_gets_distinct_path() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        // Rays meet at (350, 100), in the gap between tiles.
        let a = sighting(DVec2::new(0.0, 100.0), 90.0);
        let b = sighting(DVec2::new(350.0, 600.0), 0.0);
        let scored = scorer.triangulate(&a, &b).expect("rays cross");
        let c = &scored.candidates[0];
        assert_eq!(c.path, CalculationPath::TriangulatedOutsideCells);
        assert_eq!(c.source_cell, None);
    }

    #[test]
    fn parallel_sightings_fail_to_triangulate() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&cells, &config);
        let a = sighting(DVec2::new(0.0, 0.0), 45.0);
        let b = sighting(DVec2::new(30.0, 0.0), 45.0);
        assert_eq!(
            scorer.triangulate(&a, &b),
            Err(IntersectionFailure::Parallel)
        );
    }

    #[test]
    fn sub_cell_precision_moves_points_to_chunk_targets() {
        let cells = CellSet::standard();
        let config = ScoringConfig::default().with_sub_cell_precision(Some(SubCellPrecision::default()));
        let scorer = Scorer::new(&cells, &config);
        let scored = scorer.score_angle_only(&sighting(DVec2::new(0.0, 100.0), 90.0));
        assert!(!scored.candidates.is_empty());
        for c in &scored.candidates {
            assert_eq!(c.point.x.rem_euclid(16.0), 4.0);
            assert_eq!(c.point.y.rem_euclid(16.0), 4.0);
        }
    }
}
