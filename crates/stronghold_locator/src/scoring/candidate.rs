//! Ranked output locations.
use glam::{DVec2, IVec2};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cells::CellId;

/// Nether blocks per overworld block along each horizontal axis.
pub const NETHER_SCALE: f64 = 8.0;

/// Which calculation produced a candidate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalculationPath {
    /// A cell crossed by a single ray, scored on heading alone.
    AngleProjection,
    /// A cell near the point at the measured distance along the ray.
    DistanceSnap,
    /// The raw point at the measured distance; no cell was close enough.
    DistanceExactPoint,
    /// The crossing of two rays, inside a known cell.
    Triangulated,
    /// The crossing of two rays, outside every known cell.
    TriangulatedOutsideCells,
    /// Long-range projection along the ray when nothing else matched.
    LongRangeFallback,
}

impl CalculationPath {
    pub fn label(self) -> &'static str {
        match self {
            CalculationPath::AngleProjection => "angle-only",
            CalculationPath::DistanceSnap => "distance-snapped",
            CalculationPath::DistanceExactPoint => "distance-exact-point",
            CalculationPath::Triangulated => "triangulated",
            CalculationPath::TriangulatedOutsideCells => "triangulated-outside-cells",
            CalculationPath::LongRangeFallback => "long-range-fallback",
        }
    }

    pub fn is_triangulated(self) -> bool {
        matches!(
            self,
            CalculationPath::Triangulated | CalculationPath::TriangulatedOutsideCells
        )
    }
}

/// A scored location, created fresh by every inference call.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Precise world-space point (x, z).
    pub point: DVec2,
    pub overworld: IVec2,
    /// `overworld / 8`, rounded.
    pub nether: IVec2,
    /// Cell the candidate was scored from; `None` for points outside known cells.
    pub source_cell: Option<CellId>,
    /// Unnormalized posterior weight.
    pub raw_score: f64,
    /// Share of the returned set; the set sums to 1.
    pub normalized_probability: f64,
    /// How far to trust this candidate in absolute terms, in `[0, 1]`.
    pub confidence: f64,
    pub distance_from_observer: f64,
    pub is_triangulated: bool,
    pub path: CalculationPath,
    pub diagnostic_label: String,
}

impl Candidate {
    pub(crate) fn new(
        point: DVec2,
        observer: DVec2,
        source_cell: Option<CellId>,
        raw_score: f64,
        path: CalculationPath,
    ) -> Self {
        let overworld = IVec2::new(point.x.round() as i32, point.y.round() as i32);
        Self {
            point,
            overworld,
            nether: nether_position(overworld),
            source_cell,
            raw_score,
            normalized_probability: 0.0,
            confidence: 0.0,
            distance_from_observer: point.distance(observer),
            is_triangulated: path.is_triangulated(),
            path,
            diagnostic_label: path.label().to_owned(),
        }
    }

    /// Appends a note to the diagnostic label.
    pub(crate) fn annotate(&mut self, note: &str) {
        self.diagnostic_label.push_str("; ");
        self.diagnostic_label.push_str(note);
    }
}

/// Nether companion of an overworld block position.
pub fn nether_position(overworld: IVec2) -> IVec2 {
    IVec2::new(
        (overworld.x as f64 / NETHER_SCALE).round() as i32,
        (overworld.y as f64 / NETHER_SCALE).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rounds_positions_and_measures_distance() {
        let c = Candidate::new(
            DVec2::new(1203.6, -803.2),
            DVec2::new(0.5, 0.5),
            Some(CellId(3)),
            0.25,
            CalculationPath::AngleProjection,
        );
        assert_eq!(c.overworld, IVec2::new(1204, -803));
        assert_eq!(c.nether, IVec2::new(151, -100));
        assert!(!c.is_triangulated);
        assert_eq!(c.diagnostic_label, "angle-only");
        assert!((c.distance_from_observer - DVec2::new(1203.1, -803.7).length()).abs() < 1e-9);
    }

    #[test]
    fn nether_rounds_half_away_from_zero() {
        assert_eq!(nether_position(IVec2::new(4, -4)), IVec2::new(1, -1));
        assert_eq!(nether_position(IVec2::new(3, -3)), IVec2::new(0, 0));
    }

    #[test]
    fn triangulated_paths_flag_candidates() {
        assert!(CalculationPath::Triangulated.is_triangulated());
        assert!(CalculationPath::TriangulatedOutsideCells.is_triangulated());
        assert!(!CalculationPath::LongRangeFallback.is_triangulated());
    }

    #[test]
    fn annotate_appends_notes() {
        let mut c = Candidate::new(
            DVec2::ZERO,
            DVec2::ZERO,
            None,
            1.0,
            CalculationPath::LongRangeFallback,
        );
        c.annotate("position substituted");
        assert_eq!(c.diagnostic_label, "long-range-fallback; position substituted");
    }
}
