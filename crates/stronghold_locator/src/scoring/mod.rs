//! Probability scoring: turns one or two sightings into ranked [`Candidate`]s.
//!
//! - [`Scorer`] scores cells against a [`Sighting`] (angle-only or with a measured
//!   distance) or triangulates two sightings.
//! - [`ranking`] normalizes raw scores, substitutes a long-range fallback when nothing
//!   matched, orders candidates and truncates to the requested count.
//! - [`refine`] optionally narrows a cell down to its most likely chunk.
//!
//! Recoverable conditions are reported as [`Diagnostic`]s next to the candidates.
use std::fmt;

use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::PositionSource;
use crate::error::{Error, Result};
use crate::geometry::{IntersectionFailure, Ray, EYE_OFFSET_STANDARD};

pub mod candidate;
pub mod likelihood;
pub mod ranking;
pub mod refine;
pub mod scorer;

pub use candidate::{nether_position, CalculationPath, Candidate, NETHER_SCALE};
pub use ranking::{finalize, rank};
pub use refine::{ChunkId, Refinement, SubCellPrecision};
pub use scorer::{Scored, Scorer};

/// Tunables of the scoring model.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    /// Sub-block bias added to the observer's block position on both axes.
    pub eye_offset: f64,
    /// Widen the angular term by the bearing spread of a position inside the cell.
    pub cell_spread: bool,
    /// Divide each prior by the number of cells sharing its distance bucket.
    pub bucket_normalized_prior: bool,
    /// Maximum distance from the measured point to a cell for it to be scored.
    pub distance_tolerance: f64,
    /// Raw score of the exact-point candidate when no cell is within tolerance.
    pub exact_point_prior: f64,
    /// Projection distance of the long-range fallback candidate.
    pub fallback_distance: f64,
    /// Confidence reported for the long-range fallback candidate.
    pub fallback_confidence: f64,
    /// Confidence reported for a successful triangulation.
    pub triangulation_confidence: f64,
    /// Probabilities closer than this are ranked by distance instead.
    pub tie_epsilon: f64,
    /// Chunk-level refinement; `None` disables it.
    pub sub_cell: Option<SubCellPrecision>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            eye_offset: EYE_OFFSET_STANDARD,
            cell_spread: true,
            bucket_normalized_prior: true,
            distance_tolerance: 50.0,
            exact_point_prior: 0.1,
            fallback_distance: 1500.0,
            fallback_confidence: 0.5,
            triangulation_confidence: 0.95,
            tie_epsilon: 1e-3,
            sub_cell: None,
        }
    }
}

impl ScoringConfig {
    pub fn with_eye_offset(mut self, eye_offset: f64) -> Self {
        self.eye_offset = eye_offset;
        self
    }

    pub fn with_cell_spread(mut self, enabled: bool) -> Self {
        self.cell_spread = enabled;
        self
    }

    pub fn with_bucket_normalized_prior(mut self, enabled: bool) -> Self {
        self.bucket_normalized_prior = enabled;
        self
    }

    pub fn with_distance_tolerance(mut self, tolerance: f64) -> Self {
        self.distance_tolerance = tolerance;
        self
    }

    pub fn with_fallback(mut self, distance: f64, confidence: f64) -> Self {
        self.fallback_distance = distance;
        self.fallback_confidence = confidence;
        self
    }

    pub fn with_triangulation_confidence(mut self, confidence: f64) -> Self {
        self.triangulation_confidence = confidence;
        self
    }

    pub fn with_tie_epsilon(mut self, epsilon: f64) -> Self {
        self.tie_epsilon = epsilon;
        self
    }

    pub fn with_sub_cell_precision(mut self, precision: Option<SubCellPrecision>) -> Self {
        self.sub_cell = precision;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.eye_offset.is_finite() {
            return Err(Error::InvalidConfig("eye_offset must be finite".into()));
        }
        for (name, value) in [
            ("distance_tolerance", self.distance_tolerance),
            ("fallback_distance", self.fallback_distance),
            ("exact_point_prior", self.exact_point_prior),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("fallback_confidence", self.fallback_confidence),
            ("triangulation_confidence", self.triangulation_confidence),
        ] {
            if !(value.is_finite() && value > 0.0 && value <= 1.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if !(self.tie_epsilon.is_finite() && self.tie_epsilon >= 0.0) {
            return Err(Error::InvalidConfig("tie_epsilon must be >= 0".into()));
        }
        if let Some(precision) = &self.sub_cell {
            precision.validate()?;
        }
        Ok(())
    }
}

/// One resolved sighting: where the eye was seen from and where it flew.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sighting {
    /// Horizontal eye origin, offset already applied.
    pub eye: DVec2,
    /// Heading in degrees, normalized to `[0, 360)`.
    pub heading: f64,
    pub angle_std_dev: f64,
    pub measured_distance: Option<f64>,
    pub distance_std_dev: f64,
}

impl Sighting {
    pub fn ray(&self) -> Ray {
        Ray::from_heading(self.eye, self.heading)
    }
}

/// A recoverable condition met while scoring; the result is still usable.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The ray crossed no cell; a long-range fallback was reported.
    NoRayCellIntersection,
    /// No cell lay within tolerance of the measured point; the point itself was reported.
    NoCellNearMeasuredDistance,
    /// Triangulation failed; the first throw was scored on its own.
    ParallelOrDivergentRays(IntersectionFailure),
    /// Throw `slot` had no readable position; `substitute` was used instead.
    InvalidObservation {
        slot: usize,
        substitute: PositionSource,
    },
    /// Throw `slot` was unreadable and left out; the other throw was scored alone.
    ThrowSkipped { slot: usize },
}

impl Diagnostic {
    /// Whether candidate confidence was reduced because of this condition.
    pub fn degrades_confidence(&self) -> bool {
        matches!(self, Diagnostic::InvalidObservation { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoRayCellIntersection => {
                f.write_str("no cell on the ray, projected to long range")
            }
            Diagnostic::NoCellNearMeasuredDistance => {
                f.write_str("no cell near the measured distance, reporting exact point")
            }
            Diagnostic::ParallelOrDivergentRays(IntersectionFailure::Parallel) => {
                f.write_str("rays are parallel, fell back to first throw")
            }
            Diagnostic::ParallelOrDivergentRays(IntersectionFailure::BehindObserver) => {
                f.write_str("rays diverge, fell back to first throw")
            }
            Diagnostic::InvalidObservation { slot, substitute } => {
                write!(f, "throw {} position unreadable, used {substitute}", slot + 1)
            }
            Diagnostic::ThrowSkipped { slot } => {
                write!(f, "throw {} position unreadable, skipped", slot + 1)
            }
        }
    }
}
