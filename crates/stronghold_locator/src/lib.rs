#![forbid(unsafe_code)]
//! stronghold_locator: probabilistic stronghold location from eye-of-ender sightings.
//!
//! Modules:
//! - cells: placement-cell grid generation with empirical distance priors
//! - geometry: heading rays, ray/cell hits, two-ray triangulation
//! - scoring: Gaussian likelihood scoring, chunk refinement, normalization and ranking
//! - engine: session state machine over one or two throws, stateless `infer`, events
//! - glyph: fixed-font decoding of the on-screen coordinate line
//! - distance: parallax-based distance estimates
//!
//! The `stronghold-locator` binary in the companion CLI crate drives the engine from the
//! command line.
pub mod cells;
pub mod distance;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod scoring;

/// Convenient re-exports for common types. Import with `use stronghold_locator::prelude::*;`.
pub mod prelude {
    pub use crate::cells::{CellId, CellSet, ClassConfig, GridConfig, PlacementCell, StructureClass};
    pub use crate::distance::{distance_from_parallax, distance_from_pixel_count, PressCounter};
    pub use crate::engine::{
        infer, EngineConfig, EngineState, EventSink, FnSink, InferenceEngine, InferenceEvent,
        InferenceResult, PositionSource, ResolutionMode, ThrowObservation, VecSink,
    };
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{heading_between, intersect_rays, Bounds, IntersectionFailure, Ray};
    pub use crate::glyph::{decode, DecoderConfig, GlyphDecoder, PixelView, Region};
    pub use crate::scoring::{
        CalculationPath, Candidate, Diagnostic, Scorer, ScoringConfig, Sighting, SubCellPrecision,
    };
}
