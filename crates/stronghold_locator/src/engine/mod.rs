//! Inference orchestration.
//!
//! [`InferenceEngine`] holds one observer's session: it records up to two
//! [`ThrowObservation`]s, substitutes positions for unreadable throws, picks the
//! calculation mode and returns ranked candidates. [`infer`] does the same for callers
//! that keep their own state.
//!
//! ```
//! use glam::IVec3;
//! use stronghold_locator::engine::InferenceEngine;
//!
//! let mut engine = InferenceEngine::standard();
//! engine.record(IVec3::new(0, 70, 100), 90.0, None)?;
//! engine.record(IVec3::new(600, 70, 600), 0.0, None)?;
//! let result = engine.calculate(5)?;
//! assert!(result.best().is_some_and(|c| c.is_triangulated));
//! # Ok::<(), stronghold_locator::error::Error>(())
//! ```
pub mod events;
pub mod infer;
pub mod observation;
pub mod state;

pub use events::{EventSink, FnSink, InferenceEvent, InferenceEventKind, VecSink};
pub use infer::infer;
pub use observation::{
    PositionSource, RecordedThrow, ThrowObservation, DEFAULT_ANGLE_STD_DEV,
    DEFAULT_DISTANCE_STD_DEV,
};
pub use state::{
    EngineConfig, EngineState, InferenceEngine, InferenceResult, ResolutionMode,
    DEFAULT_POSITION, DEFAULT_TOP_K, MAX_THROWS,
};
