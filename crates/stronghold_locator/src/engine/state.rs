//! Session state machine over captured throws.
use std::sync::Arc;

use glam::IVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cells::CellSet;
use crate::engine::events::{EventSink, InferenceEvent, InferenceEventKind};
use crate::engine::infer::run;
use crate::engine::observation::{RecordedThrow, ThrowObservation};
use crate::error::{Error, Result};
use crate::scoring::{Candidate, Diagnostic, ScoringConfig};

/// Candidates returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 5;

/// Observer position used when no throw position was ever read.
pub const DEFAULT_POSITION: IVec3 = IVec3::new(0, 64, 0);

/// Throws held by one engine.
pub const MAX_THROWS: usize = 2;

/// How a calculation turned sightings into candidates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionMode {
    SingleRay,
    SingleRayWithDistance,
    Triangulated,
    /// Two throws were given but their rays did not cross ahead of both observers.
    TriangulationFallback,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    NoObservation,
    FirstThrowCaptured,
    SecondThrowCaptured,
    Resolved(ResolutionMode),
}

/// Configuration of an [`InferenceEngine`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    /// Position substituted for an unreadable throw when none was read before.
    pub default_position: IVec3,
    /// Multiplier applied to candidate confidence when a position was substituted.
    pub degraded_confidence_factor: f64,
    /// Candidates kept by [`InferenceEngine::calculate_default`].
    pub top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            default_position: DEFAULT_POSITION,
            degraded_confidence_factor: 0.5,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl EngineConfig {
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_default_position(mut self, position: IVec3) -> Self {
        self.default_position = position;
        self
    }

    pub fn with_degraded_confidence_factor(mut self, factor: f64) -> Self {
        self.degraded_confidence_factor = factor;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        let factor = self.degraded_confidence_factor;
        if !(factor.is_finite() && factor > 0.0 && factor <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "degraded_confidence_factor must be in (0, 1], got {factor}"
            )));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be > 0".into()));
        }
        Ok(())
    }
}

/// Ranked candidates of one calculation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceResult {
    pub mode: ResolutionMode,
    /// Best first; probabilities sum to one.
    pub candidates: Vec<Candidate>,
    pub diagnostics: Vec<Diagnostic>,
}

impl InferenceResult {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Whether any candidate confidence was reduced by a substituted position.
    pub fn is_degraded(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::degrades_confidence)
    }
}

/// One observer's session: up to two throws and the last calculated candidates.
///
/// The cell grid is shared and read-only; everything else is owned by the session.
/// Callers that share an engine across threads must serialize access.
#[derive(Clone, Debug)]
pub struct InferenceEngine {
    cells: Arc<CellSet>,
    config: EngineConfig,
    throws: Vec<RecordedThrow>,
    last_known_position: Option<IVec3>,
    candidates: Vec<Candidate>,
    state: EngineState,
}

impl InferenceEngine {
    pub fn new(cells: Arc<CellSet>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cells,
            config,
            throws: Vec::with_capacity(MAX_THROWS),
            last_known_position: None,
            candidates: Vec::new(),
            state: EngineState::NoObservation,
        })
    }

    /// An engine over the default grid with default configuration.
    pub fn standard() -> Self {
        Self {
            cells: Arc::new(CellSet::standard()),
            config: EngineConfig::default(),
            throws: Vec::with_capacity(MAX_THROWS),
            last_known_position: None,
            candidates: Vec::new(),
            state: EngineState::NoObservation,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cells(&self) -> &CellSet {
        &self.cells
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn throws(&self) -> &[RecordedThrow] {
        &self.throws
    }

    /// Candidates of the last calculation; empty until one has run.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn last_known_position(&self) -> Option<IVec3> {
        self.last_known_position
    }

    /// Shorthand for recording a readable throw.
    pub fn record(
        &mut self,
        position: IVec3,
        heading: f64,
        measured_distance: Option<f64>,
    ) -> Result<RecordedThrow> {
        let mut observation = ThrowObservation::new(position, heading);
        observation.measured_distance = measured_distance;
        self.record_throw(observation)
    }

    pub fn record_throw(&mut self, observation: ThrowObservation) -> Result<RecordedThrow> {
        self.record_throw_with_events(observation, &mut ())
    }

    /// Validates and stores `observation` in the first free slot, replacing the second
    /// throw when both are taken. Malformed input is rejected and leaves the session
    /// unchanged.
    pub fn record_throw_with_events(
        &mut self,
        observation: ThrowObservation,
        sink: &mut dyn EventSink,
    ) -> Result<RecordedThrow> {
        let recorded = RecordedThrow::resolve(
            observation,
            self.last_known_position,
            self.config.default_position,
        )?;

        if recorded.is_substituted() {
            warn!(
                "Throw position unreadable; using {} {:?}.",
                recorded.source, recorded.position
            );
        } else {
            self.last_known_position = Some(recorded.position);
        }

        let slot = if self.throws.len() < MAX_THROWS {
            self.throws.push(recorded);
            self.throws.len() - 1
        } else {
            let last = MAX_THROWS - 1;
            self.throws[last] = recorded;
            last
        };
        debug!(
            "Recorded throw {} at {:?} heading {:.2}.",
            slot + 1,
            recorded.position,
            recorded.observation.heading
        );

        self.candidates.clear();
        self.state = if self.throws.len() == 1 {
            EngineState::FirstThrowCaptured
        } else {
            EngineState::SecondThrowCaptured
        };

        if sink.wants(InferenceEventKind::ThrowRecorded) {
            sink.send(InferenceEvent::ThrowRecorded {
                slot,
                throw: recorded,
            });
        }
        Ok(recorded)
    }

    pub fn calculate(&mut self, top_k: usize) -> Result<InferenceResult> {
        self.calculate_with_events(top_k, &mut ())
    }

    /// Calculates with the configured `top_k`.
    pub fn calculate_default(&mut self) -> Result<InferenceResult> {
        self.calculate_with_events(self.config.top_k, &mut ())
    }

    /// Runs inference over the stored throws and keeps the resulting candidates.
    pub fn calculate_with_events(
        &mut self,
        top_k: usize,
        sink: &mut dyn EventSink,
    ) -> Result<InferenceResult> {
        let result = run(&self.cells, &self.config, &self.throws, top_k, sink)?;
        self.candidates = result.candidates.clone();
        self.state = EngineState::Resolved(result.mode);
        Ok(result)
    }

    pub fn reset(&mut self) {
        self.reset_with_events(&mut ());
    }

    /// Clears throws and candidates. The last known position survives: it belongs to
    /// the observer, not to a sighting.
    pub fn reset_with_events(&mut self, sink: &mut dyn EventSink) {
        self.throws.clear();
        self.candidates.clear();
        self.state = EngineState::NoObservation;
        debug!("Session reset.");
        if sink.wants(InferenceEventKind::Reset) {
            sink.send(InferenceEvent::Reset);
        }
    }
}
