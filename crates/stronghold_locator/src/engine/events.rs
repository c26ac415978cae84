//! Event types and sinks for observing an inference session.
//!
//! [`InferenceEngine`](crate::engine::InferenceEngine) emits [`InferenceEvent`]s to an
//! [`EventSink`] passed to its `*_with_events` methods.
use crate::engine::observation::RecordedThrow;
use crate::engine::state::ResolutionMode;
use crate::scoring::{Candidate, Diagnostic};

/// Describes what happened during a session.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum InferenceEvent {
    /// A throw was stored in `slot`.
    ThrowRecorded { slot: usize, throw: RecordedThrow },

    /// Scoring is about to run. `mode` is the planned one; a triangulation that fails
    /// finishes as [`ResolutionMode::TriangulationFallback`].
    CalculationStarted {
        mode: ResolutionMode,
        throw_count: usize,
    },

    /// A recoverable condition was met.
    Diagnostic { diagnostic: Diagnostic },

    /// A calculation produced its ranked candidates.
    CalculationFinished {
        mode: ResolutionMode,
        candidates: Vec<Candidate>,
    },

    /// Stored throws and candidates were cleared.
    Reset,
}

/// Discriminant of [`InferenceEvent`], used to filter events before building them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferenceEventKind {
    ThrowRecorded,
    CalculationStarted,
    Diagnostic,
    CalculationFinished,
    Reset,
}

impl InferenceEvent {
    pub fn kind(&self) -> InferenceEventKind {
        match self {
            InferenceEvent::ThrowRecorded { .. } => InferenceEventKind::ThrowRecorded,
            InferenceEvent::CalculationStarted { .. } => InferenceEventKind::CalculationStarted,
            InferenceEvent::Diagnostic { .. } => InferenceEventKind::Diagnostic,
            InferenceEvent::CalculationFinished { .. } => InferenceEventKind::CalculationFinished,
            InferenceEvent::Reset => InferenceEventKind::Reset,
        }
    }
}

/// Receiver of session events.
///
/// `wants` is asked before an event is built, so a sink that ignores candidate lists
/// never pays for cloning them.
pub trait EventSink {
    fn send(&mut self, event: InferenceEvent);

    fn wants(&self, _kind: InferenceEventKind) -> bool {
        true
    }
}

/// Discards everything; the engine's plain methods run with this sink.
impl EventSink for () {
    fn send(&mut self, _event: InferenceEvent) {}

    fn wants(&self, _kind: InferenceEventKind) -> bool {
        false
    }
}

/// Hands each event to a closure, e.g. to forward it to a host UI channel.
pub struct FnSink<F>(F);

impl<F: FnMut(InferenceEvent)> FnSink<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F: FnMut(InferenceEvent)> EventSink for FnSink<F> {
    fn send(&mut self, event: InferenceEvent) {
        (self.0)(event);
    }
}

/// Records a session's events in order.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Vec<InferenceEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<InferenceEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[InferenceEvent] {
        &self.events
    }

    /// Kinds of the recorded events, oldest first.
    pub fn kinds(&self) -> Vec<InferenceEventKind> {
        self.events.iter().map(InferenceEvent::kind).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    fn send(&mut self, event: InferenceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(InferenceEvent::Reset);
        sink.send(InferenceEvent::Diagnostic {
            diagnostic: Diagnostic::NoRayCellIntersection,
        });
        assert_eq!(
            sink.kinds(),
            vec![InferenceEventKind::Reset, InferenceEventKind::Diagnostic]
        );
        sink.clear();
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        assert!(sink.wants(InferenceEventKind::Reset));
        sink.send(InferenceEvent::Reset);
        assert_eq!(count, 1);
    }

    #[test]
    fn unit_sink_wants_nothing() {
        assert!(!().wants(InferenceEventKind::CalculationFinished));
    }
}
