//! Failure channel for swallowed capability errors.
//!
//! Adapter failures never abort a transition, but they must stay observable.
//! Flows publish a [`FailureEvent`] to a [`FailureSink`]; the binary uses
//! [`LogFailureSink`], embedders and tests can collect events with
//! [`MemoryFailureSink`].

use std::sync::{Arc, Mutex};

use super::error::CapabilityError;

/// Which capability failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    TranscriptionStart,
    TranscriptionPoll,
    TranscriptFetch,
    OutboundCall,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::TranscriptionStart => "transcription_start",
            Capability::TranscriptionPoll => "transcription_poll",
            Capability::TranscriptFetch => "transcript_fetch",
            Capability::OutboundCall => "outbound_call",
        }
    }
}

/// One swallowed capability failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureEvent {
    pub capability: Capability,
    /// Call the failure happened on, when known.
    pub call_id: Option<String>,
    pub error: CapabilityError,
}

/// Receives swallowed failures.  Must never fail or block for long.
pub trait FailureSink: Send + Sync {
    fn record(&self, event: FailureEvent);
}

/// Writes every failure as a structured warn-level record under the
/// `capability` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFailureSink;

impl FailureSink for LogFailureSink {
    fn record(&self, event: FailureEvent) {
        log::warn!(
            target: "capability",
            "capability={} call_id={} error={}",
            event.capability.as_str(),
            event.call_id.as_deref().unwrap_or("-"),
            event.error
        );
    }
}

/// Keeps every failure in memory (and logs it like [`LogFailureSink`]).
#[derive(Debug, Default, Clone)]
pub struct MemoryFailureSink {
    events: Arc<Mutex<Vec<FailureEvent>>>,
}

impl MemoryFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<FailureEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl FailureSink for MemoryFailureSink {
    fn record(&self, event: FailureEvent) {
        LogFailureSink.record(event.clone());
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
