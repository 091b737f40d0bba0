//! Capability adapters: thin async callers of external services.
//!
//! * [`TranscriptionService`] - start / poll a transcription job;
//!   [`wait_for_job`] is the bounded poll loop.
//! * [`ObjectStore`] - fetch stored bytes (transcript documents).
//! * [`OutboundCaller`] - place an outbound call.
//! * [`FailureSink`] - where swallowed failures are published.
//!
//! Each trait has a JSON/HTTP gateway implementation built from
//! [`AppConfig`](crate::config::AppConfig).  Callers wrap every adapter call
//! in a non-fatal policy: an error becomes a [`FailureEvent`] plus a degraded
//! reply, never a failed invocation.

pub mod error;
pub mod failure;
pub mod storage;
pub mod telephony;
pub mod transcription;

#[cfg(test)]
pub(crate) mod mock;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use error::CapabilityError;
pub use failure::{Capability, FailureEvent, FailureSink, LogFailureSink, MemoryFailureSink};
pub use storage::{HttpObjectStore, ObjectStore};
pub use telephony::{HttpOutboundCaller, OutboundCallRequest, OutboundCaller};
pub use transcription::{
    first_transcript, media_uri, wait_for_job, HttpTranscriptionService, JobStatus, PollPolicy,
    TranscriptLocation, TranscriptionJobRequest, TranscriptionService,
};
