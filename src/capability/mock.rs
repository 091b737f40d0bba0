//! Test doubles for the capability traits.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::error::CapabilityError;
use super::storage::ObjectStore;
use super::telephony::{OutboundCallRequest, OutboundCaller};
use super::transcription::{JobStatus, TranscriptionJobRequest, TranscriptionService};

type StatusResult = Result<Option<JobStatus>, CapabilityError>;

/// Replays a scripted sequence of poll results; the last one repeats.
pub struct ScriptedTranscription {
    statuses: Mutex<VecDeque<StatusResult>>,
    start_result: Result<(), CapabilityError>,
    started: Mutex<Vec<TranscriptionJobRequest>>,
    polls: Mutex<u32>,
    delay: Option<Duration>,
}

impl ScriptedTranscription {
    pub fn new(statuses: Vec<StatusResult>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            start_result: Ok(()),
            started: Mutex::new(Vec::new()),
            polls: Mutex::new(0),
            delay: None,
        }
    }

    pub fn always(status: StatusResult) -> Self {
        Self::new(vec![status])
    }

    pub fn failing_start(mut self, error: CapabilityError) -> Self {
        self.start_result = Err(error);
        self
    }

    /// Every status poll takes `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn started(&self) -> Vec<TranscriptionJobRequest> {
        self.started.lock().unwrap().clone()
    }

    pub fn polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl TranscriptionService for ScriptedTranscription {
    async fn start_job(&self, request: &TranscriptionJobRequest) -> Result<(), CapabilityError> {
        self.started.lock().unwrap().push(request.clone());
        self.start_result.clone()
    }

    async fn job_status(&self, _job_name: &str) -> StatusResult {
        *self.polls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().cloned().unwrap_or(Ok(None))
        }
    }
}

/// Answers every fetch with the same result and records what was asked for.
pub struct FixedObjectStore {
    result: Result<Vec<u8>, CapabilityError>,
    requests: Mutex<Vec<(Option<String>, String)>>,
}

impl FixedObjectStore {
    pub fn ok(bytes: &[u8]) -> Self {
        Self {
            result: Ok(bytes.to_vec()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn err(error: CapabilityError) -> Self {
        Self {
            result: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Option<String>, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FixedObjectStore {
    async fn get_object(&self, bucket: Option<&str>, key: &str) -> Result<Vec<u8>, CapabilityError> {
        self.requests
            .lock()
            .unwrap()
            .push((bucket.map(str::to_string), key.to_string()));
        self.result.clone()
    }
}

/// Records placed calls and answers with a fixed result.
pub struct RecordingCaller {
    result: Result<Option<String>, CapabilityError>,
    placed: Mutex<Vec<OutboundCallRequest>>,
}

impl RecordingCaller {
    pub fn ok() -> Self {
        Self {
            result: Ok(Some("txn-out".into())),
            placed: Mutex::new(Vec::new()),
        }
    }

    pub fn err(error: CapabilityError) -> Self {
        Self {
            result: Err(error),
            placed: Mutex::new(Vec::new()),
        }
    }

    pub fn placed(&self) -> Vec<OutboundCallRequest> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutboundCaller for RecordingCaller {
    async fn place_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<Option<String>, CapabilityError> {
        self.placed.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}
