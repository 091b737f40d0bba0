//! Transcription capability: start a job, poll it, read its transcript.
//!
//! # Poll loop
//!
//! ```text
//! job_status ──QUEUED / IN_PROGRESS──▶ sleep(interval) ──▶ job_status …
//!            ──COMPLETED───────────────▶ Ok
//!            ──FAILED──────────────────▶ Err(JobFailed)
//!            ──missing / unreadable────▶ Err(Missing)
//!            ──transport error─────────▶ Err(..)
//! max_attempts spent or deadline passed ─▶ Err(PollBudgetExhausted)
//! ```
//!
//! The loop runs inside one invocation, so its budget must stay below the
//! invocation timeout of the transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TranscriptionConfig;

use super::error::{client_with_timeout, endpoint, ensure_success, CapabilityError};

// ---------------------------------------------------------------------------
// Job types
// ---------------------------------------------------------------------------

/// Status reported for a transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Media {
    pub media_file_uri: String,
}

/// Parameters of a start-job request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscriptionJobRequest {
    pub transcription_job_name: String,
    pub language_code: String,
    pub media_format: String,
    pub media: Media,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_bucket_name: Option<String>,
    pub output_key: String,
}

impl TranscriptionJobRequest {
    /// Request for the recording of `call_id` stored at `media_uri`.
    ///
    /// The job is named after the call and writes to
    /// `<call-id>/<call-id>.json`, so the next invocation can find it from the
    /// call id alone.
    pub fn for_call(
        call_id: &str,
        media_uri: String,
        config: &TranscriptionConfig,
        output_bucket: Option<&str>,
    ) -> Self {
        let location = TranscriptLocation::for_call(call_id, output_bucket);
        Self {
            transcription_job_name: call_id.to_string(),
            language_code: config.language_code.clone(),
            media_format: config.media_format.clone(),
            media: Media {
                media_file_uri: media_uri,
            },
            output_bucket_name: location.bucket,
            output_key: location.key,
        }
    }
}

/// Where the transcript document of a call is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLocation {
    /// `None` means the storage default bucket.
    pub bucket: Option<String>,
    pub key: String,
}

impl TranscriptLocation {
    pub fn for_call(call_id: &str, bucket: Option<&str>) -> Self {
        Self {
            bucket: bucket.map(str::to_string),
            key: format!("{call_id}/{call_id}.json"),
        }
    }
}

/// `s3://bucket/key` URI of a stored recording.
pub fn media_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

// ---------------------------------------------------------------------------
// Transcript document
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TranscriptDocument {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    #[serde(default)]
    transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    transcript: String,
}

/// Extract the first transcript string from a stored transcript document.
pub fn first_transcript(bytes: &[u8]) -> Result<String, CapabilityError> {
    let doc: TranscriptDocument =
        serde_json::from_slice(bytes).map_err(|e| CapabilityError::Parse(e.to_string()))?;
    doc.results
        .transcripts
        .into_iter()
        .next()
        .map(|entry| entry.transcript)
        .ok_or(CapabilityError::Missing("transcript"))
}

// ---------------------------------------------------------------------------
// TranscriptionService trait
// ---------------------------------------------------------------------------

/// Async interface to the transcription capability.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Start a job.  Returns once the job has been accepted.
    async fn start_job(&self, request: &TranscriptionJobRequest) -> Result<(), CapabilityError>;

    /// Current status of `job_name`; `Ok(None)` when the response carried no
    /// status.
    async fn job_status(&self, job_name: &str) -> Result<Option<JobStatus>, CapabilityError>;
}

// ---------------------------------------------------------------------------
// PollPolicy / wait_for_job
// ---------------------------------------------------------------------------

/// Bounds the status poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Cap on the whole loop, however slow each poll is.
    pub deadline: Duration,
}

impl PollPolicy {
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_poll_attempts,
            deadline: Duration::from_millis(config.max_poll_wait_ms),
        }
    }
}

/// Poll `job_name` until it settles or the policy's budget is spent.
///
/// The budget is spent when either `max_attempts` polls have been made or
/// `deadline` has passed, whichever comes first.  The first poll always runs.
pub async fn wait_for_job(
    service: &dyn TranscriptionService,
    job_name: &str,
    policy: PollPolicy,
) -> Result<(), CapabilityError> {
    let attempts = policy.max_attempts.max(1);
    let mut polls = 0u32;

    let outcome = tokio::time::timeout(policy.deadline, async {
        for attempt in 1..=attempts {
            polls = attempt;
            match service.job_status(job_name).await? {
                Some(JobStatus::Completed) => {
                    log::debug!("transcription {job_name} completed after {attempt} poll(s)");
                    return Ok(());
                }
                Some(JobStatus::Failed) => {
                    return Err(CapabilityError::JobFailed(job_name.to_string()));
                }
                Some(JobStatus::Queued) | Some(JobStatus::InProgress) => {
                    if attempt < attempts {
                        tokio::time::sleep(policy.interval).await;
                    }
                }
                Some(JobStatus::Unknown) | None => {
                    return Err(CapabilityError::Missing("transcription job status"));
                }
            }
        }
        Err(CapabilityError::PollBudgetExhausted {
            job: job_name.to_string(),
            attempts,
        })
    })
    .await;

    outcome.unwrap_or_else(|_| {
        log::debug!(
            "transcription {job_name} passed its {:?} deadline after {polls} poll(s)",
            policy.deadline
        );
        Err(CapabilityError::PollBudgetExhausted {
            job: job_name.to_string(),
            attempts: polls,
        })
    })
}

// ---------------------------------------------------------------------------
// HttpTranscriptionService
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JobStatusEnvelope {
    transcription_job: Option<JobStatusBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JobStatusBody {
    transcription_job_status: Option<JobStatus>,
}

/// Reaches the transcription capability through a JSON/HTTP gateway.
///
/// * `POST {base_url}/transcription-jobs` starts a job.
/// * `GET {base_url}/transcription-jobs/{name}` returns
///   `{"TranscriptionJob": {"TranscriptionJobStatus": "..."}}`.
pub struct HttpTranscriptionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranscriptionService {
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self {
            client: client_with_timeout(config.timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TranscriptionService for HttpTranscriptionService {
    async fn start_job(&self, request: &TranscriptionJobRequest) -> Result<(), CapabilityError> {
        let url = endpoint(&self.base_url, &["transcription-jobs"])?;
        let response = self.client.post(url).json(request).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<Option<JobStatus>, CapabilityError> {
        let url = endpoint(&self.base_url, &["transcription-jobs", job_name])?;
        let response = ensure_success(self.client.get(url).send().await?).await?;
        let envelope: JobStatusEnvelope = response
            .json()
            .await
            .map_err(|e| CapabilityError::Parse(e.to_string()))?;
        Ok(envelope
            .transcription_job
            .and_then(|job| job.transcription_job_status))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
