//! Errors raised by capability adapters.
//!
//! None of these ever reach the invocation transport: the flows catch them at
//! the adapter boundary, publish a [`FailureEvent`](super::FailureEvent) and
//! answer with a degraded reply.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CapabilityError {
    /// HTTP transport or connection error.
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The gateway answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A required value was missing from the call or the response.
    #[error("missing {0}")]
    Missing(&'static str),

    /// The transcription job ended in `FAILED`.
    #[error("transcription job {0} failed")]
    JobFailed(String),

    /// The job was still running after the poll budget was spent.
    #[error("transcription job {job} still running after {attempts} polls")]
    PollBudgetExhausted { job: String, attempts: u32 },
}

impl From<reqwest::Error> for CapabilityError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CapabilityError::Timeout
        } else {
            CapabilityError::Request(e.to_string())
        }
    }
}

/// Turn a non-2xx response into [`CapabilityError::Status`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, CapabilityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CapabilityError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Build a client with a per-request timeout.
///
/// Falls back to a default client if the builder fails.
pub(crate) fn client_with_timeout(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// `base_url` with `segments` appended, each percent-encoded as one path
/// segment.
pub(crate) fn endpoint(
    base_url: &str,
    segments: &[&str],
) -> Result<reqwest::Url, CapabilityError> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| CapabilityError::Request(format!("invalid base url {base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| CapabilityError::Request(format!("base url {base_url} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
