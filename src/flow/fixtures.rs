//! Shared test fixture: canned invocations and a context wired to test
//! doubles.

use std::sync::Arc;

use serde_json::json;

use crate::capability::mock::{FixedObjectStore, RecordingCaller, ScriptedTranscription};
use crate::capability::{JobStatus, MemoryFailureSink};
use crate::config::AppConfig;
use crate::protocol::{ActionData, Invocation};

use super::{CallState, FlowContext};

pub const CALL_ID: &str = "call-1";
pub const CALLER: &str = "+15105550122";
pub const DIALLED: &str = "+17035550122";
pub const SMA_ID: &str = "sma-1";

pub const TRANSCRIPT_DOC: &[u8] = br#"{"jobName":"call-1","results":{"transcripts":[{"transcript":"This is a message to transcribe."}],"items":[]},"status":"COMPLETED"}"#;

pub struct Fixture {
    pub config: AppConfig,
    pub transcription: Arc<ScriptedTranscription>,
    pub storage: Arc<FixedObjectStore>,
    pub telephony: Arc<RecordingCaller>,
    pub failures: MemoryFailureSink,
}

impl Fixture {
    /// Every capability succeeds; polling is fast.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.transcription.poll_interval_ms = 1;
        config.transcription.max_poll_attempts = 5;
        config.transcription.max_poll_wait_ms = 2_000;
        config.bot.alias_arn = "arn:aws:lex:us-east-1:123:bot-alias/B/A".into();

        Self {
            config,
            transcription: Arc::new(ScriptedTranscription::always(Ok(Some(
                JobStatus::Completed,
            )))),
            storage: Arc::new(FixedObjectStore::ok(TRANSCRIPT_DOC)),
            telephony: Arc::new(RecordingCaller::ok()),
            failures: MemoryFailureSink::new(),
        }
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.config.storage.bucket = Some(bucket.to_string());
        self
    }

    pub fn with_transcription(mut self, service: ScriptedTranscription) -> Self {
        self.transcription = Arc::new(service);
        self
    }

    pub fn with_storage(mut self, store: FixedObjectStore) -> Self {
        self.storage = Arc::new(store);
        self
    }

    pub fn with_caller(mut self, caller: RecordingCaller) -> Self {
        self.telephony = Arc::new(caller);
        self
    }

    pub fn context(&self) -> FlowContext {
        FlowContext {
            config: Arc::new(self.config.clone()),
            transcription: self.transcription.clone(),
            storage: self.storage.clone(),
            telephony: self.telephony.clone(),
            failures: Arc::new(self.failures.clone()),
        }
    }

    /// One inbound leg, optionally carrying a prior state.
    pub fn invocation(&self, event: &str, state: Option<CallState>) -> Invocation {
        let mut value = json!({
            "SchemaVersion": "1.0",
            "Sequence": 1,
            "InvocationEventType": event,
            "CallDetails": {
                "TransactionId": "txn-1",
                "AwsAccountId": "123456789012",
                "AwsRegion": "us-east-1",
                "SipMediaApplicationId": SMA_ID,
                "Participants": [{
                    "CallId": CALL_ID,
                    "ParticipantTag": "LEG-A",
                    "To": DIALLED,
                    "From": CALLER,
                    "Direction": "Inbound",
                    "StartTimeInMilliseconds": "159700958834234",
                    "Status": "Connected"
                }]
            }
        });
        if let Some(state) = state {
            value["CallDetails"]["TransactionAttributes"] = json!({ "state": state.as_str() });
        }
        serde_json::from_value(value).expect("fixture invocation")
    }
}

/// Attach `ActionData` to an invocation.
pub fn with_action_data(mut invocation: Invocation, data: serde_json::Value) -> Invocation {
    invocation.action_data =
        Some(serde_json::from_value::<ActionData>(data).expect("fixture action data"));
    invocation
}
