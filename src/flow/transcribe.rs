//! Transcribe-and-playback flow.
//!
//! ```text
//! INITIAL ──NEW_INBOUND_CALL──▶ new ─▶ beeping ─▶ recording      (as record flow)
//! recording    ──ACTION_SUCCESSFUL─▶ transcribing  start job; Speak(please wait)
//! transcribing ──ACTION_SUCCESSFUL─▶ playing       poll, fetch; Speak(transcript | apology)
//! playing      ──ACTION_SUCCESSFUL─▶ finishing     Pause, Speak(goodbye), Hangup
//! ```
//!
//! The job is named after the call id and its output location is derived
//! from it, so nothing but the state tag has to survive between invocations.
//! A failed start still moves on to `transcribing`; any failure while waiting
//! or fetching turns into the apology.  Both are reported on the failure
//! channel.

use async_trait::async_trait;

use crate::capability::{
    first_transcript, media_uri, wait_for_job, Capability, CapabilityError, PollPolicy,
    TranscriptLocation, TranscriptionJobRequest,
};
use crate::protocol::{EventKind, Invocation};

use super::builders;
use super::record;
use super::{CallFlow, CallState, FlowContext, ResolvedState, Scenario, Transition};

pub const WAIT_TEXT: &str =
    "<speak>Transcribing recording, please wait.  This may take up to fifteen seconds.</speak>";
pub const APOLOGY_TEXT: &str =
    "<speak>Sorry, we encountered an error transcribing your message</speak>";

/// SSML for a transcript; the transcript itself is escaped.
pub fn transcript_text(transcript: &str) -> String {
    builders::ssml(&format!(
        "Your message says, {}",
        builders::escape_ssml(transcript)
    ))
}

pub struct TranscribeFlow {
    ctx: FlowContext,
}

impl TranscribeFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    async fn start_transcription(&self, invocation: &Invocation) -> Transition {
        let Some(call_id) = invocation.call_details.primary_call_id() else {
            log::warn!("cannot transcribe: invocation carries no call id");
            return Transition::End;
        };
        let destination = invocation
            .action_data
            .as_ref()
            .and_then(|data| data.recording_destination.as_ref());
        let Some(key) = destination.and_then(|dest| dest.key.as_deref()) else {
            log::warn!("recording finished without a RecordingDestination key");
            return Transition::End;
        };
        let Some(bucket) = destination
            .and_then(|dest| dest.bucket_name.as_deref())
            .or(self.ctx.bucket())
        else {
            log::warn!("recording finished without a bucket name");
            return Transition::End;
        };

        let request = TranscriptionJobRequest::for_call(
            call_id,
            media_uri(bucket, key),
            &self.ctx.config.transcription,
            self.ctx.bucket(),
        );

        match self.ctx.transcription.start_job(&request).await {
            Ok(()) => log::info!("transcription job {} started", request.transcription_job_name),
            Err(e) => self
                .ctx
                .report(Capability::TranscriptionStart, Some(call_id), e),
        }

        Transition::reply(
            vec![builders::speak(&self.ctx.config.speech, WAIT_TEXT)],
            CallState::Transcribing,
        )
    }

    async fn play_transcript(&self, invocation: &Invocation) -> Transition {
        let Some(call_id) = invocation.call_details.primary_call_id() else {
            log::warn!("cannot fetch transcript: invocation carries no call id");
            return Transition::End;
        };

        let text = match self.fetch_transcript(call_id).await {
            Ok(transcript) => transcript_text(&transcript),
            Err((capability, e)) => {
                self.ctx.report(capability, Some(call_id), e);
                APOLOGY_TEXT.to_string()
            }
        };

        Transition::reply(
            vec![builders::speak(&self.ctx.config.speech, &text)],
            CallState::Playing,
        )
    }

    async fn fetch_transcript(
        &self,
        call_id: &str,
    ) -> Result<String, (Capability, CapabilityError)> {
        let policy = PollPolicy::from_config(&self.ctx.config.transcription);
        wait_for_job(&*self.ctx.transcription, call_id, policy)
            .await
            .map_err(|e| (Capability::TranscriptionPoll, e))?;

        let location = TranscriptLocation::for_call(call_id, self.ctx.bucket());
        let bytes = self
            .ctx
            .storage
            .get_object(location.bucket.as_deref(), &location.key)
            .await
            .map_err(|e| (Capability::TranscriptFetch, e))?;
        first_transcript(&bytes).map_err(|e| (Capability::TranscriptFetch, e))
    }
}

#[async_trait]
impl CallFlow for TranscribeFlow {
    fn scenario(&self) -> Scenario {
        Scenario::Transcribe
    }

    async fn transition(
        &self,
        event: EventKind,
        state: &ResolvedState,
        invocation: &Invocation,
    ) -> Transition {
        match (event, state.known()) {
            (EventKind::NewInboundCall, _) => record::prompt(&self.ctx),
            (EventKind::ActionSuccessful, Some(CallState::New)) => record::beep(&self.ctx),
            (EventKind::ActionSuccessful, Some(CallState::Beeping)) => {
                record::record(&self.ctx, invocation, str::to_string)
            }
            (EventKind::ActionSuccessful, Some(CallState::Recording)) => {
                self.start_transcription(invocation).await
            }
            (EventKind::ActionSuccessful, Some(CallState::Transcribing)) => {
                self.play_transcript(invocation).await
            }
            (EventKind::ActionSuccessful, Some(CallState::Playing)) => record::goodbye(&self.ctx),
            _ => Transition::End,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
