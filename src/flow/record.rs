//! Record-and-playback flow.
//!
//! ```text
//! INITIAL ──NEW_INBOUND_CALL──▶ new        Pause, Speak(prompt)
//! new     ──ACTION_SUCCESSFUL─▶ beeping    Pause, PlayAudio(beep)
//! beeping ──ACTION_SUCCESSFUL─▶ recording  RecordAudio
//! recording ──ACTION_SUCCESSFUL─▶ playing  Pause, Speak, PlayAudio(recording)
//! playing ──ACTION_SUCCESSFUL─▶ finishing  Pause, Speak(goodbye), Hangup
//! ```
//!
//! The first three steps are shared with the transcribe flow.

use async_trait::async_trait;

use crate::protocol::{EventKind, Invocation};

use super::builders;
use super::{CallFlow, CallState, FlowContext, ResolvedState, Scenario, Transition};

pub const PROMPT_TEXT: &str =
    "<speak>Hello!  Please record a message after the tone, and press pound when you are done.</speak>";
pub const BEEP_KEY: &str = "500hz-beep.wav";
pub const PLAYBACK_INTRO_TEXT: &str = "<speak>Your message said</speak>";
pub const GOODBYE_TEXT: &str = "<speak>Thank you!  Goodbye!</speak>";

pub(crate) const PAUSE_MS: u32 = 1000;

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

pub(crate) fn prompt(ctx: &FlowContext) -> Transition {
    Transition::reply(
        vec![
            builders::pause(PAUSE_MS, None),
            builders::speak(&ctx.config.speech, PROMPT_TEXT),
        ],
        CallState::New,
    )
}

pub(crate) fn beep(ctx: &FlowContext) -> Transition {
    Transition::reply(
        vec![
            builders::pause(PAUSE_MS, None),
            builders::play_audio(ctx.bucket(), BEEP_KEY),
        ],
        CallState::Beeping,
    )
}

/// Start recording the primary leg under `prefix(call_id)`.
pub(crate) fn record<F>(ctx: &FlowContext, invocation: &Invocation, prefix: F) -> Transition
where
    F: Fn(&str) -> String,
{
    let Some(call_id) = invocation.call_details.primary_call_id() else {
        log::warn!("cannot record: invocation carries no call id");
        return Transition::End;
    };
    Transition::reply(
        vec![builders::record_audio(call_id, &prefix(call_id), ctx.bucket())],
        CallState::Recording,
    )
}

pub(crate) fn goodbye(ctx: &FlowContext) -> Transition {
    Transition::reply(
        vec![
            builders::pause(PAUSE_MS, None),
            builders::speak(&ctx.config.speech, GOODBYE_TEXT),
            builders::hangup(),
        ],
        CallState::Finishing,
    )
}

// ---------------------------------------------------------------------------
// RecordFlow
// ---------------------------------------------------------------------------

pub struct RecordFlow {
    ctx: FlowContext,
}

impl RecordFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    fn playback(&self, invocation: &Invocation) -> Transition {
        let key = invocation
            .action_data
            .as_ref()
            .and_then(|data| data.recording_destination.as_ref())
            .and_then(|dest| dest.key.as_deref());
        let Some(key) = key else {
            log::warn!("recording finished without a RecordingDestination key");
            return Transition::End;
        };

        Transition::reply(
            vec![
                builders::pause(PAUSE_MS, None),
                builders::speak(&self.ctx.config.speech, PLAYBACK_INTRO_TEXT),
                builders::play_audio(self.ctx.bucket(), key),
            ],
            CallState::Playing,
        )
    }
}

#[async_trait]
impl CallFlow for RecordFlow {
    fn scenario(&self) -> Scenario {
        Scenario::Record
    }

    async fn transition(
        &self,
        event: EventKind,
        state: &ResolvedState,
        invocation: &Invocation,
    ) -> Transition {
        match (event, state.known()) {
            (EventKind::NewInboundCall, _) => prompt(&self.ctx),
            (EventKind::ActionSuccessful, Some(CallState::New)) => beep(&self.ctx),
            (EventKind::ActionSuccessful, Some(CallState::Beeping)) => {
                record(&self.ctx, invocation, |call_id| format!("{call_id}-"))
            }
            (EventKind::ActionSuccessful, Some(CallState::Recording)) => self.playback(invocation),
            (EventKind::ActionSuccessful, Some(CallState::Playing)) => goodbye(&self.ctx),
            _ => Transition::End,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
