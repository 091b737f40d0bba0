//! Call flows: one transition table per scenario.
//!
//! A [`CallFlow`] maps `(event, resolved state, invocation)` to a
//! [`Transition`]: either the next actions plus the state tag to carry, or the
//! end of the session (empty reply, no attributes).  Flows are selected by
//! [`Scenario`] through [`build_flow`] and reach external capabilities only
//! through the adapters held in [`FlowContext`].

pub mod bot;
pub mod bridge;
pub mod builders;
pub mod callback;
pub mod play;
pub mod record;
pub mod state;
pub mod transcribe;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::{
    Capability, CapabilityError, FailureEvent, FailureSink, HttpObjectStore, HttpOutboundCaller,
    HttpTranscriptionService, ObjectStore, OutboundCaller, TranscriptionService,
};
use crate::config::AppConfig;
use crate::protocol::{Action, EventKind, Invocation, Response};

pub use crate::config::Scenario;
pub use state::{CallState, ResolvedState};

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Outcome of one transition-table lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Emit `actions` and carry `next` to the following invocation.
    Reply { actions: Vec<Action>, next: CallState },
    /// The session ends here: empty actions, no attributes.
    End,
}

impl Transition {
    pub fn reply(actions: Vec<Action>, next: CallState) -> Self {
        Transition::Reply { actions, next }
    }

    /// Response assembler.
    pub fn into_response(self) -> Response {
        match self {
            Transition::Reply { actions, next } => Response::with_state(actions, next.as_str()),
            Transition::End => Response::empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// CallFlow trait
// ---------------------------------------------------------------------------

/// A scenario's transition table.
///
/// Implementations must be deterministic for a given input, apart from text
/// that depends on what a capability returned.  They never fail: a malformed
/// invocation or a capability error degrades to [`Transition::End`] or an
/// apology, never to an error.
#[async_trait]
pub trait CallFlow: Send + Sync {
    fn scenario(&self) -> Scenario;

    async fn transition(
        &self,
        event: EventKind,
        state: &ResolvedState,
        invocation: &Invocation,
    ) -> Transition;
}

// ---------------------------------------------------------------------------
// FlowContext
// ---------------------------------------------------------------------------

/// Read-only configuration and capability adapters shared by every
/// invocation.
#[derive(Clone)]
pub struct FlowContext {
    pub config: Arc<AppConfig>,
    pub transcription: Arc<dyn TranscriptionService>,
    pub storage: Arc<dyn ObjectStore>,
    pub telephony: Arc<dyn OutboundCaller>,
    pub failures: Arc<dyn FailureSink>,
}

impl FlowContext {
    /// Context backed by the HTTP gateways named in `config`.
    pub fn from_config(config: Arc<AppConfig>, failures: Arc<dyn FailureSink>) -> Self {
        Self {
            transcription: Arc::new(HttpTranscriptionService::from_config(&config.transcription)),
            storage: Arc::new(HttpObjectStore::from_config(&config.storage)),
            telephony: Arc::new(HttpOutboundCaller::from_config(&config.telephony)),
            failures,
            config,
        }
    }

    /// Storage bucket override, if configured.
    pub fn bucket(&self) -> Option<&str> {
        self.config.storage.bucket.as_deref()
    }

    /// Publish a swallowed capability failure.
    pub fn report(&self, capability: Capability, call_id: Option<&str>, error: CapabilityError) {
        self.failures.record(FailureEvent {
            capability,
            call_id: call_id.map(str::to_string),
            error,
        });
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build the flow for `scenario`.
pub fn build_flow(scenario: Scenario, ctx: FlowContext) -> Arc<dyn CallFlow> {
    match scenario {
        Scenario::Record => Arc::new(record::RecordFlow::new(ctx)),
        Scenario::Transcribe => Arc::new(transcribe::TranscribeFlow::new(ctx)),
        Scenario::Bot => Arc::new(bot::BotFlow::new(ctx)),
        Scenario::Bridge => Arc::new(bridge::BridgeFlow::new(ctx)),
        Scenario::CallBack => Arc::new(callback::CallBackFlow::new(ctx)),
        Scenario::Play => Arc::new(play::PlayFlow::new(ctx)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::fixtures::Fixture;
    use serde_json::json;

    #[test]
    fn end_assembles_empty_reply() {
        assert_eq!(
            serde_json::to_value(Transition::End.into_response()).unwrap(),
            json!({ "SchemaVersion": "1.0", "Actions": [] })
        );
    }

    #[test]
    fn reply_carries_only_the_next_state() {
        let resp = Transition::reply(vec![builders::hangup()], CallState::Finishing).into_response();
        assert_eq!(resp.state(), Some("finishing"));
        assert_eq!(resp.transaction_attributes.as_ref().map(|a| a.len()), Some(1));
    }

    #[test]
    fn factory_builds_every_scenario() {
        let fixture = Fixture::new();
        for scenario in Scenario::ALL {
            let flow = build_flow(scenario, fixture.context());
            assert_eq!(flow.scenario(), scenario);
        }
    }

    #[tokio::test]
    async fn hangup_ends_every_flow_from_every_state() {
        let fixture = Fixture::new();
        let mut states = vec![ResolvedState::Initial, ResolvedState::Unrecognized("x".into())];
        states.extend(CallState::ALL.into_iter().map(ResolvedState::Known));

        for scenario in Scenario::ALL {
            let flow = build_flow(scenario, fixture.context());
            for state in &states {
                let inv = fixture.invocation("HANGUP", state.known());
                let t = flow.transition(EventKind::Hangup, state, &inv).await;
                assert_eq!(t, Transition::End, "{scenario} / {}", state.label());
            }
        }
    }

    #[tokio::test]
    async fn unclassified_events_end_every_flow() {
        let fixture = Fixture::new();
        for scenario in Scenario::ALL {
            let flow = build_flow(scenario, fixture.context());
            for event in [
                EventKind::Unknown,
                EventKind::Ringing,
                EventKind::NewOutboundCall,
                EventKind::ActionFailed,
            ] {
                let inv = fixture.invocation(event.as_str(), None);
                let t = flow.transition(event, &ResolvedState::Initial, &inv).await;
                assert_eq!(t, Transition::End, "{scenario} / {event}");
            }
        }
    }

    #[tokio::test]
    async fn unrecognized_state_ends_every_flow() {
        let fixture = Fixture::new();
        let state = ResolvedState::Unrecognized("dancing".into());
        for scenario in Scenario::ALL {
            let flow = build_flow(scenario, fixture.context());
            let inv = fixture.invocation("ACTION_SUCCESSFUL", None);
            let t = flow.transition(EventKind::ActionSuccessful, &state, &inv).await;
            assert_eq!(t, Transition::End, "{scenario}");
        }
    }
}
