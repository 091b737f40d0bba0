//! Top-level invocation handler.
//!
//! [`CallHandler`] runs one invocation end to end:
//!
//! ```text
//! raw JSON ──parse──▶ Invocation ──classify──▶ EventKind
//!                                ──resolve───▶ ResolvedState
//!                                ──flow──────▶ Transition ──assemble──▶ Response
//! ```
//!
//! It is total: every input, including `{}` and text that is not JSON at
//! all, yields exactly one [`Response`].  An unrecognized `state` ends the
//! session whatever the event, before any flow runs.

use std::sync::Arc;

use crate::flow::{build_flow, CallFlow, FlowContext, ResolvedState, Scenario};
use crate::protocol::{EventKind, Invocation, Response};

/// Parse one raw invocation.
pub fn parse_invocation(raw: &str) -> Result<Invocation, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Answers invocations for one scenario.  Cheap to clone.
#[derive(Clone)]
pub struct CallHandler {
    flow: Arc<dyn CallFlow>,
}

impl CallHandler {
    pub fn new(flow: Arc<dyn CallFlow>) -> Self {
        Self { flow }
    }

    /// Handler for `scenario` over the adapters in `ctx`.
    pub fn for_scenario(scenario: Scenario, ctx: FlowContext) -> Self {
        Self::new(build_flow(scenario, ctx))
    }

    pub fn scenario(&self) -> Scenario {
        self.flow.scenario()
    }

    pub async fn handle(&self, invocation: &Invocation) -> Response {
        let event = invocation.event_kind();
        let state = ResolvedState::resolve(&invocation.call_details);
        let call_id = invocation.call_details.primary_call_id().unwrap_or("-");

        if log::log_enabled!(log::Level::Debug) {
            if let Ok(payload) = serde_json::to_string(invocation) {
                log::debug!("invocation: {payload}");
            }
        }

        if event == EventKind::ActionFailed {
            let data = invocation.action_data.as_ref();
            log::warn!(
                "action {} failed on {call_id}: {} {}",
                invocation.action_type().unwrap_or("?"),
                data.and_then(|d| d.error_type.as_deref()).unwrap_or("-"),
                data.and_then(|d| d.error_message.as_deref()).unwrap_or("")
            );
        }

        let response = match &state {
            ResolvedState::Unrecognized(tag) => {
                log::warn!("call {call_id}: unrecognized state {tag:?} on {event}, ending");
                Response::empty()
            }
            _ => self
                .flow
                .transition(event, &state, invocation)
                .await
                .into_response(),
        };

        log::info!(
            "{} call={call_id} event={event} state={} actions={} next={}",
            self.scenario(),
            state.label(),
            response.actions.len(),
            response.state().unwrap_or("-")
        );
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(payload) = serde_json::to_string(&response) {
                log::debug!("response: {payload}");
            }
        }

        response
    }

    /// Handle a raw JSON invocation; anything unparseable gets the empty reply.
    pub async fn handle_raw(&self, raw: &str) -> Response {
        match parse_invocation(raw) {
            Ok(invocation) => self.handle(&invocation).await,
            Err(e) => {
                log::warn!("unparseable invocation: {e}");
                Response::empty()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
