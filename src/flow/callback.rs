//! Call-back flow: promise a call-back, hang up, then dial the caller.
//!
//! ```text
//! INITIAL ──NEW_INBOUND_CALL──▶ finishing   Pause, Speak(call you back), Hangup
//! HANGUP (inbound leg)        ──▶ (end)       side effect: place outbound call
//! INITIAL ──CALL_ANSWERED─────▶ finishing   Pause, Speak(calling back), Pause, Hangup
//! ```
//!
//! The outbound call runs through the same application, so its own `HANGUP`
//! arrives here too.  Only an inbound leg triggers a call-back.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::capability::{Capability, OutboundCallRequest};
use crate::protocol::{Direction, EventKind, Invocation};

use super::builders;
use super::{CallFlow, CallState, FlowContext, ResolvedState, Scenario, Transition};

pub const PROMISE_TEXT: &str = "<speak>Hello!  I will call you back!  Goodbye!</speak>";
pub const CALLING_BACK_TEXT: &str = "<speak>Hello!  I am just calling you back!  Goodbye!</speak>";

const PAUSE_MS: u32 = 1000;

pub struct CallBackFlow {
    ctx: FlowContext,
}

impl CallBackFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    fn promise(&self) -> Transition {
        Transition::reply(
            vec![
                builders::pause(PAUSE_MS, None),
                builders::speak(&self.ctx.config.speech, PROMISE_TEXT),
                builders::hangup(),
            ],
            CallState::Finishing,
        )
    }

    fn answered(&self) -> Transition {
        Transition::reply(
            vec![
                builders::pause(PAUSE_MS, None),
                builders::speak(&self.ctx.config.speech, CALLING_BACK_TEXT),
                builders::pause(PAUSE_MS, None),
                builders::hangup(),
            ],
            CallState::Finishing,
        )
    }

    /// Build the call-back request for an inbound leg's hangup.
    fn call_back_request(invocation: &Invocation) -> Option<OutboundCallRequest> {
        let leg = invocation.call_details.primary()?;
        if leg.direction != Direction::Inbound {
            return None;
        }
        Some(OutboundCallRequest {
            sip_media_application_id: invocation
                .call_details
                .sip_media_application_id
                .clone()
                .filter(|id| !id.is_empty())?,
            from_phone_number: leg.to.clone()?,
            to_phone_number: leg.from.clone()?,
            sip_headers: BTreeMap::new(),
        })
    }

    async fn call_back(&self, invocation: &Invocation) -> Transition {
        let call_id = invocation.call_details.primary_call_id();
        match Self::call_back_request(invocation) {
            Some(request) => match self.ctx.telephony.place_call(&request).await {
                Ok(txn) => log::info!(
                    "calling back {} (transaction {})",
                    request.to_phone_number,
                    txn.as_deref().unwrap_or("-")
                ),
                Err(e) => self.ctx.report(Capability::OutboundCall, call_id, e),
            },
            None => log::debug!("hangup of {call_id:?} does not call back"),
        }
        Transition::End
    }
}

#[async_trait]
impl CallFlow for CallBackFlow {
    fn scenario(&self) -> Scenario {
        Scenario::CallBack
    }

    async fn transition(
        &self,
        event: EventKind,
        state: &ResolvedState,
        invocation: &Invocation,
    ) -> Transition {
        match (event, state) {
            (EventKind::NewInboundCall, _) => self.promise(),
            (EventKind::Hangup, _) => self.call_back(invocation).await,
            (EventKind::CallAnswered, ResolvedState::Initial) => self.answered(),
            _ => Transition::End,
        }
    }
}
