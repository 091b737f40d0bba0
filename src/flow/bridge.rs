//! Call-and-bridge flow with digit collection and voice-focus toggling.
//!
//! ```text
//! INITIAL ──NEW_INBOUND_CALL──▶ collecting    Pause, SpeakAndGetDigits
//!
//! ACTION_SUCCESSFUL, by ActionData.Type:
//!   SpeakAndGetDigits ──▶ bridging    Pause, CallAndBridge(+digits)
//!   CallAndBridge     ──▶ connected   VoiceFocus(off) ×2, ReceiveDigits
//!   anything else     ──▶ (end)
//!
//! DIGITS_RECEIVED "1" / "0" ──▶ connected   VoiceFocus(on / off) ×2, ReceiveDigits
//! ```
//!
//! Several actions complete within one state, so `ACTION_SUCCESSFUL` branches
//! on the completed action's type rather than on the stored state.  A stored
//! state that is terminal or unrecognized still ends the session first.

use async_trait::async_trait;

use crate::protocol::{EventKind, Invocation};

use super::builders;
use super::{CallFlow, CallState, FlowContext, ResolvedState, Scenario, Transition};

/// `1` followed by ten digits.
pub const DESTINATION_REGEX: &str = "^[1][0-9][0-9][0-9][0-9][0-9][0-9][0-9][0-9][0-9][0-9]";
pub const DESTINATION_PROMPT: &str = "<speak>Hello!  Please enter the number you would like to call, starting with a one followed by ten digits</speak>";
/// Single digit toggling voice focus during the bridged call.
pub const TOGGLE_REGEX: &str = "[0-1]$";

const PAUSE_MS: u32 = 3000;

pub struct BridgeFlow {
    ctx: FlowContext,
}

impl BridgeFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    fn collect_destination(&self, invocation: &Invocation) -> Transition {
        let Some(call_id) = invocation.call_details.primary_call_id() else {
            log::warn!("cannot collect digits: invocation carries no call id");
            return Transition::End;
        };
        log::info!("asking {call_id} for a destination number");
        Transition::reply(
            vec![
                builders::pause(PAUSE_MS, Some(call_id)),
                builders::speak_and_get_digits(
                    &self.ctx.config.speech,
                    call_id,
                    DESTINATION_REGEX,
                    DESTINATION_PROMPT,
                ),
            ],
            CallState::Collecting,
        )
    }

    fn place_call(&self, invocation: &Invocation) -> Transition {
        let primary = invocation.call_details.primary();
        let call_id = invocation.call_details.primary_call_id();
        let caller = primary.and_then(|p| p.from.as_deref());
        let digits = invocation
            .action_data
            .as_ref()
            .and_then(|data| data.received_digits.as_deref())
            .filter(|d| !d.is_empty());

        let (Some(call_id), Some(caller), Some(digits)) = (call_id, caller, digits) else {
            log::warn!("cannot bridge: missing call id, caller number or digits");
            return Transition::End;
        };

        let destination = format!("+{digits}");
        log::info!("bridging {call_id} to {destination}");
        Transition::reply(
            vec![
                builders::pause(PAUSE_MS, Some(call_id)),
                builders::call_and_bridge(caller, &destination, self.ctx.bucket()),
            ],
            CallState::Bridging,
        )
    }

    fn set_voice_focus(&self, invocation: &Invocation, enable: bool) -> Transition {
        let Some((caller, recipient)) = invocation.call_details.bridged_legs() else {
            log::warn!("voice focus needs exactly one inbound and one outbound leg");
            return Transition::End;
        };
        Transition::reply(
            vec![
                builders::voice_focus(&caller.call_id, enable),
                builders::voice_focus(&recipient.call_id, enable),
                builders::receive_digits(&caller.call_id, TOGGLE_REGEX),
            ],
            CallState::Connected,
        )
    }

    fn digits_received(&self, invocation: &Invocation) -> Transition {
        let digits = invocation
            .action_data
            .as_ref()
            .and_then(|data| data.received_digits.as_deref());
        match digits {
            Some("1") => self.set_voice_focus(invocation, true),
            Some("0") => self.set_voice_focus(invocation, false),
            other => {
                log::debug!("ignoring digits {other:?}");
                Transition::End
            }
        }
    }
}

/// Whether the stored state lets the bridge flow continue.
fn is_live(state: &ResolvedState) -> bool {
    match state {
        ResolvedState::Initial => true,
        ResolvedState::Known(state) => !matches!(state, CallState::Finishing),
        ResolvedState::Unrecognized(_) => false,
    }
}

#[async_trait]
impl CallFlow for BridgeFlow {
    fn scenario(&self) -> Scenario {
        Scenario::Bridge
    }

    async fn transition(
        &self,
        event: EventKind,
        state: &ResolvedState,
        invocation: &Invocation,
    ) -> Transition {
        match event {
            EventKind::NewInboundCall => self.collect_destination(invocation),
            EventKind::ActionSuccessful if is_live(state) => match invocation.action_type() {
                Some("SpeakAndGetDigits") => self.place_call(invocation),
                Some("CallAndBridge") => self.set_voice_focus(invocation, false),
                _ => Transition::End,
            },
            EventKind::DigitsReceived if is_live(state) => self.digits_received(invocation),
            _ => Transition::End,
        }
    }
}
