//! Bot-dialog flow: hand the caller to a conversational bot.
//!
//! ```text
//! INITIAL    ──NEW_INBOUND_CALL──▶ conversing  Pause, VoiceFocus(on), StartBotConversation
//! conversing ──ACTION_SUCCESSFUL─▶ conversing  Pause, StartBotConversation   (FallbackIntent)
//!                                ─▶ finishing   Pause, Hangup                 (anything else)
//! ```
//!
//! The platform may answer a bot hand-off before any state was stored, so an
//! `ACTION_SUCCESSFUL` without a state is treated like `conversing`.

use async_trait::async_trait;

use crate::protocol::{EventKind, IntentResult, Invocation};

use super::builders;
use super::{CallFlow, CallState, FlowContext, ResolvedState, Scenario, Transition};

/// Intent name the bot reports when it did not understand the caller.
pub const FALLBACK_INTENT: &str = "FallbackIntent";

const PAUSE_MS: u32 = 1000;

pub struct BotFlow {
    ctx: FlowContext,
}

impl BotFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    fn start(&self, invocation: &Invocation) -> Transition {
        let Some(call_id) = invocation.call_details.primary_call_id() else {
            log::warn!("cannot start bot conversation: invocation carries no call id");
            return Transition::End;
        };
        Transition::reply(
            vec![
                builders::pause(PAUSE_MS, None),
                builders::voice_focus(call_id, true),
                builders::start_bot_conversation(&self.ctx.config.bot),
            ],
            CallState::Conversing,
        )
    }

    fn conversation_ended(&self, invocation: &Invocation) -> Transition {
        let intent = invocation
            .action_data
            .as_ref()
            .and_then(|data| data.intent_result.as_ref())
            .and_then(IntentResult::intent_name);
        log::debug!("bot conversation ended with intent {intent:?}");

        if intent == Some(FALLBACK_INTENT) {
            Transition::reply(
                vec![
                    builders::pause(PAUSE_MS, None),
                    builders::start_bot_conversation(&self.ctx.config.bot),
                ],
                CallState::Conversing,
            )
        } else {
            Transition::reply(
                vec![builders::pause(PAUSE_MS, None), builders::hangup()],
                CallState::Finishing,
            )
        }
    }
}

#[async_trait]
impl CallFlow for BotFlow {
    fn scenario(&self) -> Scenario {
        Scenario::Bot
    }

    async fn transition(
        &self,
        event: EventKind,
        state: &ResolvedState,
        invocation: &Invocation,
    ) -> Transition {
        match (event, state) {
            (EventKind::NewInboundCall, _) => self.start(invocation),
            (
                EventKind::ActionSuccessful,
                ResolvedState::Initial | ResolvedState::Known(CallState::Conversing),
            ) => self.conversation_ended(invocation),
            _ => Transition::End,
        }
    }
}
