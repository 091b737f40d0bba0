//! Play flow: greet with a stored audio file and hang up.

use async_trait::async_trait;

use crate::protocol::{EventKind, Invocation};

use super::builders;
use super::{CallFlow, CallState, FlowContext, ResolvedState, Scenario, Transition};

pub const GREETING_KEY: &str = "hello-goodbye.wav";

pub struct PlayFlow {
    ctx: FlowContext,
}

impl PlayFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CallFlow for PlayFlow {
    fn scenario(&self) -> Scenario {
        Scenario::Play
    }

    async fn transition(
        &self,
        event: EventKind,
        _state: &ResolvedState,
        _invocation: &Invocation,
    ) -> Transition {
        match event {
            EventKind::NewInboundCall => Transition::reply(
                vec![
                    builders::pause(1000, None),
                    builders::play_audio(self.ctx.bucket(), GREETING_KEY),
                    builders::hangup(),
                ],
                CallState::Finishing,
            ),
            _ => Transition::End,
        }
    }
}
