//! Wire types exchanged with the call platform.
//!
//! * [`Invocation`] - one inbound lifecycle event; [`Invocation::event_kind`]
//!   is the event classifier.
//! * [`Action`] - one instruction in a reply, tagged by `Type`.
//! * [`Response`] - the reply envelope (`SchemaVersion`, `Actions`,
//!   `TransactionAttributes`).

pub mod action;
pub mod invocation;
pub mod response;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use action::{
    Action, AudioObject, BotConfiguration, BotSessionState, BridgeEndpoint, CallAndBridgeParams,
    DialogAction, HangupParams, PauseParams, PlayAudioParams, ReceiveDigitsParams,
    RecordAudioParams, RecordingDestination, SpeakAndGetDigitsParams, SpeechParams,
    StartBotConversationParams, VoiceFocusParams, WelcomeMessage, S3_SOURCE_TYPE,
};
pub use invocation::{
    ActionData, CallDetails, Direction, EventKind, IntentResult, Invocation, Participant,
    RecordingLocation, TransactionAttributes,
};
pub use response::{Response, SCHEMA_VERSION, STATE_KEY};
