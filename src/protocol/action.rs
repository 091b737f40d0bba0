//! Action payloads sent back to the call platform.
//!
//! [`Action`] serialises as `{"Type": "<tag>", "Parameters": {...}}`.  Field
//! names and value types follow the platform's wire format exactly: some
//! durations travel as strings (`"1000"`), others as integers, and builders
//! must not normalise them.

use serde::{Deserialize, Serialize};

/// Storage type tag used by every audio source / destination.
pub const S3_SOURCE_TYPE: &str = "S3";

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One instruction to the call platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Parameters")]
pub enum Action {
    Pause(PauseParams),
    Speak(SpeechParams),
    PlayAudio(PlayAudioParams),
    RecordAudio(RecordAudioParams),
    Hangup(HangupParams),
    CallAndBridge(CallAndBridgeParams),
    VoiceFocus(VoiceFocusParams),
    ReceiveDigits(ReceiveDigitsParams),
    SpeakAndGetDigits(SpeakAndGetDigitsParams),
    StartBotConversation(StartBotConversationParams),
}

impl Action {
    /// The `Type` tag this action serialises with.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Pause(_) => "Pause",
            Action::Speak(_) => "Speak",
            Action::PlayAudio(_) => "PlayAudio",
            Action::RecordAudio(_) => "RecordAudio",
            Action::Hangup(_) => "Hangup",
            Action::CallAndBridge(_) => "CallAndBridge",
            Action::VoiceFocus(_) => "VoiceFocus",
            Action::ReceiveDigits(_) => "ReceiveDigits",
            Action::SpeakAndGetDigits(_) => "SpeakAndGetDigits",
            Action::StartBotConversation(_) => "StartBotConversation",
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PauseParams {
    pub duration_in_milliseconds: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

/// Voice settings shared by `Speak` and the speech blocks of
/// `SpeakAndGetDigits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpeechParams {
    pub text: String,
    pub engine: String,
    pub language_code: String,
    pub text_type: String,
    pub voice_id: String,
}

/// An object in audio storage.  `BucketName` is omitted when no bucket
/// override is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AudioObject {
    #[serde(rename = "Type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayAudioParams {
    pub repeat: String,
    pub audio_source: AudioObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingDestination {
    #[serde(rename = "Type")]
    pub destination_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordAudioParams {
    pub call_id: String,
    pub duration_in_seconds: String,
    pub silence_duration_in_seconds: u32,
    pub silence_threshold: u32,
    pub recording_terminators: Vec<String>,
    pub recording_destination: RecordingDestination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HangupParams {
    pub sip_response_code: String,
    pub participant_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BridgeEndpoint {
    pub uri: String,
    pub bridge_endpoint_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallAndBridgeParams {
    pub call_timeout_seconds: u32,
    pub caller_id_number: String,
    pub ringback_tone: AudioObject,
    pub endpoints: Vec<BridgeEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceFocusParams {
    pub enable: bool,
    pub call_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiveDigitsParams {
    pub call_id: String,
    pub input_digits_regex: String,
    pub in_between_digits_duration_in_milliseconds: u32,
    pub flush_digits_duration_in_milliseconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpeakAndGetDigitsParams {
    pub call_id: String,
    pub input_digits_regex: String,
    pub speech_parameters: SpeechParams,
    pub failure_speech_parameters: SpeechParams,
    pub min_number_of_digits: u32,
    pub max_number_of_digits: u32,
    pub terminator_digits: Vec<String>,
    pub in_between_digits_duration_in_milliseconds: u32,
    pub repeat: u32,
    pub repeat_duration_in_milliseconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DialogAction {
    #[serde(rename = "Type")]
    pub action_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BotSessionState {
    pub dialog_action: DialogAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WelcomeMessage {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BotConfiguration {
    pub session_state: BotSessionState,
    pub welcome_messages: Vec<WelcomeMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartBotConversationParams {
    pub bot_alias_arn: String,
    pub locale_id: String,
    pub configuration: BotConfiguration,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
