//! Action builders.
//!
//! Pure functions: every call returns a freshly built [`Action`] filled with
//! the per-call values passed in.  Nothing is shared or mutated between
//! invocations.

use crate::config::{BotConfig, SpeechConfig};
use crate::protocol::{
    Action, AudioObject, BotConfiguration, BotSessionState, BridgeEndpoint, CallAndBridgeParams,
    DialogAction, HangupParams, PauseParams, PlayAudioParams, ReceiveDigitsParams,
    RecordAudioParams, RecordingDestination, SpeakAndGetDigitsParams, SpeechParams,
    StartBotConversationParams, VoiceFocusParams, WelcomeMessage, S3_SOURCE_TYPE,
};

pub const TEXT_TYPE_SSML: &str = "ssml";
pub const RINGBACK_KEY: &str = "ringback.wav";
pub const DIGITS_FAILURE_TEXT: &str = "<speak>Sorry, there was an error.</speak>";

/// Wrap plain text in a `<speak>` element.
pub fn ssml(text: &str) -> String {
    format!("<speak>{text}</speak>")
}

/// Escape text taken from outside (e.g. a transcript) before embedding it in
/// SSML.
pub fn escape_ssml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn speech(voice: &SpeechConfig, voice_id: &str, text: &str) -> SpeechParams {
    SpeechParams {
        text: text.to_string(),
        engine: voice.engine.clone(),
        language_code: voice.language_code.clone(),
        text_type: TEXT_TYPE_SSML.to_string(),
        voice_id: voice_id.to_string(),
    }
}

fn s3_object(bucket: Option<&str>, key: &str) -> AudioObject {
    AudioObject {
        source_type: S3_SOURCE_TYPE.to_string(),
        bucket_name: bucket.map(str::to_string),
        key: key.to_string(),
    }
}

pub fn pause(duration_ms: u32, call_id: Option<&str>) -> Action {
    Action::Pause(PauseParams {
        duration_in_milliseconds: duration_ms.to_string(),
        call_id: call_id.map(str::to_string),
    })
}

/// `Speak` with SSML `text`.
pub fn speak(voice: &SpeechConfig, text: &str) -> Action {
    Action::Speak(speech(voice, &voice.voice_id, text))
}

pub fn play_audio(bucket: Option<&str>, key: &str) -> Action {
    Action::PlayAudio(PlayAudioParams {
        repeat: "1".to_string(),
        audio_source: s3_object(bucket, key),
    })
}

/// Record up to 30 s, stopping on 3 s of silence or `#`.
pub fn record_audio(call_id: &str, prefix: &str, bucket: Option<&str>) -> Action {
    Action::RecordAudio(RecordAudioParams {
        call_id: call_id.to_string(),
        duration_in_seconds: "30".to_string(),
        silence_duration_in_seconds: 3,
        silence_threshold: 100,
        recording_terminators: vec!["#".to_string()],
        recording_destination: RecordingDestination {
            destination_type: S3_SOURCE_TYPE.to_string(),
            bucket_name: bucket.map(str::to_string),
            prefix: prefix.to_string(),
        },
    })
}

pub fn hangup() -> Action {
    Action::Hangup(HangupParams {
        sip_response_code: "0".to_string(),
        participant_tag: String::new(),
    })
}

/// Dial `destination` over PSTN and bridge it to the current call.
pub fn call_and_bridge(caller_id: &str, destination: &str, bucket: Option<&str>) -> Action {
    Action::CallAndBridge(CallAndBridgeParams {
        call_timeout_seconds: 30,
        caller_id_number: caller_id.to_string(),
        ringback_tone: s3_object(bucket, RINGBACK_KEY),
        endpoints: vec![BridgeEndpoint {
            uri: destination.to_string(),
            bridge_endpoint_type: "PSTN".to_string(),
        }],
    })
}

pub fn voice_focus(call_id: &str, enable: bool) -> Action {
    Action::VoiceFocus(VoiceFocusParams {
        enable,
        call_id: call_id.to_string(),
    })
}

pub fn receive_digits(call_id: &str, regex: &str) -> Action {
    Action::ReceiveDigits(ReceiveDigitsParams {
        call_id: call_id.to_string(),
        input_digits_regex: regex.to_string(),
        in_between_digits_duration_in_milliseconds: 1000,
        flush_digits_duration_in_milliseconds: 10000,
    })
}

/// Speak `text` and collect exactly 11 digits matching `regex`.
pub fn speak_and_get_digits(voice: &SpeechConfig, call_id: &str, regex: &str, text: &str) -> Action {
    Action::SpeakAndGetDigits(SpeakAndGetDigitsParams {
        call_id: call_id.to_string(),
        input_digits_regex: regex.to_string(),
        speech_parameters: speech(voice, &voice.digits_voice_id, text),
        failure_speech_parameters: speech(voice, &voice.digits_voice_id, DIGITS_FAILURE_TEXT),
        min_number_of_digits: 11,
        max_number_of_digits: 11,
        terminator_digits: vec!["#".to_string()],
        in_between_digits_duration_in_milliseconds: 5000,
        repeat: 3,
        repeat_duration_in_milliseconds: 10000,
    })
}

pub fn start_bot_conversation(bot: &BotConfig) -> Action {
    Action::StartBotConversation(StartBotConversationParams {
        bot_alias_arn: bot.alias_arn.clone(),
        locale_id: bot.locale_id.clone(),
        configuration: BotConfiguration {
            session_state: BotSessionState {
                dialog_action: DialogAction {
                    action_type: "ElicitIntent".to_string(),
                },
            },
            welcome_messages: vec![WelcomeMessage {
                content_type: "PlainText".to_string(),
                content: bot.welcome_message.clone(),
            }],
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
