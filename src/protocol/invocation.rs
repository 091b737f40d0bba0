//! Inbound invocation types and the event classifier.
//!
//! Every field is optional on the wire.  A payload that omits
//! `InvocationEventType` (or carries a value this crate does not know)
//! classifies as [`EventKind::Unknown`] instead of failing to parse, so the
//! handler can still answer it with an empty reply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Lifecycle event carried by one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    NewInboundCall,
    NewOutboundCall,
    Ringing,
    CallAnswered,
    ActionSuccessful,
    ActionFailed,
    DigitsReceived,
    Hangup,
    /// Missing or unrecognized `InvocationEventType`.
    #[default]
    #[serde(other)]
    Unknown,
}

impl EventKind {
    /// Wire name of the event, as used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewInboundCall => "NEW_INBOUND_CALL",
            Self::NewOutboundCall => "NEW_OUTBOUND_CALL",
            Self::Ringing => "RINGING",
            Self::CallAnswered => "CALL_ANSWERED",
            Self::ActionSuccessful => "ACTION_SUCCESSFUL",
            Self::ActionFailed => "ACTION_FAILED",
            Self::DigitsReceived => "DIGITS_RECEIVED",
            Self::Hangup => "HANGUP",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// Direction of one call leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    Inbound,
    Outbound,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One leg of a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Participant {
    pub call_id: String,
    pub participant_tag: Option<String>,
    /// Calling number.
    pub from: Option<String>,
    /// Called number.
    pub to: Option<String>,
    pub direction: Direction,
}

// ---------------------------------------------------------------------------
// CallDetails
// ---------------------------------------------------------------------------

/// Opaque key-value bag round-tripped by the platform between invocations.
pub type TransactionAttributes = BTreeMap<String, serde_json::Value>;

/// Call record attached to every invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CallDetails {
    pub transaction_id: Option<String>,
    pub sip_media_application_id: Option<String>,
    pub aws_region: Option<String>,
    pub participants: Vec<Participant>,
    pub transaction_attributes: Option<TransactionAttributes>,
}

impl CallDetails {
    /// The first participant, which carries the leg this invocation is about.
    pub fn primary(&self) -> Option<&Participant> {
        self.participants.first()
    }

    /// Call id of the first participant.
    pub fn primary_call_id(&self) -> Option<&str> {
        self.primary()
            .map(|p| p.call_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// The `(inbound, outbound)` legs of a bridged call.
    ///
    /// Returns `None` unless exactly one leg of each direction is present.
    pub fn bridged_legs(&self) -> Option<(&Participant, &Participant)> {
        let mut inbound = self
            .participants
            .iter()
            .filter(|p| p.direction == Direction::Inbound);
        let mut outbound = self
            .participants
            .iter()
            .filter(|p| p.direction == Direction::Outbound);

        match (inbound.next(), inbound.next(), outbound.next(), outbound.next()) {
            (Some(caller), None, Some(recipient), None) => Some((caller, recipient)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionData
// ---------------------------------------------------------------------------

/// Where a `RecordAudio` action stored its file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RecordingLocation {
    #[serde(rename = "Type")]
    pub location_type: Option<String>,
    pub bucket_name: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Intent {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SessionState {
    pub intent: Option<Intent>,
}

/// Outcome of a `StartBotConversation` action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IntentResult {
    pub session_state: Option<SessionState>,
}

impl IntentResult {
    pub fn intent_name(&self) -> Option<&str> {
        self.session_state
            .as_ref()?
            .intent
            .as_ref()?
            .name
            .as_deref()
    }
}

/// Result payload of the action that just completed.
///
/// Its shape depends on which action it follows; only the fields the flows
/// read are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ActionData {
    /// Type tag of the completed action (e.g. `"SpeakAndGetDigits"`).
    #[serde(rename = "Type")]
    pub action_type: Option<String>,
    pub received_digits: Option<String>,
    pub recording_destination: Option<RecordingLocation>,
    pub intent_result: Option<IntentResult>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One call-lifecycle event delivered to the handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Invocation {
    pub schema_version: Option<String>,
    pub invocation_event_type: EventKind,
    pub call_details: CallDetails,
    pub action_data: Option<ActionData>,
}

impl Invocation {
    /// Event classifier.  Total: never fails.
    pub fn event_kind(&self) -> EventKind {
        self.invocation_event_type
    }

    /// `ActionData.Type`, when present.
    pub fn action_type(&self) -> Option<&str> {
        self.action_data.as_ref()?.action_type.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Invocation {
        serde_json::from_value(value).expect("invocation should parse")
    }

    #[test]
    fn empty_object_classifies_as_unknown() {
        let inv = parse(json!({}));
        assert_eq!(inv.event_kind(), EventKind::Unknown);
        assert!(inv.call_details.participants.is_empty());
        assert!(inv.action_data.is_none());
    }

    #[test]
    fn unrecognized_event_type_classifies_as_unknown() {
        let inv = parse(json!({ "InvocationEventType": "CALL_UPDATE_REQUESTED" }));
        assert_eq!(inv.event_kind(), EventKind::Unknown);
    }

    #[test]
    fn known_event_types_classify() {
        for (raw, kind) in [
            ("NEW_INBOUND_CALL", EventKind::NewInboundCall),
            ("NEW_OUTBOUND_CALL", EventKind::NewOutboundCall),
            ("RINGING", EventKind::Ringing),
            ("CALL_ANSWERED", EventKind::CallAnswered),
            ("ACTION_SUCCESSFUL", EventKind::ActionSuccessful),
            ("ACTION_FAILED", EventKind::ActionFailed),
            ("DIGITS_RECEIVED", EventKind::DigitsReceived),
            ("HANGUP", EventKind::Hangup),
        ] {
            let inv = parse(json!({ "InvocationEventType": raw }));
            assert_eq!(inv.event_kind(), kind, "{raw}");
            assert_eq!(kind.as_str(), raw);
        }
    }

    #[test]
    fn parses_participants_and_attributes() {
        let inv = parse(json!({
            "SchemaVersion": "1.0",
            "InvocationEventType": "ACTION_SUCCESSFUL",
            "CallDetails": {
                "TransactionId": "txn-1",
                "SipMediaApplicationId": "sma-1",
                "Participants": [{
                    "CallId": "call-1",
                    "ParticipantTag": "LEG-A",
                    "To": "+17035550122",
                    "From": "+15105550122",
                    "Direction": "Inbound",
                    "StartTimeInMilliseconds": "159700958834234",
                    "Status": "Connected"
                }],
                "TransactionAttributes": { "state": "new" }
            },
            "ActionData": {
                "Type": "RecordAudio",
                "RecordingDestination": {
                    "Type": "S3",
                    "BucketName": "wav-bucket",
                    "Key": "call-1-recording.wav"
                }
            }
        }));

        assert_eq!(inv.call_details.primary_call_id(), Some("call-1"));
        let p = inv.call_details.primary().unwrap();
        assert_eq!(p.direction, Direction::Inbound);
        assert_eq!(p.from.as_deref(), Some("+15105550122"));
        assert_eq!(
            inv.call_details.transaction_attributes.as_ref().unwrap()["state"],
            json!("new")
        );
        assert_eq!(inv.action_type(), Some("RecordAudio"));
        let dest = inv
            .action_data
            .as_ref()
            .and_then(|d| d.recording_destination.as_ref())
            .unwrap();
        assert_eq!(dest.key.as_deref(), Some("call-1-recording.wav"));
        assert_eq!(dest.bucket_name.as_deref(), Some("wav-bucket"));
    }

    #[test]
    fn empty_call_id_is_not_a_primary_call_id() {
        let inv = parse(json!({ "CallDetails": { "Participants": [{ "CallId": "" }] } }));
        assert_eq!(inv.call_details.primary_call_id(), None);
    }

    #[test]
    fn bridged_legs_need_one_of_each_direction() {
        let both = parse(json!({ "CallDetails": { "Participants": [
            { "CallId": "out", "Direction": "Outbound" },
            { "CallId": "in", "Direction": "Inbound" }
        ]}}));
        let (caller, recipient) = both.call_details.bridged_legs().unwrap();
        assert_eq!(caller.call_id, "in");
        assert_eq!(recipient.call_id, "out");

        let inbound_only = parse(json!({ "CallDetails": { "Participants": [
            { "CallId": "in", "Direction": "Inbound" }
        ]}}));
        assert!(inbound_only.call_details.bridged_legs().is_none());

        let two_inbound = parse(json!({ "CallDetails": { "Participants": [
            { "CallId": "a", "Direction": "Inbound" },
            { "CallId": "b", "Direction": "Inbound" },
            { "CallId": "c", "Direction": "Outbound" }
        ]}}));
        assert!(two_inbound.call_details.bridged_legs().is_none());
    }

    #[test]
    fn intent_name_reads_nested_session_state() {
        let inv = parse(json!({ "ActionData": {
            "Type": "StartBotConversation",
            "IntentResult": { "SessionState": { "Intent": { "Name": "FallbackIntent" } } }
        }}));
        let name = inv
            .action_data
            .as_ref()
            .and_then(|d| d.intent_result.as_ref())
            .and_then(IntentResult::intent_name);
        assert_eq!(name, Some("FallbackIntent"));
    }

    #[test]
    fn unknown_direction_does_not_fail_parse() {
        let inv = parse(json!({ "CallDetails": { "Participants": [
            { "CallId": "x", "Direction": "Sideways" }
        ]}}));
        assert_eq!(inv.call_details.participants[0].direction, Direction::Unknown);
    }
}
