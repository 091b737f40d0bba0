//! Call state tags and the state resolver.
//!
//! The handler keeps no session store: the state tag travels in the reply's
//! `TransactionAttributes` and comes back on the next invocation.
//! [`CallState`] is the closed set of tags any flow writes; [`ResolvedState`]
//! is what the resolver reads back, including first contact and tags this
//! build does not recognize.

use crate::protocol::{CallDetails, STATE_KEY};

// ---------------------------------------------------------------------------
// CallState
// ---------------------------------------------------------------------------

/// State tags written to `TransactionAttributes.state`.
///
/// ```text
/// record:      new ─▶ beeping ─▶ recording ─▶ playing ─▶ finishing
/// transcribe:  new ─▶ beeping ─▶ recording ─▶ transcribing ─▶ playing ─▶ finishing
/// bot:         conversing ─▶ conversing | finishing
/// bridge:      collecting ─▶ bridging ─▶ connected
/// call_back:   finishing
/// play:        finishing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    New,
    Beeping,
    Recording,
    Transcribing,
    Playing,
    Finishing,
    Conversing,
    Collecting,
    Bridging,
    Connected,
}

impl CallState {
    pub const ALL: [CallState; 10] = [
        CallState::New,
        CallState::Beeping,
        CallState::Recording,
        CallState::Transcribing,
        CallState::Playing,
        CallState::Finishing,
        CallState::Conversing,
        CallState::Collecting,
        CallState::Bridging,
        CallState::Connected,
    ];

    /// Tag as written on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            CallState::New => "new",
            CallState::Beeping => "beeping",
            CallState::Recording => "recording",
            CallState::Transcribing => "transcribing",
            CallState::Playing => "playing",
            CallState::Finishing => "finishing",
            CallState::Conversing => "conversing",
            CallState::Collecting => "collecting",
            CallState::Bridging => "bridging",
            CallState::Connected => "connected",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == tag)
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResolvedState
// ---------------------------------------------------------------------------

/// The state an invocation arrives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedState {
    /// No `state` attribute: first contact.
    Initial,
    Known(CallState),
    /// A `state` attribute that is not a known tag (or not a string).
    /// Terminal for every event.
    Unrecognized(String),
}

impl ResolvedState {
    /// State resolver.  Total: absence is [`ResolvedState::Initial`].
    pub fn resolve(details: &CallDetails) -> Self {
        let Some(value) = details
            .transaction_attributes
            .as_ref()
            .and_then(|attrs| attrs.get(STATE_KEY))
        else {
            return ResolvedState::Initial;
        };

        match value.as_str() {
            Some(tag) => CallState::from_tag(tag)
                .map(ResolvedState::Known)
                .unwrap_or_else(|| ResolvedState::Unrecognized(tag.to_string())),
            None if value.is_null() => ResolvedState::Initial,
            None => ResolvedState::Unrecognized(value.to_string()),
        }
    }

    pub fn known(&self) -> Option<CallState> {
        match self {
            ResolvedState::Known(state) => Some(*state),
            _ => None,
        }
    }

    /// Label for logs.
    pub fn label(&self) -> &str {
        match self {
            ResolvedState::Initial => "INITIAL",
            ResolvedState::Known(state) => state.as_str(),
            ResolvedState::Unrecognized(tag) => tag,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TransactionAttributes;
    use serde_json::json;

    fn details_with(attrs: Option<serde_json::Value>) -> CallDetails {
        CallDetails {
            transaction_attributes: attrs.map(|v| {
                serde_json::from_value::<TransactionAttributes>(v).expect("attribute map")
            }),
            ..CallDetails::default()
        }
    }

    #[test]
    fn absent_attributes_resolve_to_initial() {
        assert_eq!(ResolvedState::resolve(&details_with(None)), ResolvedState::Initial);
    }

    #[test]
    fn attributes_without_state_resolve_to_initial() {
        let details = details_with(Some(json!({ "key1": "val1*" })));
        assert_eq!(ResolvedState::resolve(&details), ResolvedState::Initial);
    }

    #[test]
    fn null_state_resolves_to_initial() {
        let details = details_with(Some(json!({ "state": null })));
        assert_eq!(ResolvedState::resolve(&details), ResolvedState::Initial);
    }

    #[test]
    fn known_tags_resolve() {
        for state in CallState::ALL {
            let details = details_with(Some(json!({ "state": state.as_str() })));
            assert_eq!(ResolvedState::resolve(&details), ResolvedState::Known(state));
        }
    }

    #[test]
    fn unknown_tag_resolves_without_error() {
        let details = details_with(Some(json!({ "state": "dancing" })));
        let resolved = ResolvedState::resolve(&details);
        assert_eq!(resolved, ResolvedState::Unrecognized("dancing".into()));
        assert_eq!(resolved.known(), None);
        assert_eq!(resolved.label(), "dancing");
    }

    #[test]
    fn non_string_tag_is_unrecognized() {
        let details = details_with(Some(json!({ "state": 7 })));
        assert_eq!(
            ResolvedState::resolve(&details),
            ResolvedState::Unrecognized("7".into())
        );
    }
}
