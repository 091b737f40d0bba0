//! Reply envelope returned for every invocation.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::invocation::TransactionAttributes;

/// Literal schema version carried by every reply.
pub const SCHEMA_VERSION: &str = "1.0";

/// Transaction-attribute key holding the call's state tag.
pub const STATE_KEY: &str = "state";

/// The one structured answer produced per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    pub schema_version: String,
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_attributes: Option<TransactionAttributes>,
}

impl Response {
    /// Terminal / no-op reply: no actions and no transaction attributes.
    pub fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            actions: Vec::new(),
            transaction_attributes: None,
        }
    }

    /// Reply carrying `actions` and a fresh attribute bag holding only
    /// `state`.  Prior attributes are never merged in.
    pub fn with_state(actions: Vec<Action>, state: &str) -> Self {
        let mut attributes = TransactionAttributes::new();
        attributes.insert(
            STATE_KEY.to_string(),
            serde_json::Value::String(state.to_string()),
        );
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            actions,
            transaction_attributes: Some(attributes),
        }
    }

    /// The `state` attribute of this reply, if any.
    pub fn state(&self) -> Option<&str> {
        self.transaction_attributes
            .as_ref()?
            .get(STATE_KEY)?
            .as_str()
    }

    /// `Type` tags of the actions, in order.
    pub fn action_types(&self) -> Vec<&'static str> {
        self.actions.iter().map(Action::type_name).collect()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::empty()
    }
}
