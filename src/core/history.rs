//! Conversation history normalization.
//!
//! Chat front-ends hand over history in whatever shape they happen to use:
//! `[user, assistant]` pairs, `{"role", "content"}` records, `{"sender",
//! "message"}` records, bare strings. Each raw element is first decoded into a
//! [`RawHistoryEntry`] and only then turned into a canonical [`Turn`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized exchange unit.
///
/// Both fields are plain strings; a missing or `null` side is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Text the user sent.
    pub user_text: String,
    /// Text the assistant replied with.
    pub assistant_text: String,
}

impl Turn {
    /// Build a turn from both sides.
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
        }
    }

    /// Turn with only the user side populated.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(text, "")
    }

    /// Turn with only the assistant side populated.
    pub fn from_assistant(text: impl Into<String>) -> Self {
        Self::new("", text)
    }

    /// Whether neither side carries text.
    pub fn is_empty(&self) -> bool {
        self.user_text.is_empty() && self.assistant_text.is_empty()
    }

    /// Encode as a `[user, assistant]` pair, the shape [`normalize`] reads back
    /// unchanged.
    pub fn to_pair(&self) -> Value {
        Value::Array(vec![
            Value::String(self.user_text.clone()),
            Value::String(self.assistant_text.clone()),
        ])
    }
}

/// A raw history element, classified by shape.
///
/// Variants are listed in dispatch priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum RawHistoryEntry<'a> {
    /// Ordered sequence; the first two elements are user then assistant.
    Sequence(&'a [Value]),
    /// `{"user": .., "assistant": ..}`.
    UserAssistant {
        /// User side.
        user: &'a Value,
        /// Assistant side.
        assistant: &'a Value,
    },
    /// `{"sender": .., "message": ..}`.
    SenderMessage {
        /// Who sent the message; only `"user"` is special.
        sender: &'a Value,
        /// Message body.
        message: &'a Value,
    },
    /// `{"role": .., "content": ..}`.
    RoleContent {
        /// `"user"`, `"assistant"` or `"model"`; anything else is dropped.
        role: &'a Value,
        /// Message body.
        content: &'a Value,
    },
    /// Any other mapping. Only the first two values in iteration order are
    /// kept, so the result is best-effort.
    Mapping {
        /// First value, taken as user text.
        first: Option<&'a Value>,
        /// Second value, taken as assistant text.
        second: Option<&'a Value>,
    },
    /// Absent entry.
    Null,
    /// String, number or bool.
    Scalar(&'a Value),
}

impl<'a> RawHistoryEntry<'a> {
    /// Classify a raw history element.
    pub fn decode(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => {
                if let (Some(user), Some(assistant)) = (map.get("user"), map.get("assistant")) {
                    Self::UserAssistant { user, assistant }
                } else if let (Some(sender), Some(message)) =
                    (map.get("sender"), map.get("message"))
                {
                    Self::SenderMessage { sender, message }
                } else if let (Some(role), Some(content)) = (map.get("role"), map.get("content"))
                {
                    Self::RoleContent { role, content }
                } else {
                    let mut values = map.values();
                    Self::Mapping {
                        first: values.next(),
                        second: values.next(),
                    }
                }
            }
            Value::Null => Self::Null,
            other => Self::Scalar(other),
        }
    }

    /// Map the classified entry onto a [`Turn`].
    pub fn into_turn(self) -> Turn {
        match self {
            Self::Sequence(items) => Turn::new(
                items.first().map(stringify).unwrap_or_default(),
                items.get(1).map(stringify).unwrap_or_default(),
            ),
            Self::UserAssistant { user, assistant } => {
                Turn::new(stringify(user), stringify(assistant))
            }
            Self::SenderMessage { sender, message } => {
                if sender.as_str() == Some("user") {
                    Turn::from_user(stringify(message))
                } else {
                    Turn::from_assistant(stringify(message))
                }
            }
            Self::RoleContent { role, content } => match role.as_str() {
                Some("user") => Turn::from_user(stringify(content)),
                Some("assistant" | "model") => Turn::from_assistant(stringify(content)),
                _ => Turn::default(),
            },
            Self::Mapping { first, second } => Turn::new(
                first.map(stringify).unwrap_or_default(),
                second.map(stringify).unwrap_or_default(),
            ),
            Self::Null => Turn::default(),
            Self::Scalar(value) => Turn::from_user(stringify(value)),
        }
    }
}

/// Normalize raw history into ordered turns.
///
/// Never fails. `null` yields no turns; an array yields one turn per element
/// in order; any other value is treated as a single-element history.
pub fn normalize(raw_history: &Value) -> Vec<Turn> {
    match raw_history {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(|item| RawHistoryEntry::decode(item).into_turn())
            .collect(),
        single => vec![RawHistoryEntry::decode(single).into_turn()],
    }
}

/// Render a JSON value as display text.
///
/// Strings are taken verbatim and `null` becomes the empty string; everything
/// else uses its compact JSON form.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
