//! Provider request assembly.

use serde_json::Value;

use super::history::normalize;
use crate::providers::Message;

/// Compose the ordered message list for one generation call.
///
/// Order is fixed: the system prompt as a user message, then each history
/// turn's non-empty user and assistant texts in arrival order, then the new
/// message. The first and last messages are always present, even when empty.
pub fn build_request(system_prompt: &str, raw_history: &Value, new_message: &str) -> Vec<Message> {
    let turns = normalize(raw_history);

    let mut messages = Vec::with_capacity(turns.len().saturating_mul(2).saturating_add(2));
    messages.push(Message::user(system_prompt));

    for turn in turns {
        if !turn.user_text.is_empty() {
            messages.push(Message::user(turn.user_text));
        }
        if !turn.assistant_text.is_empty() {
            messages.push(Message::assistant(turn.assistant_text));
        }
    }

    messages.push(Message::user(new_message));
    messages
}
