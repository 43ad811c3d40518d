//! Chat orchestration: request building, provider call, answer extraction.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::request::build_request;
use super::response::try_extract_text;
use crate::providers::GenerationProvider;

/// Relays chat turns to a generation provider on behalf of one persona.
///
/// Cheap to clone; all clones share the provider and the read-only system
/// prompt, so concurrent invocations are independent.
#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn GenerationProvider>,
    system_prompt: Arc<str>,
    model: String,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("provider", &self.provider.name())
            .field("system_prompt_chars", &self.system_prompt.chars().count())
            .field("model", &self.model)
            .finish()
    }
}

impl ChatService {
    /// Create a chat service.
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        system_prompt: impl Into<Arc<str>>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            model: model.into(),
        }
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The persona instruction placed first in every request.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Answer `new_message` given raw history of any shape.
    ///
    /// Always returns text for display. Provider failures become
    /// `An error occurred: ...`; an empty extraction is reported together
    /// with the raw response.
    pub async fn chat(&self, new_message: &str, raw_history: &Value) -> String {
        self.respond(new_message, raw_history).await.into_text()
    }

    /// Same as [`ChatService::chat`], but tells a model reply apart from a
    /// failure report.
    pub async fn respond(&self, new_message: &str, raw_history: &Value) -> ChatOutcome {
        let messages = build_request(&self.system_prompt, raw_history, new_message);
        info!(
            provider = self.provider.name(),
            model = %self.model,
            messages = messages.len(),
            "relaying chat turn"
        );

        let response = match self.provider.generate(&self.model, &messages).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "generation call failed");
                return ChatOutcome::Failed(format!("An error occurred: {e}"));
            }
        };

        let answer = match try_extract_text(&response) {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "provider response could not be decoded");
                return ChatOutcome::Failed(e.diagnostic());
            }
        };
        if answer.trim().is_empty() {
            warn!("provider response carried no text");
            return ChatOutcome::Failed(format!("(no text extracted) {answer:?} {response}"));
        }

        debug!(chars = answer.chars().count(), "answer extracted");
        ChatOutcome::Reply(answer)
    }
}

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Text extracted from the model's response.
    Reply(String),
    /// Provider failure or unusable response, rendered for display.
    Failed(String),
}

impl ChatOutcome {
    /// Whether this is a model reply worth keeping in history.
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply(_))
    }

    /// Display text, whichever the outcome.
    pub fn into_text(self) -> String {
        match self {
            Self::Reply(text) | Self::Failed(text) => text,
        }
    }
}
