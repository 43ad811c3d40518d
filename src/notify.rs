//! Best-effort notification side-channel.
//!
//! Used to record visitor contact details and questions the assistant could
//! not answer. Delivery is fire-and-forget: [`push`] logs failures and never
//! returns them, so nothing on the chat path depends on the outcome.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Secrets;
use crate::providers::sanitize_http_error_body;

/// Pushover message endpoint.
pub const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// Delivery timeout for a single notification.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Name recorded when a visitor gives none.
pub const DEFAULT_CONTACT_NAME: &str = "Name not provided";

/// Notes recorded when a visitor gives none.
pub const DEFAULT_CONTACT_NOTES: &str = "not provided";

/// Notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP transport failure.
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Service responded with an error status.
    #[error("notification service returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if delivery fails.
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;

    /// Whether messages actually leave the process.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Notifier used when no credentials are configured. Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Pushover notifier.
#[derive(Clone)]
pub struct PushoverNotifier {
    user: String,
    token: String,
    /// Endpoint URL.
    #[doc(hidden)]
    pub url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for PushoverNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverNotifier")
            .field("user", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .finish()
    }
}

impl PushoverNotifier {
    /// Create a notifier posting to [`PUSHOVER_URL`].
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_url(user, token, PUSHOVER_URL)
    }

    /// Create a notifier posting to a custom endpoint.
    pub fn with_url(user: impl Into<String>, token: impl Into<String>, url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build notifier HTTP client, using defaults");
                reqwest::Client::new()
            });
        Self {
            user: user.into(),
            token: token.into(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let form = [
            ("user", self.user.as_str()),
            ("token", self.token.as_str()),
            ("message", message),
        ];
        let response = self.client.post(&self.url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::HttpStatus {
                status: status.as_u16(),
                body: sanitize_http_error_body(&body),
            });
        }
        Ok(())
    }
}

/// Pick a notifier for the configured secrets.
///
/// Missing Pushover credentials select [`NoopNotifier`]; that is not an error.
pub fn notifier_from_secrets(secrets: &Secrets) -> Arc<dyn Notifier> {
    match secrets.pushover() {
        Some((user, token)) => Arc::new(PushoverNotifier::new(user, token)),
        None => {
            info!("Pushover credentials missing, notifications will be logged only");
            Arc::new(NoopNotifier)
        }
    }
}

/// Send a message, logging instead of returning any failure.
pub async fn push(notifier: &dyn Notifier, message: &str) {
    info!(message, "push");
    if !notifier.is_enabled() {
        return;
    }
    if let Err(e) = notifier.notify(message).await {
        warn!(error = %e, "notification delivery failed");
    }
}

/// Acknowledgement returned by the record operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAck {
    /// Always `"ok"`.
    pub recorded: String,
}

impl RecordAck {
    fn ok() -> Self {
        Self {
            recorded: "ok".to_owned(),
        }
    }
}

/// Record a visitor's contact details.
pub async fn record_user_details(
    notifier: &dyn Notifier,
    email: &str,
    name: Option<&str>,
    notes: Option<&str>,
) -> RecordAck {
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_CONTACT_NAME);
    let notes = notes.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_CONTACT_NOTES);
    push(
        notifier,
        &format!("Recording interest from {name} with email {email} and notes {notes}"),
    )
    .await;
    RecordAck::ok()
}

/// Record a question the assistant could not answer.
pub async fn record_unknown_question(notifier: &dyn Notifier, question: &str) -> RecordAck {
    push(notifier, &format!("Recording unknown question: {question}")).await;
    RecordAck::ok()
}
