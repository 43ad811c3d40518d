//! Gemini provider implementation using the `generateContent` API.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::{check_http_response, GenerationProvider, Message, ProviderError, Role};

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// `generateContent` request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// Conversation turns in order.
    pub contents: Vec<GeminiContent>,
}

/// One turn in Gemini format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct GeminiContent {
    /// Role: "user" or "model".
    pub role: &'static str,
    /// Content parts.
    pub parts: Vec<GeminiPart>,
}

/// A text part.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct GeminiPart {
    /// Part text.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Gemini `generateContent` provider.
#[derive(Clone)]
pub struct GeminiProvider {
    api_key: Option<String>,
    /// Base URL for the Gemini API.
    #[doc(hidden)]
    pub base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a Gemini provider.
    ///
    /// A missing key is not an error here; calls fail with
    /// [`ProviderError::Unavailable`] instead so the process can still start.
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build configured HTTP client, using defaults");
                reqwest::Client::new()
            });
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        }
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Endpoint URL for a model.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build a Gemini request body from canonical messages.
///
/// Assistant messages are sent with the `model` role.
#[doc(hidden)]
pub fn build_request(messages: &[Message]) -> GeminiRequest {
    let contents = messages
        .iter()
        .map(|msg| GeminiContent {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            },
            parts: vec![GeminiPart {
                text: msg.text.clone(),
            }],
        })
        .collect();

    GeminiRequest { contents }
}

/// Parse a response body into an opaque JSON value.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body is not JSON.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<Value, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate(&self, model: &str, messages: &[Message]) -> Result<Value, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::Unavailable(
                "no Gemini API key configured (set GOOGLE_API_KEY)".to_owned(),
            ));
        };

        let api_request = build_request(messages);

        let response = self
            .client
            .post(self.endpoint(model))
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
