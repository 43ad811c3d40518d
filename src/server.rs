//! HTTP surface for web chat front-ends.
//!
//! - `POST /api/chat`: `{message, history}` → `{answer}`
//! - `POST /api/contact`: `{email, name?, notes?}` → `{recorded}`
//! - `POST /api/unknown-question`: `{question}` → `{recorded}`
//! - `GET /api/status`: health and configuration summary
//!
//! `history` is passed through untouched; any shape the normalizer
//! understands is accepted.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::core::ChatService;
use crate::notify::{record_unknown_question, record_user_details, Notifier, RecordAck};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Chat orchestrator.
    pub chat: ChatService,
    /// Side-channel for contact details and unanswered questions.
    pub notifier: Arc<dyn Notifier>,
    /// Persona display name.
    pub persona_name: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// New user message.
    #[serde(default)]
    pub message: String,
    /// Prior conversation in any supported shape.
    #[serde(default)]
    pub history: Value,
}

/// Reply of `POST /api/chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    /// Text to display.
    pub answer: String,
}

/// Body of `POST /api/contact`.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    /// Visitor email.
    pub email: String,
    /// Visitor name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `POST /api/unknown-question`.
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    /// The question that went unanswered.
    pub question: String,
}

/// Build the router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/contact", post(contact_handler))
        .route("/api/unknown-question", post(unknown_question_handler))
        .with_state(state)
}

/// Serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let addr = listener.local_addr().context("failed to read bound address")?;
    info!(%addr, persona = %state.persona_name, "chat server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await
        .context("chat server failed")?;

    Ok(())
}

async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "persona": state.persona_name,
        "model": state.chat.model(),
        "notifications": state.notifier.is_enabled(),
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatReply> {
    let answer = state.chat.chat(&request.message, &request.history).await;
    Json(ChatReply { answer })
}

async fn contact_handler(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Json<RecordAck> {
    Json(
        record_user_details(
            state.notifier.as_ref(),
            &request.email,
            request.name.as_deref(),
            request.notes.as_deref(),
        )
        .await,
    )
}

async fn unknown_question_handler(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Json<RecordAck> {
    Json(record_unknown_question(state.notifier.as_ref(), &request.question).await)
}
