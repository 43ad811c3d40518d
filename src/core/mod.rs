//! Conversation adapter core.
//!
//! Pure functions that absorb shape variability on both sides of a
//! generation call:
//! - [`history`]: raw UI history → ordered [`history::Turn`]s
//! - [`request`]: system prompt + turns + new message → provider messages
//! - [`response`]: opaque provider response → answer text
//!
//! [`chat::ChatService`] composes them around a
//! [`GenerationProvider`](crate::providers::GenerationProvider) call.

pub mod chat;
pub mod history;
pub mod request;
pub mod response;

pub use chat::{ChatOutcome, ChatService};
pub use history::{normalize, Turn};
pub use request::build_request;
pub use response::{extract_text, try_extract_text};
