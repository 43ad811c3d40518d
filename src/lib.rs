//! persona-relay, a persona chat front-end.
//!
//! Loads a persona's documents into a system prompt and relays multi-turn
//! chat to Gemini. The interesting part lives in [`core`]: history
//! normalization on the way in and answer extraction on the way out, both
//! tolerant of whatever shapes the UI and the API happen to use.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod core;
pub mod logging;
pub mod notify;
pub mod persona;
pub mod providers;
pub mod server;
