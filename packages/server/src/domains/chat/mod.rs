//! Chat domain - the caregiver question/answer entry point
//!
//! Validates the request, drives the resource-discovery pipeline, and keeps an
//! append-only log of each exchange.

pub mod actions;
pub mod data;
pub mod errors;
pub mod models;

pub use actions::{handle_chat, load_history};
pub use data::{ChatRequest, ChatResponse};
pub use errors::{ChatError, ErrorBody, MISSING_FIELDS};
pub use models::{ChatExchange, ChatRole};
