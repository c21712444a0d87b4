//! Chat domain models

pub mod chat_exchange;

pub use chat_exchange::{ChatExchange, ChatRole};
