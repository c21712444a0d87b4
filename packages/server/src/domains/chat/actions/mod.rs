//! Chat domain actions
//!
//! Entry points called from the HTTP routes. They take `ServerDeps`, do the
//! work, and return response data or a `ChatError`.

mod handle_chat;
mod history;

pub use handle_chat::handle_chat;
pub use history::{load_history, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
