//! Chat history action - read-only view over the exchange log

use crate::domains::chat::errors::ChatError;
use crate::domains::chat::models::ChatExchange;
use crate::kernel::ServerDeps;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 200;

/// A user's latest exchanges, oldest first.
pub async fn load_history(
    user_id: &str,
    limit: Option<usize>,
    deps: &ServerDeps,
) -> Result<Vec<ChatExchange>, ChatError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ChatError::Validation("Missing userId".to_string()));
    }

    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    deps.chat_log
        .history(user_id, limit)
        .await
        .map_err(|e| ChatError::Internal(format!("Failed to load chat history: {}", e)))
}
