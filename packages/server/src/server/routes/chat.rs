use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::domains::chat::{
    handle_chat, load_history, ChatError, ChatExchange, ChatRequest, ChatResponse,
};
use crate::server::app::AppState;

/// POST /api/chat
///
/// A body that is not a JSON object with the expected fields counts as a
/// missing prompt/userId.
pub async fn chat_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "Rejected chat request body");
            return Err(ChatError::missing_fields());
        }
    };

    let response = handle_chat(request, &state.deps).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// GET /api/chat/:user_id/history
pub async fn history_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatExchange>>, ChatError> {
    let history = load_history(&user_id, query.limit, &state.deps).await?;
    Ok(Json(history))
}
