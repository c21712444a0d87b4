use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::error;

use crate::domains::chat::ErrorBody;
use crate::domains::schemes::PersistedScheme;
use crate::server::app::AppState;

pub const DEFAULT_SCHEMES_LIMIT: usize = 20;
pub const MAX_SCHEMES_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SchemesQuery {
    pub limit: Option<usize>,
}

/// GET /api/schemes - most recently discovered AI-sourced schemes
pub async fn list_schemes_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<SchemesQuery>,
) -> Result<Json<Vec<PersistedScheme>>, (StatusCode, Json<ErrorBody>)> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SCHEMES_LIMIT)
        .clamp(1, MAX_SCHEMES_LIMIT);

    state.deps.schemes.recent(limit).await.map(Json).map_err(|e| {
        error!(error = %e, "Failed to list schemes");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: format!("Failed to list schemes: {}", e),
            }),
        )
    })
}
