//! Application setup and server configuration.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::chat::ErrorBody;
use crate::kernel::ServerDeps;
use crate::server::routes::{chat_handler, health_handler, history_handler, list_schemes_handler};

/// How long `/health` waits on the database by default.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    pub health_timeout: Duration,
}

impl AppState {
    pub fn new(db_pool: PgPool, deps: ServerDeps) -> Self {
        Self {
            db_pool,
            deps: Arc::new(deps),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }
}

/// Panics inside a handler become a 500 with the usual error body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: format!("Internal server error: {}", detail),
        }),
    )
        .into_response()
}

/// Build the Axum application router
///
/// Rate limiting is added separately by `with_rate_limit`, since it keys on the
/// peer address that only exists behind a real listener.
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/:user_id/history", get(history_handler))
        .route("/api/schemes", get(list_schemes_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Per-IP rate limiting, keyed on X-Forwarded-For / X-Real-IP with the peer
/// address as fallback.
pub fn with_rate_limit(router: Router, per_second: u64, burst: u32) -> Result<Router> {
    // One request is replenished every `period` ms
    let period_ms = (1000 / per_second.max(1)).max(1);

    let config = GovernorConfigBuilder::default()
        .per_millisecond(period_ms)
        .burst_size(burst.max(1))
        .use_headers()
        .finish()
        .context("Invalid rate limiter configuration")?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}
