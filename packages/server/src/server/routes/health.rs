use std::time::{Duration, Instant};

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::kernel::PipelineSettings;
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: DatabaseHealth,
    connection_pool: ConnectionPoolHealth,
    pipeline: PipelineBudget,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: &'static str,
    latency_ms: u64,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct ConnectionPoolHealth {
    size: u32,
    idle_connections: usize,
    max_connections: u32,
}

/// The retrieval width and generation budget a chat request runs under.
#[derive(Serialize)]
pub struct PipelineBudget {
    top_k: usize,
    poll_interval_ms: u64,
    max_polls: u32,
    max_wait_ms: u64,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl From<&PipelineSettings> for PipelineBudget {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            top_k: settings.top_k,
            poll_interval_ms: millis(settings.run_policy.poll_interval),
            max_polls: settings.run_policy.max_polls,
            max_wait_ms: millis(settings.run_policy.max_wait),
        }
    }
}

async fn check_database(state: &AppState) -> DatabaseHealth {
    let budget = state.health_timeout;
    let started = Instant::now();

    let error = match tokio::time::timeout(
        budget,
        sqlx::query("SELECT 1").execute(&state.db_pool),
    )
    .await
    {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("Query failed: {}", e)),
        Err(_) => Some(format!("No answer within {}ms", millis(budget))),
    };

    if let Some(error) = &error {
        tracing::warn!(error = %error, "Health check could not reach the database");
    }

    DatabaseHealth {
        status: if error.is_none() { "ok" } else { "error" },
        latency_ms: millis(started.elapsed()),
        timeout_ms: millis(budget),
        error,
    }
}

/// Health check endpoint
///
/// 200 when the database answers `SELECT 1` inside the configured budget, 503
/// otherwise. Pool usage and the pipeline budget are reported either way.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state).await;

    let connection_pool = ConnectionPoolHealth {
        size: state.db_pool.size(),
        idle_connections: state.db_pool.num_idle(),
        max_connections: state.db_pool.options().get_max_connections(),
    };

    let (status_code, status) = if database.error.is_none() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            connection_pool,
            pipeline: PipelineBudget::from(&state.deps.settings),
        }),
    )
}
