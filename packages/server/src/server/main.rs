// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use careguide_core::kernel::{
    OpenAIAssistant, OpenAIEmbeddingService, PgChatLog, PgResourceStore, PgSchemeStore,
    ServerDeps,
};
use careguide_core::server::{build_app, with_rate_limit, AppState};
use careguide_core::Config;
use openai_client::OpenAIClient;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,careguide_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Caregiver Resource Guide API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // One OpenAI client, shared by the assistant and embedding adapters
    let mut openai = OpenAIClient::new(config.openai_api_key.clone())
        .with_timeout(config.openai_request_timeout);
    if let Some(base_url) = &config.openai_base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    let openai = Arc::new(openai);

    let deps = ServerDeps::new(
        Arc::new(PgResourceStore::new(pool.clone())),
        Arc::new(PgSchemeStore::new(pool.clone())),
        Arc::new(PgChatLog::new(pool.clone())),
        Arc::new(OpenAIAssistant::new(
            openai.clone(),
            config.openai_assistant_id.clone(),
        )),
        Arc::new(OpenAIEmbeddingService::new(
            openai,
            config.embedding_model.clone(),
        )),
        config.pipeline_settings(),
    );

    // Build application
    let state = AppState::new(pool, deps).with_health_timeout(config.health_check_timeout);
    let app = build_app(state);
    let app = with_rate_limit(app, config.rate_limit_per_second, config.rate_limit_burst)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Chat endpoint: http://localhost:{}/api/chat", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
