use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::generation::RunPolicy;
use crate::kernel::{PipelineSettings, DEFAULT_EMBEDDING_MODEL, DEFAULT_TOP_K};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_assistant_id: String,
    pub openai_base_url: Option<String>,
    pub embedding_model: String,
    pub retrieval_top_k: usize,
    pub generation_poll_interval: Duration,
    pub generation_max_polls: u32,
    pub openai_request_timeout: Duration,
    pub health_check_timeout: Duration,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 8080)?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_assistant_id: env::var("OPENAI_ASSISTANT_ID")
                .context("OPENAI_ASSISTANT_ID must be set")?,
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|s| !s.is_empty()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            retrieval_top_k: parse_or("RETRIEVAL_TOP_K", DEFAULT_TOP_K)?,
            generation_poll_interval: Duration::from_millis(parse_or(
                "GENERATION_POLL_INTERVAL_MS",
                1000,
            )?),
            generation_max_polls: parse_or("GENERATION_MAX_POLLS", 60)?,
            openai_request_timeout: Duration::from_secs(parse_or(
                "OPENAI_REQUEST_TIMEOUT_SECS",
                60,
            )?),
            health_check_timeout: Duration::from_millis(parse_or(
                "HEALTH_CHECK_TIMEOUT_MS",
                5000,
            )?),
            rate_limit_per_second: parse_or("RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_or("RATE_LIMIT_BURST", 20)?,
        })
    }

    /// Pipeline tunables derived from this configuration
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings::new(
            self.retrieval_top_k.max(1),
            RunPolicy::new(self.generation_poll_interval, self.generation_max_polls.max(1)),
        )
    }
}
