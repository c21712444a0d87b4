//! Pure OpenAI REST API client
//!
//! A small client for the parts of the OpenAI API the caregiver assistant
//! relies on: Assistants threads/runs and embeddings. No domain logic lives here.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::OpenAIClient;
//!
//! let client = OpenAIClient::from_env()?;
//!
//! let thread = client.create_thread().await?;
//! client.create_message(&thread.id, "How do I apply for respite care?").await?;
//! let run = client.create_run(&thread.id, "asst_123").await?;
//! let run = client.retrieve_run(&thread.id, &run.id).await?;
//!
//! let embedding = client.create_embedding("respite care", "text-embedding-3-small").await?;
//! ```

pub mod assistants;
pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Per-request ceiling so a stalled connection cannot hang a caller.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Header value required by the Assistants v2 endpoints.
const ASSISTANTS_BETA: &str = "assistants=v2";

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    request_timeout: Duration,
}

fn build_http_client(timeout: Duration) -> Client {
    // Building only fails when the TLS backend cannot initialize
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: build_http_client(DEFAULT_REQUEST_TIMEOUT),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, local fakes).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = build_http_client(timeout);
        self.request_timeout = timeout;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    /// Attach the Assistants beta header on top of the usual auth headers.
    pub(crate) fn assistants_request(&self, builder: RequestBuilder) -> RequestBuilder {
        self.authorized(builder).header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http_client
    }

    /// Send a request and decode a JSON body, mapping failures onto `OpenAIError`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> Result<T> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, operation, "OpenAI request failed");
            OpenAIError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, operation, "OpenAI API error");
            return Err(OpenAIError::Api(format!(
                "{} failed ({}): {}",
                operation, status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| OpenAIError::Parse(format!("{}: {}", operation, e)))
    }

    /// Create embedding for text.
    ///
    /// Returns a vector (1536 dimensions for text-embedding-3-small).
    pub async fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let start = std::time::Instant::now();
        let request = types::EmbeddingRequest {
            model: model.to_string(),
            input: text.to_string(),
        };

        let builder = self
            .authorized(self.http_client.post(self.url("embeddings")))
            .json(&request);
        let embed_response: types::EmbeddingResponse =
            self.send_json(builder, "create embedding").await?;

        debug!(
            model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI embedding"
        );

        embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| OpenAIError::Api("No embedding from OpenAI".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test").with_base_url("https://custom.api.com/");

        assert_eq!(client.api_key(), "sk-test");
        assert_eq!(client.base_url(), "https://custom.api.com");
    }

    #[test]
    fn test_requests_are_time_bounded() {
        let client = OpenAIClient::new("sk-test");
        assert_eq!(client.request_timeout(), DEFAULT_REQUEST_TIMEOUT);

        let client = client.with_timeout(Duration::from_secs(5));
        assert_eq!(client.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_url_joins_paths() {
        let client = OpenAIClient::new("sk-test");
        assert_eq!(
            client.url("/threads/t_1/runs"),
            "https://api.openai.com/v1/threads/t_1/runs"
        );
    }
}
