//! OpenAI-backed implementations of the generation and embedding traits.
//!
//! Both wrap a shared `OpenAIClient` handed in by the caller; nothing here
//! builds its own client.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{OpenAIClient, RunStatus};

use crate::kernel::{AssistantMessage, BaseAssistant, BaseEmbeddingService, RunState};

/// Default embedding model; must match the dimension of `canonical_resources.embedding`.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Hosted assistant reached through the Assistants threads/runs API.
pub struct OpenAIAssistant {
    client: Arc<OpenAIClient>,
    assistant_id: String,
}

impl OpenAIAssistant {
    pub fn new(client: Arc<OpenAIClient>, assistant_id: impl Into<String>) -> Self {
        Self {
            client,
            assistant_id: assistant_id.into(),
        }
    }
}

/// Map the SDK's run shape onto the provider-neutral one.
fn to_run_state(status: RunStatus, reason: Option<String>) -> RunState {
    match status {
        RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling => RunState::Pending,
        RunStatus::Completed => RunState::Completed,
        other => RunState::Failed {
            status: other.to_string(),
            reason,
        },
    }
}

#[async_trait]
impl BaseAssistant for OpenAIAssistant {
    async fn create_thread(&self) -> Result<String> {
        Ok(self.client.create_thread().await?.id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<()> {
        self.client.create_message(thread_id, content).await?;
        Ok(())
    }

    async fn start_run(&self, thread_id: &str) -> Result<String> {
        Ok(self.client.create_run(thread_id, &self.assistant_id).await?.id)
    }

    async fn run_state(&self, thread_id: &str, run_id: &str) -> Result<RunState> {
        let run = self.client.retrieve_run(thread_id, run_id).await?;
        let reason = run.last_error.map(|e| format!("{}: {}", e.code, e.message));
        Ok(to_run_state(run.status, reason))
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<AssistantMessage>> {
        let messages = self.client.list_messages(thread_id).await?;
        Ok(messages
            .into_iter()
            .map(|m| AssistantMessage {
                text: m.text(),
                role: m.role,
                created_at: m.created_at,
            })
            .collect())
    }
}

/// Embedding service using OpenAI embeddings
pub struct OpenAIEmbeddingService {
    client: Arc<OpenAIClient>,
    model: String,
}

impl OpenAIEmbeddingService {
    pub fn new(client: Arc<OpenAIClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl BaseEmbeddingService for OpenAIEmbeddingService {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.client.create_embedding(text, &self.model).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_mapping() {
        assert_eq!(to_run_state(RunStatus::Queued, None), RunState::Pending);
        assert_eq!(to_run_state(RunStatus::Cancelling, None), RunState::Pending);
        assert_eq!(to_run_state(RunStatus::Completed, None), RunState::Completed);
        assert_eq!(
            to_run_state(RunStatus::Expired, Some("server_error: boom".into())),
            RunState::Failed {
                status: "expired".into(),
                reason: Some("server_error: boom".into()),
            }
        );
        assert!(to_run_state(RunStatus::RequiresAction, None).is_terminal());
    }
}
