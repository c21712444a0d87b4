// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Pipeline logic (retrieve, parse, reconcile, persist) lives in the domains and
// is written against these traits so every collaborator can be swapped in tests.
//
// Naming convention: Base* for trait names (e.g., BaseAssistant, BaseEmbeddingService)

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::chat::models::{ChatExchange, ChatRole};
use crate::domains::resources::CanonicalResource;
use crate::domains::schemes::models::{CandidateScheme, PersistedScheme, SchemeUpsert};

// =============================================================================
// Generation Service Trait (Infrastructure - hosted assistant threads/runs)
// =============================================================================

/// Provider-neutral run status, as seen by the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Queued or in progress; poll again later
    Pending,
    Completed,
    /// Terminal without a usable result (failed, cancelled, expired, ...)
    Failed { status: String, reason: Option<String> },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Pending)
    }
}

/// A message read back from a thread, reduced to its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantMessage {
    pub role: String,
    pub text: String,
    pub created_at: i64,
}

#[async_trait]
pub trait BaseAssistant: Send + Sync {
    /// Open a new conversation thread, returning its id
    async fn create_thread(&self) -> Result<String>;

    /// Append a user-authored message to a thread
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<()>;

    /// Start an assistant run on a thread, returning the run id
    async fn start_run(&self, thread_id: &str) -> Result<String>;

    /// Fetch the current status of a run
    async fn run_state(&self, thread_id: &str, run_id: &str) -> Result<RunState>;

    /// All messages currently on the thread (any order)
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<AssistantMessage>>;
}

// =============================================================================
// Embedding Service Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseEmbeddingService: Send + Sync {
    /// Generate embedding for text (returns 1536-dimensional vector)
    async fn generate(&self, text: &str) -> Result<Vec<f32>>;
}

// =============================================================================
// Canonical Resource Store Trait (read-only)
// =============================================================================

#[async_trait]
pub trait BaseResourceStore: Send + Sync {
    /// Whether any resources carry precomputed embeddings
    async fn has_embeddings(&self) -> Result<bool>;

    /// Nearest resources to the query vector, most similar first
    async fn similarity_search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<(CanonicalResource, f32)>>;

    /// Case-insensitive keyword match over title, description, category and tags
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<CanonicalResource>>;

    async fn find_by_link(&self, link: &str) -> Result<Option<CanonicalResource>>;

    /// Case-insensitive exact title match
    async fn find_by_title(&self, title: &str) -> Result<Option<CanonicalResource>>;
}

// =============================================================================
// Persisted Scheme Store Trait
// =============================================================================

#[async_trait]
pub trait BaseSchemeStore: Send + Sync {
    async fn find_by_title(&self, title: &str) -> Result<Option<PersistedScheme>>;

    /// Create the scheme, or return the existing one with the same normalized
    /// title. Implementations must make this atomic per normalized title.
    async fn upsert(&self, candidate: &CandidateScheme) -> Result<SchemeUpsert>;

    async fn recent(&self, limit: usize) -> Result<Vec<PersistedScheme>>;
}

// =============================================================================
// Chat Exchange Log Trait (append-only)
// =============================================================================

#[async_trait]
pub trait BaseChatLog: Send + Sync {
    async fn append(&self, user_id: &str, role: ChatRole, content: &str) -> Result<ChatExchange>;

    /// Latest `limit` exchanges for the user, oldest first
    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatExchange>>;
}
