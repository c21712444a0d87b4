//! Server dependencies for the chat pipeline (using traits for testability)
//!
//! This is the single dependency container handed to request handlers. All
//! external services sit behind trait objects and are injected through the
//! constructor, so tests can swap in the doubles from `test_dependencies`.

use std::sync::Arc;
use std::time::Duration;

use crate::domains::generation::{GenerationRunner, RunPolicy};
use crate::kernel::{
    BaseAssistant, BaseChatLog, BaseEmbeddingService, BaseResourceStore, BaseSchemeStore,
};

/// Default number of documents retrieved to ground a prompt
pub const DEFAULT_TOP_K: usize = 5;

/// Tunables for one pass of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub top_k: usize,
    pub run_policy: RunPolicy,
}

impl PipelineSettings {
    pub fn new(top_k: usize, run_policy: RunPolicy) -> Self {
        Self { top_k, run_policy }
    }

    /// Millisecond polling so tests never wait on the clock.
    pub fn for_tests() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            run_policy: RunPolicy::new(Duration::from_millis(1), 20),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            run_policy: RunPolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct ServerDeps {
    /// Canonical Resource Store (read-only)
    pub resources: Arc<dyn BaseResourceStore>,
    /// Persisted Scheme Store for AI-sourced findings
    pub schemes: Arc<dyn BaseSchemeStore>,
    /// Append-only Chat Exchange Log
    pub chat_log: Arc<dyn BaseChatLog>,
    pub assistant: Arc<dyn BaseAssistant>,
    pub embedding_service: Arc<dyn BaseEmbeddingService>,
    pub settings: PipelineSettings,
}

impl ServerDeps {
    pub fn new(
        resources: Arc<dyn BaseResourceStore>,
        schemes: Arc<dyn BaseSchemeStore>,
        chat_log: Arc<dyn BaseChatLog>,
        assistant: Arc<dyn BaseAssistant>,
        embedding_service: Arc<dyn BaseEmbeddingService>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            resources,
            schemes,
            chat_log,
            assistant,
            embedding_service,
            settings,
        }
    }

    /// Runner bound to this container's assistant and poll budget
    pub fn generation_runner(&self) -> GenerationRunner {
        GenerationRunner::new(self.assistant.clone(), self.settings.run_policy)
    }
}
