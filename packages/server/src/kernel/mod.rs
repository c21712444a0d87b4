//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod openai;
pub mod stores;
pub mod test_dependencies;
pub mod traits;

pub use deps::{PipelineSettings, ServerDeps, DEFAULT_TOP_K};
pub use openai::{OpenAIAssistant, OpenAIEmbeddingService, DEFAULT_EMBEDDING_MODEL};
pub use stores::{PgChatLog, PgResourceStore, PgSchemeStore};
pub use test_dependencies::TestDependencies;
pub use traits::*;
