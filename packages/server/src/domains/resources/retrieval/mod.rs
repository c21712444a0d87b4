//! Retrieval of trusted resources to ground a generation request.
//!
//! Two strategies implement one `Retriever` interface. `build_retriever` checks
//! the semantic backend on every call and falls back to keyword search when it
//! cannot be constructed. Retrieval never fails a request: every error
//! degrades to the fallback strategy or to an empty list.

pub mod keyword;
pub mod semantic;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::models::RetrievalResult;
use crate::kernel::{BaseEmbeddingService, BaseResourceStore};

pub use keyword::KeywordRetriever;
pub use semantic::SemanticRetriever;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStrategy {
    Semantic,
    Keyword,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    fn strategy(&self) -> RetrievalStrategy;

    /// Up to `k` relevant documents, best first. Never fails.
    async fn retrieve(&self, query: &str, k: usize) -> Vec<RetrievalResult>;
}

/// Pick the retrieval strategy for this request.
pub async fn build_retriever(
    resources: Arc<dyn BaseResourceStore>,
    embedding_service: Arc<dyn BaseEmbeddingService>,
) -> Box<dyn Retriever> {
    match SemanticRetriever::connect(resources.clone(), embedding_service).await {
        Ok(semantic) => {
            debug!("Using semantic retrieval");
            Box::new(semantic)
        }
        Err(e) => {
            warn!(error = %e, "Semantic retrieval unavailable, falling back to keyword search");
            Box::new(KeywordRetriever::new(resources))
        }
    }
}

/// Build a retriever and run one query through it.
pub async fn retrieve_documents(
    resources: Arc<dyn BaseResourceStore>,
    embedding_service: Arc<dyn BaseEmbeddingService>,
    query: &str,
    k: usize,
) -> Vec<RetrievalResult> {
    let retriever = build_retriever(resources, embedding_service).await;
    let docs = retriever.retrieve(query, k).await;
    debug!(
        strategy = ?retriever.strategy(),
        count = docs.len(),
        "Retrieved grounding documents"
    );
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{
        resource_fixture, InMemoryResourceStore, MockEmbeddingService,
    };

    #[tokio::test]
    async fn test_factory_prefers_semantic_when_embeddings_exist() {
        let store = InMemoryResourceStore::new().with_embedded_resource(
            resource_fixture("Respite Care", "https://example.gov/respite", "Medical", &[]),
            vec![1.0, 0.0],
        );
        let retriever = build_retriever(
            Arc::new(store),
            Arc::new(MockEmbeddingService::new(vec![1.0, 0.0])),
        )
        .await;

        assert_eq!(retriever.strategy(), RetrievalStrategy::Semantic);
    }

    #[tokio::test]
    async fn test_factory_falls_back_without_embeddings() {
        let store = InMemoryResourceStore::new().with_resource(resource_fixture(
            "Respite Care",
            "https://example.gov/respite",
            "Medical",
            &[],
        ));
        let retriever = build_retriever(
            Arc::new(store),
            Arc::new(MockEmbeddingService::new(vec![1.0, 0.0])),
        )
        .await;

        assert_eq!(retriever.strategy(), RetrievalStrategy::Keyword);
        let docs = retriever.retrieve("respite", 5).await;
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_degrades_to_empty() {
        let docs = retrieve_documents(
            Arc::new(InMemoryResourceStore::new().failing()),
            Arc::new(MockEmbeddingService::failing()),
            "anything",
            5,
        )
        .await;

        assert!(docs.is_empty());
    }
}
