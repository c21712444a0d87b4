use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{KeywordRetriever, RetrievalStrategy, Retriever};
use crate::domains::resources::models::RetrievalResult;
use crate::kernel::{BaseEmbeddingService, BaseResourceStore};

/// Cosine-similarity search over precomputed resource embeddings.
pub struct SemanticRetriever {
    resources: Arc<dyn BaseResourceStore>,
    embedding_service: Arc<dyn BaseEmbeddingService>,
}

impl SemanticRetriever {
    /// Construct only if the store has embeddings to search.
    pub async fn connect(
        resources: Arc<dyn BaseResourceStore>,
        embedding_service: Arc<dyn BaseEmbeddingService>,
    ) -> Result<Self> {
        if !resources.has_embeddings().await? {
            anyhow::bail!("no canonical resources have embeddings yet");
        }
        Ok(Self {
            resources,
            embedding_service,
        })
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        let embedding = self.embedding_service.generate(query).await?;
        let matches = self.resources.similarity_search(&embedding, k).await?;
        debug!(
            count = matches.len(),
            top_similarity = matches.first().map(|(_, s)| *s),
            "Semantic search complete"
        );
        Ok(matches
            .iter()
            .take(k)
            .map(|(resource, _)| RetrievalResult::from(resource))
            .collect())
    }
}

#[async_trait]
impl Retriever for SemanticRetriever {
    fn strategy(&self) -> RetrievalStrategy {
        RetrievalStrategy::Semantic
    }

    async fn retrieve(&self, query: &str, k: usize) -> Vec<RetrievalResult> {
        if query.trim().is_empty() || k == 0 {
            return Vec::new();
        }

        match self.search(query, k).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(error = %e, "Semantic search failed, retrying with keyword search");
                KeywordRetriever::new(self.resources.clone())
                    .retrieve(query, k)
                    .await
            }
        }
    }
}
