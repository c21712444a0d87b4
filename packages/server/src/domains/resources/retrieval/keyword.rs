use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{RetrievalStrategy, Retriever};
use crate::domains::resources::models::RetrievalResult;
use crate::kernel::BaseResourceStore;

/// Case-insensitive keyword match against title, description, category and tags.
pub struct KeywordRetriever {
    resources: Arc<dyn BaseResourceStore>,
}

impl KeywordRetriever {
    pub fn new(resources: Arc<dyn BaseResourceStore>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    fn strategy(&self) -> RetrievalStrategy {
        RetrievalStrategy::Keyword
    }

    async fn retrieve(&self, query: &str, k: usize) -> Vec<RetrievalResult> {
        if query.trim().is_empty() || k == 0 {
            return Vec::new();
        }

        match self.resources.keyword_search(query, k).await {
            Ok(resources) => resources.iter().take(k).map(RetrievalResult::from).collect(),
            Err(e) => {
                warn!(error = %e, "Keyword retrieval failed");
                Vec::new()
            }
        }
    }
}
