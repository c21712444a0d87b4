//! Retrieved documents handed to prompt composition and cross-checking.

use serde::{Deserialize, Serialize};

use super::resource::CanonicalResource;

/// A retrieved document: searchable text plus the resource fields the rest of
/// the pipeline needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub content: String,
    pub metadata: RetrievalMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetadata {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<&CanonicalResource> for RetrievalResult {
    fn from(resource: &CanonicalResource) -> Self {
        let content = if resource.description.is_empty() {
            resource.title.clone()
        } else {
            format!("{}\n{}", resource.title, resource.description)
        };

        Self {
            content,
            metadata: RetrievalMetadata {
                title: resource.title.clone(),
                link: resource.link.clone(),
                category: Some(resource.category.clone()),
                tags: Some(resource.tags.clone()),
                source: Some(resource.source.clone()).filter(|s| !s.is_empty()),
            },
        }
    }
}

impl RetrievalResult {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn link(&self) -> &str {
        &self.metadata.link
    }
}
