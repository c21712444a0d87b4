//! Candidate schemes - structured records extracted from an assistant reply
//!
//! One type is used end to end: the reply parser produces it, the cross-checker
//! mutates it, the deduplicator filters it, and the HTTP response serializes it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domains::resources::CanonicalResource;

/// Closed set of categories a scheme carries once it has been reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeCategory {
    Financial,
    Medical,
    General,
}

impl SchemeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeCategory::Financial => "Financial",
            SchemeCategory::Medical => "Medical",
            SchemeCategory::General => "General",
        }
    }

    /// Loose keyword-bucket match used while sanitizing parsed replies.
    ///
    /// Returns `None` when the text matches no bucket, so the caller can decide
    /// whether to pass the original value through.
    pub fn from_keywords(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        if ["financial", "finance", "fund", "grant"]
            .iter()
            .any(|k| lower.contains(k))
        {
            Some(SchemeCategory::Financial)
        } else if ["medical", "health", "hospital", "clinic"]
            .iter()
            .any(|k| lower.contains(k))
        {
            Some(SchemeCategory::Medical)
        } else if lower.is_empty() || lower.contains("general") || lower.contains("misc") {
            Some(SchemeCategory::General)
        } else {
            None
        }
    }

    /// Strict closed-set coercion: anything that is not exactly one of the
    /// three names (ignoring case and surrounding space) becomes `General`.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "financial" => SchemeCategory::Financial,
            "medical" => SchemeCategory::Medical,
            _ => SchemeCategory::General,
        }
    }
}

impl std::fmt::Display for SchemeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sanitizer-stage category normalization. Unmatched values pass through trimmed.
pub fn normalize_category(raw: &str) -> String {
    match SchemeCategory::from_keywords(raw) {
        Some(category) => category.as_str().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Deduplication and uniqueness key for a title.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// A support scheme suggested by the assistant, possibly reconciled against
/// the canonical store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScheme {
    pub title: String,
    pub description: String,
    pub eligibility: Vec<String>,
    pub steps: Vec<String>,
    pub link: String,
    pub category: String,
    pub tags: BTreeSet<String>,

    /// Provenance disclaimer, set when no canonical resource matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CandidateScheme {
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }

    /// The reconciled, closed-set category.
    pub fn closed_category(&self) -> SchemeCategory {
        SchemeCategory::coerce(&self.category)
    }

    /// Force `category` into the closed set.
    pub fn close_category(&mut self) {
        self.category = self.closed_category().as_str().to_string();
    }
}

impl From<&CanonicalResource> for CandidateScheme {
    fn from(resource: &CanonicalResource) -> Self {
        let mut scheme = Self {
            title: resource.title.trim().to_string(),
            description: resource.description.trim().to_string(),
            eligibility: Vec::new(),
            steps: Vec::new(),
            link: resource.link.trim().to_string(),
            category: normalize_category(&resource.category),
            tags: resource
                .tags
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            note: None,
        };
        scheme.close_category();
        scheme
    }
}
