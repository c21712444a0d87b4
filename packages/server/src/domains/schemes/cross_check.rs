//! Cross-checking candidate schemes against the canonical resource store
//!
//! Reads only. A hit lends the candidate its trusted link, tags and (when the
//! AI wording is not a usable title) its title. A miss marks the candidate as
//! unverified. Either way the category leaves here in the closed set.

use anyhow::Result;
use tracing::debug;
use url::Url;

use super::models::CandidateScheme;
use crate::domains::resources::{CanonicalResource, RetrievalResult};
use crate::kernel::BaseResourceStore;

/// Disclaimer attached to candidates with no canonical match.
pub const UNVERIFIED_NOTE: &str =
    "AI-generated suggestion. Not yet verified against trusted resources.";

/// Titles longer than this read as sentences, not names.
const MAX_TITLE_LEN: usize = 80;

const CONVERSATIONAL_PHRASES: &[&str] = &["wonderful", "seeking", "deserve", "ensure", "help"];

/// A candidate after reconciliation, plus the canonical record it matched.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub scheme: CandidateScheme,
    pub canonical: Option<CanonicalResource>,
}

impl Reconciled {
    pub fn is_verified(&self) -> bool {
        self.canonical.is_some()
    }
}

/// Whether a string reads like the name of a scheme rather than a sentence.
pub fn looks_like_title(title: &str) -> bool {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return false;
    }
    if title.ends_with(['.', '!', '?']) {
        return false;
    }
    let lower = title.to_lowercase();
    !CONVERSATIONAL_PHRASES.iter().any(|p| lower.contains(p))
}

/// Only absolute http(s) URLs are worth an exact link lookup.
fn is_absolute_url(link: &str) -> bool {
    Url::parse(link.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

async fn find_canonical(
    candidate: &CandidateScheme,
    store: &dyn BaseResourceStore,
) -> Result<Option<CanonicalResource>> {
    if is_absolute_url(&candidate.link) {
        if let Some(resource) = store.find_by_link(candidate.link.trim()).await? {
            return Ok(Some(resource));
        }
    }

    if candidate.title.trim().is_empty() {
        return Ok(None);
    }
    store.find_by_title(candidate.title.trim()).await
}

fn apply_canonical(scheme: &mut CandidateScheme, resource: &CanonicalResource) {
    if !looks_like_title(&scheme.title) {
        scheme.title = resource.title.clone();
    }
    scheme.link = resource.link.clone();
    scheme.tags.extend(
        resource
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
    );
    if scheme.description.trim().is_empty() {
        scheme.description = resource.description.clone();
    }
}

/// Link of the retrieved document sharing the candidate's title, else of the top document.
fn fallback_link(scheme: &CandidateScheme, docs: &[RetrievalResult]) -> Option<String> {
    let key = scheme.normalized_title();
    docs.iter()
        .find(|doc| doc.title().trim().to_lowercase() == key)
        .or_else(|| docs.first())
        .map(|doc| doc.link().trim().to_string())
        .filter(|link| !link.is_empty())
}

/// Reconcile one candidate against the canonical store.
///
/// Store errors propagate; the caller decides how to degrade.
pub async fn reconcile(
    candidate: CandidateScheme,
    docs: &[RetrievalResult],
    store: &dyn BaseResourceStore,
) -> Result<Reconciled> {
    let mut scheme = candidate;
    let canonical = find_canonical(&scheme, store).await?;

    match &canonical {
        Some(resource) => {
            debug!(title = %scheme.title, canonical = %resource.title, "Candidate matched canonical resource");
            apply_canonical(&mut scheme, resource);
        }
        None => {
            debug!(title = %scheme.title, "No canonical match for candidate");
            scheme.note = Some(UNVERIFIED_NOTE.to_string());
        }
    }

    if scheme.link.trim().is_empty() {
        if let Some(link) = fallback_link(&scheme, docs) {
            scheme.link = link;
        }
    }

    scheme.close_category();

    Ok(Reconciled { scheme, canonical })
}
