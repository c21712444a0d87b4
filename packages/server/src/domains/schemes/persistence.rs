//! Persisting reconciled schemes
//!
//! Each candidate goes through the store's upsert, which is atomic per
//! normalized title. A failed write is logged and the candidate is left out of
//! the persisted set; it never fails the request.

use tracing::{debug, warn};

use super::models::{CandidateScheme, PersistedScheme};
use crate::kernel::BaseSchemeStore;

/// Upsert every candidate, returning the records that were stored or reused.
pub async fn persist_schemes(
    candidates: &[CandidateScheme],
    store: &dyn BaseSchemeStore,
) -> Vec<PersistedScheme> {
    let mut persisted = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if candidate.title.trim().is_empty() {
            continue;
        }

        match store.upsert(candidate).await {
            Ok(outcome) => {
                debug!(
                    title = %outcome.scheme.title,
                    created = outcome.created,
                    "Scheme persisted"
                );
                persisted.push(outcome.scheme);
            }
            Err(e) => {
                warn!(title = %candidate.title, error = %e, "Failed to persist scheme");
            }
        }
    }

    persisted
}
