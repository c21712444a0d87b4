//! Deduplication of candidate schemes by normalized title

use std::collections::HashSet;

use super::models::CandidateScheme;

/// Keep the first scheme per normalized title, preserving input order.
///
/// Callers put generation-produced schemes ahead of canonical matches so the
/// assistant's wording wins ties.
pub fn deduplicate(schemes: Vec<CandidateScheme>) -> Vec<CandidateScheme> {
    let mut seen = HashSet::new();
    schemes
        .into_iter()
        .filter(|scheme| seen.insert(scheme.normalized_title()))
        .collect()
}
