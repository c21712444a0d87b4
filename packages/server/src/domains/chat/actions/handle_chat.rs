//! Handle chat action - one caregiver question through the whole pipeline
//!
//! retrieve -> compose -> generate -> parse -> reconcile -> persist -> dedupe -> log
//!
//! Only validation and generation failures reach the caller. Retrieval,
//! reconciliation, persistence and logging all degrade in place.

use tracing::{error, info, warn};

use crate::domains::chat::data::{ChatRequest, ChatResponse};
use crate::domains::chat::errors::ChatError;
use crate::domains::chat::models::ChatRole;
use crate::domains::generation::{compose_prompt, NO_RESPONSE};
use crate::domains::resources::retrieve_documents;
use crate::domains::schemes::{
    deduplicate, parse_reply, persist_schemes, reconcile, CandidateScheme,
};
use crate::kernel::ServerDeps;

/// `(prompt, user_id)`, or the validation error if either is blank.
///
/// The prompt goes downstream exactly as sent; only the user id is trimmed.
fn validate(request: &ChatRequest) -> Result<(&str, &str), ChatError> {
    let prompt = request.prompt.as_deref().unwrap_or_default();
    let user_id = request.user_id.as_deref().map(str::trim).unwrap_or_default();

    if prompt.trim().is_empty() || user_id.is_empty() {
        return Err(ChatError::missing_fields());
    }
    Ok((prompt, user_id))
}

pub async fn handle_chat(request: ChatRequest, deps: &ServerDeps) -> Result<ChatResponse, ChatError> {
    let (prompt, user_id) = validate(&request)?;

    info!(user_id = %user_id, prompt_length = prompt.len(), "Handling chat request");

    let docs = retrieve_documents(
        deps.resources.clone(),
        deps.embedding_service.clone(),
        prompt,
        deps.settings.top_k,
    )
    .await;

    let full_prompt = compose_prompt(prompt, &docs);

    let reply = match deps.generation_runner().run(&full_prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Generation failed");
            return Err(e.into());
        }
    };

    // The no-response sentinel carries no schemes
    let candidates = if reply == NO_RESPONSE {
        Vec::new()
    } else {
        parse_reply(&reply).unwrap_or_default()
    };

    let mut reconciled: Vec<CandidateScheme> = Vec::with_capacity(candidates.len());
    let mut to_persist: Vec<CandidateScheme> = Vec::with_capacity(candidates.len());
    let mut canonical_matches: Vec<CandidateScheme> = Vec::new();

    for candidate in candidates {
        match reconcile(candidate.clone(), &docs, deps.resources.as_ref()).await {
            Ok(result) => {
                if let Some(resource) = &result.canonical {
                    canonical_matches.push(CandidateScheme::from(resource));
                }
                to_persist.push(result.scheme.clone());
                reconciled.push(result.scheme);
            }
            Err(e) => {
                // Unreconciled candidates are still answered, never stored
                warn!(title = %candidate.title, error = %e, "Cross-check failed");
                let mut scheme = candidate;
                scheme.close_category();
                reconciled.push(scheme);
            }
        }
    }

    let persisted = persist_schemes(&to_persist, deps.schemes.as_ref()).await;

    let verified_resource = reconciled.first().cloned();

    let related_schemes = deduplicate(
        reconciled
            .into_iter()
            .chain(persisted.iter().map(|p| p.to_candidate()))
            .chain(canonical_matches)
            .collect(),
    );

    record_exchange(deps, user_id, prompt, &reply).await;

    info!(
        user_id = %user_id,
        documents = docs.len(),
        persisted = persisted.len(),
        related = related_schemes.len(),
        "Chat request handled"
    );

    Ok(ChatResponse {
        reply,
        verified_resource,
        related_schemes,
    })
}

/// Append both sides of the turn to the log. Best effort.
async fn record_exchange(deps: &ServerDeps, user_id: &str, prompt: &str, reply: &str) {
    for (role, content) in [(ChatRole::User, prompt), (ChatRole::Assistant, reply)] {
        if let Err(e) = deps.chat_log.append(user_id, role, content).await {
            warn!(user_id = %user_id, role = %role, error = %e, "Failed to record chat exchange");
        }
    }
}
