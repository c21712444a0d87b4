//! Grounded prompt composition.

use crate::domains::resources::RetrievalResult;

/// Context line used when retrieval found nothing to ground on.
pub const NO_KNOWN_RESOURCES: &str =
    "No known resources found in our trusted directory for this question.";

const PERSONA: &str = "You are CareGuide, a warm and practical assistant for family caregivers. \
Recommend concrete support schemes, services and programs. Prefer the trusted resources \
listed below and reuse their exact links when they are relevant. Never invent links.";

const OUTPUT_CONTRACT: &str = r#"Respond ONLY with a JSON array. Each element must be an object with exactly these keys:
- "title": short name of the scheme or service
- "description": one or two sentences on what it offers
- "eligibility": array of strings, who qualifies
- "steps": array of strings, how to apply or get started
- "link": official URL, or "" if unknown
- "category": one of "Financial", "Medical", "General"
- "tags": array of short lowercase keywords
Do not wrap the array in markdown and do not add commentary."#;

/// Build the single grounded request sent to the assistant.
///
/// Layout: persona, numbered `title: link` context (or the no-resources
/// sentinel), output contract, and finally the caregiver's question verbatim.
pub fn compose_prompt(query: &str, docs: &[RetrievalResult]) -> String {
    let context = if docs.is_empty() {
        NO_KNOWN_RESOURCES.to_string()
    } else {
        docs.iter()
            .enumerate()
            .map(|(i, doc)| format!("{}. {}: {}", i + 1, doc.title(), doc.link()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{PERSONA}\n\nTrusted resources:\n{context}\n\n{OUTPUT_CONTRACT}\n\nCaregiver question:\n{query}"
    )
}
