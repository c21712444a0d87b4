//! Request and response shapes for the chat endpoint.

use serde::{Deserialize, Serialize};

use crate::domains::schemes::CandidateScheme;

/// Incoming chat request. Both fields are optional at the wire level so a
/// missing field is a validation error rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            user_id: Some(user_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Raw assistant reply
    pub reply: String,

    /// Primary answer: the first parsed scheme, reconciled
    pub verified_resource: Option<CandidateScheme>,

    pub related_schemes: Vec<CandidateScheme>,
}
