use std::time::Duration;

use thiserror::Error;

/// Failures of a generation run. All of them are fatal to the chat request.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Transport or service error while creating, appending, starting or polling
    #[error("Generation service error: {0}")]
    Service(#[source] anyhow::Error),

    /// The run reached a terminal status other than completed
    #[error("Generation run ended with status '{status}': {}", .reason.as_deref().unwrap_or("no reason given"))]
    RunFailed {
        status: String,
        reason: Option<String>,
    },

    /// The run was still pending when the poll budget ran out
    #[error("Generation timed out after {attempts} status checks ({elapsed:?})")]
    Timeout { attempts: u32, elapsed: Duration },
}

impl GenerationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GenerationError::Timeout { .. })
    }
}
