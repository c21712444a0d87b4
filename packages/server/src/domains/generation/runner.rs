//! Generation run orchestration.
//!
//! CREATED -> message appended -> RUN_STARTED -> POLLING -> COMPLETED | FAILED
//!
//! Polling is bounded twice over: by a maximum number of status checks and by
//! a wall-clock budget. The budget covers the whole run, including any single
//! service call that stalls. Running out of either is `GenerationError::Timeout`.
//! Nothing is retried here; retry policy belongs to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::errors::GenerationError;
use crate::kernel::{AssistantMessage, BaseAssistant, RunState};

/// Reply used when a completed run left no assistant message behind.
pub const NO_RESPONSE: &str = "No response.";

/// Headroom for the create/append/start calls on top of the polls themselves.
const STARTUP_GRACE: Duration = Duration::from_secs(30);

/// Poll budget for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
    /// Wall-clock ceiling, measured from thread creation
    pub max_wait: Duration,
}

impl RunPolicy {
    /// Policy whose wall-clock ceiling covers every poll plus a grace period.
    /// Saturates at `Duration::MAX` for oversized settings.
    pub fn new(poll_interval: Duration, max_polls: u32) -> Self {
        let max_wait = poll_interval
            .checked_mul(max_polls)
            .and_then(|polls| polls.checked_add(STARTUP_GRACE))
            .unwrap_or(Duration::MAX);

        Self {
            poll_interval,
            max_polls,
            max_wait,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 60)
    }
}

/// Drives one prompt through the hosted assistant and returns its raw reply.
#[derive(Clone)]
pub struct GenerationRunner {
    assistant: Arc<dyn BaseAssistant>,
    policy: RunPolicy,
}

impl GenerationRunner {
    pub fn new(assistant: Arc<dyn BaseAssistant>, policy: RunPolicy) -> Self {
        Self { assistant, policy }
    }

    pub fn policy(&self) -> &RunPolicy {
        &self.policy
    }

    pub async fn run(&self, prompt: &str) -> Result<String, GenerationError> {
        let started = Instant::now();
        let mut attempts = 0;

        let outcome = tokio::time::timeout(
            self.policy.max_wait,
            self.drive(prompt, started, &mut attempts),
        )
        .await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(self.timeout(attempts, started)),
        }
    }

    async fn drive(
        &self,
        prompt: &str,
        started: Instant,
        attempts: &mut u32,
    ) -> Result<String, GenerationError> {
        let thread_id = self
            .assistant
            .create_thread()
            .await
            .map_err(GenerationError::Service)?;
        self.assistant
            .add_user_message(&thread_id, prompt)
            .await
            .map_err(GenerationError::Service)?;
        let run_id = self
            .assistant
            .start_run(&thread_id)
            .await
            .map_err(GenerationError::Service)?;

        info!(thread_id = %thread_id, run_id = %run_id, "Generation run started");

        self.wait_for_completion(&thread_id, &run_id, started, attempts)
            .await?;

        let messages = self
            .assistant
            .list_messages(&thread_id)
            .await
            .map_err(GenerationError::Service)?;

        let reply = latest_assistant_text(&messages).unwrap_or_else(|| {
            warn!(thread_id = %thread_id, "Run completed without an assistant message");
            NO_RESPONSE.to_string()
        });

        info!(
            thread_id = %thread_id,
            run_id = %run_id,
            reply_length = reply.len(),
            duration_ms = started.elapsed().as_millis(),
            "Generation run completed"
        );

        Ok(reply)
    }

    /// Poll until terminal. `attempts` counts status checks that returned.
    async fn wait_for_completion(
        &self,
        thread_id: &str,
        run_id: &str,
        started: Instant,
        attempts: &mut u32,
    ) -> Result<(), GenerationError> {
        for attempt in 1..=self.policy.max_polls {
            if started.elapsed() >= self.policy.max_wait {
                return Err(self.timeout(*attempts, started));
            }

            tokio::time::sleep(self.policy.poll_interval).await;

            let state = self
                .assistant
                .run_state(thread_id, run_id)
                .await
                .map_err(GenerationError::Service)?;
            *attempts = attempt;

            match state {
                RunState::Pending => {
                    debug!(run_id = %run_id, attempt, "Run still pending");
                }
                RunState::Completed => return Ok(()),
                RunState::Failed { status, reason } => {
                    warn!(run_id = %run_id, status = %status, reason = ?reason, "Run failed");
                    return Err(GenerationError::RunFailed { status, reason });
                }
            }
        }

        Err(self.timeout(*attempts, started))
    }

    fn timeout(&self, attempts: u32, started: Instant) -> GenerationError {
        let elapsed = started.elapsed();
        warn!(attempts, elapsed_ms = elapsed.as_millis(), "Generation run timed out");
        GenerationError::Timeout { attempts, elapsed }
    }
}

/// Text of the newest assistant-authored message, if it has any text.
///
/// Ties on `created_at` go to the earlier list entry, since providers list
/// newest first.
fn latest_assistant_text(messages: &[AssistantMessage]) -> Option<String> {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == "assistant")
        .max_by_key(|m| m.created_at)
        .map(|m| m.text.trim().to_string())
        .filter(|text| !text.is_empty())
}
