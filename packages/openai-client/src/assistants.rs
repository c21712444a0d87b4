//! Assistants API: threads, messages and runs.
//!
//! Only the single-shot calls live here. Polling a run until it finishes is a
//! caller concern, since the caller owns the time budget.

use tracing::debug;

use crate::types::{CreateMessageRequest, CreateRunRequest, ListResponse, Run, Thread, ThreadMessage};
use crate::{OpenAIClient, Result};

impl OpenAIClient {
    /// Open a new, empty thread.
    pub async fn create_thread(&self) -> Result<Thread> {
        let builder = self
            .assistants_request(self.http().post(self.url("threads")))
            .json(&serde_json::json!({}));
        let thread: Thread = self.send_json(builder, "create thread").await?;
        debug!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    /// Append a user message to a thread.
    pub async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let builder = self
            .assistants_request(
                self.http()
                    .post(self.url(&format!("threads/{}/messages", thread_id))),
            )
            .json(&CreateMessageRequest::user(content));
        self.send_json(builder, "create message").await
    }

    /// Start an assistant run on a thread.
    pub async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let request = CreateRunRequest {
            assistant_id: assistant_id.to_string(),
            additional_instructions: None,
        };
        let builder = self
            .assistants_request(self.http().post(self.url(&format!("threads/{}/runs", thread_id))))
            .json(&request);
        let run: Run = self.send_json(builder, "create run").await?;
        debug!(thread_id, run_id = %run.id, status = %run.status, "Started run");
        Ok(run)
    }

    /// Fetch the current state of a run.
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let builder = self.assistants_request(
            self.http()
                .get(self.url(&format!("threads/{}/runs/{}", thread_id, run_id))),
        );
        self.send_json(builder, "retrieve run").await
    }

    /// List the messages on a thread, newest first.
    pub async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let builder = self
            .assistants_request(
                self.http()
                    .get(self.url(&format!("threads/{}/messages", thread_id))),
            )
            .query(&[("order", "desc"), ("limit", "20")]);
        let list: ListResponse<ThreadMessage> = self.send_json(builder, "list messages").await?;
        Ok(list.data)
    }
}
