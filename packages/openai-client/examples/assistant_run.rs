//! Drive one assistant run end to end.
//!
//! OPENAI_API_KEY=... OPENAI_ASSISTANT_ID=asst_... cargo run -p openai-client --example assistant_run

use std::time::Duration;

use openai_client::OpenAIClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = OpenAIClient::from_env()?;
    let assistant_id = std::env::var("OPENAI_ASSISTANT_ID")?;

    let thread = client.create_thread().await?;
    client
        .create_message(&thread.id, "What support is there for dementia caregivers?")
        .await?;
    let mut run = client.create_run(&thread.id, &assistant_id).await?;

    for _ in 0..60 {
        if run.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        run = client.retrieve_run(&thread.id, &run.id).await?;
    }
    println!("Run finished with status: {}", run.status);

    let messages = client.list_messages(&thread.id).await?;
    if let Some(reply) = messages.iter().find(|m| m.is_assistant()) {
        println!("{}", reply.text());
    }

    Ok(())
}
