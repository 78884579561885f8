//! Provider-backed implementations of the executor and reducer seams.

use std::sync::Arc;

use async_trait::async_trait;

use super::ChatClient;
use crate::failures::TaskError;
use crate::worker::{MergeContext, MergeWorker, TaskContext, Worker};

/// Summarizes one chunk of text through the provider.
///
/// The configured prompt is prepended to each chunk; the provider's answer
/// becomes the chunk's partial summary. Provider errors convert to
/// [`TaskError`] values so the executor's retry loop can act on them.
pub struct ChunkSummaryWorker {
    client: Arc<ChatClient>,
    prompt: String,
}

impl ChunkSummaryWorker {
    pub fn new(client: Arc<ChatClient>, prompt: impl Into<String>) -> Self {
        Self {
            client,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl Worker for ChunkSummaryWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, ctx: TaskContext) -> Result<String, TaskError> {
        ctx.emit(
            "summarize",
            format!("requesting summary for {} chars", input.chars().count()),
        )?;
        let prompt = format!("{}\n\nText:\n{}", self.prompt, input);
        self.client.complete(&prompt).await.map_err(|err| {
            TaskError::from_error(&err)
                .with_details(serde_json::json!({ "model": self.client.config().model }))
        })
    }
}

/// Folds a group of partial summaries into one through the provider.
pub struct SummaryMergeWorker {
    client: Arc<ChatClient>,
    prompt: String,
}

impl SummaryMergeWorker {
    pub fn new(client: Arc<ChatClient>, prompt: impl Into<String>) -> Self {
        Self {
            client,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl MergeWorker for SummaryMergeWorker {
    async fn merge(&self, combined: String, ctx: MergeContext) -> Result<String, TaskError> {
        ctx.emit(
            "merge",
            format!("merging {} chars of partials", combined.chars().count()),
        )?;
        let prompt = format!("{}\n\nText:\n{}", self.prompt, combined);
        self.client.complete(&prompt).await.map_err(|err| {
            TaskError::from_error(&err)
                .with_details(serde_json::json!({ "model": self.client.config().model }))
        })
    }
}
