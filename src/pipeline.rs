//! End-to-end document summarization.
//!
//! [`SummaryPipeline`] wires the crate's pieces into the full flow:
//! segment the document, coalesce small neighboring chunks, fan the chunk
//! worker out through a [`BatchExecutor`], fold the partial summaries with a
//! [`HierarchicalReducer`], and optionally polish the merged result with one
//! final pass. The outcome carries a run id, the summary, and the failure
//! records of any chunks that did not survive their retry budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use miette::Diagnostic;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DEFAULT_COALESCE_LIMIT;
use crate::events::Event;
use crate::executor::{BatchExecutor, ExecutorError};
use crate::failures::{ItemFailure, TaskError};
use crate::providers::{ChatClient, ChunkSummaryWorker, SummaryMergeWorker};
use crate::reducer::{HierarchicalReducer, ReduceError};
use crate::segmenter::Segmenter;
use crate::worker::{MergeWorker, TaskContext, Worker};

// ============================================================================
// Summary Styles
// ============================================================================

/// Prompt set for one summarization register.
///
/// The three prompts drive the chunk pass, the merge passes, and the final
/// polish respectively. Presets give a starting register; all wording is
/// caller-overridable.
#[derive(Clone, Debug)]
pub struct SummaryStyle {
    pub chunk_prompt: String,
    pub merge_prompt: String,
    pub final_prompt: String,
}

impl Default for SummaryStyle {
    fn default() -> Self {
        Self::standard()
    }
}

impl SummaryStyle {
    /// Short summaries: core arguments and conclusions only.
    pub fn concise() -> Self {
        Self {
            chunk_prompt: "Summarize the following text in a few short paragraphs. \
                           Keep only the core arguments, findings, and conclusions."
                .to_string(),
            merge_prompt: "Combine the following partial summaries into one short summary. \
                           Remove duplicated points and keep the flow logical."
                .to_string(),
            final_prompt: "Rewrite the following summary into its final form: compact, \
                           plain language, readable top to bottom."
                .to_string(),
        }
    }

    /// Balanced summaries with the important technical detail kept.
    pub fn standard() -> Self {
        Self {
            chunk_prompt: "Summarize the following text. Cover the background, the approach, \
                           the key findings, and their implications, keeping important \
                           technical detail."
                .to_string(),
            merge_prompt: "Combine the following partial summaries into one coherent summary. \
                           Integrate overlapping points once, preserve technical detail, and \
                           keep a clear section flow."
                .to_string(),
            final_prompt: "Rewrite the following summary into its final form. Open with the \
                           overall contribution, then findings, then implications; keep it \
                           clear and well structured."
                .to_string(),
        }
    }

    /// In-depth summaries that preserve methodology and evidence.
    pub fn detailed() -> Self {
        Self {
            chunk_prompt: "Write an in-depth summary of the following text. Preserve the \
                           methodology, experimental setup, quantitative results, and \
                           limitations alongside the main findings."
                .to_string(),
            merge_prompt: "Merge the following partial summaries into one detailed summary. \
                           Keep methodology and evidence, deduplicate carefully, and maintain \
                           an academic register."
                .to_string(),
            final_prompt: "Produce the final version of the following summary. Keep the depth \
                           and evidence, organize into overview, methods and results, and \
                           discussion."
                .to_string(),
        }
    }

    #[must_use]
    pub fn with_chunk_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.chunk_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_merge_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.merge_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_final_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.final_prompt = prompt.into();
        self
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Full segmentation-to-summary flow over pluggable workers.
///
/// The chunk worker summarizes individual chunks under the executor's
/// concurrency and retry policy; the merge worker folds partials in the
/// reducer; an optional polisher (same worker type as the chunk worker)
/// rewrites the merged summary once at the end.
pub struct SummaryPipeline<W, M> {
    segmenter: Segmenter,
    executor: BatchExecutor,
    reducer: HierarchicalReducer,
    coalesce_limit: usize,
    chunk_worker: Arc<W>,
    merge_worker: Arc<M>,
    polisher: Option<Arc<W>>,
    event_sender: Option<flume::Sender<Event>>,
}

impl SummaryPipeline<ChunkSummaryWorker, SummaryMergeWorker> {
    /// Builder preloaded with provider-backed workers for all three passes.
    pub fn with_provider(
        client: Arc<ChatClient>,
        style: SummaryStyle,
    ) -> SummaryPipelineBuilder<ChunkSummaryWorker, SummaryMergeWorker> {
        SummaryPipeline::builder(
            Arc::new(ChunkSummaryWorker::new(
                Arc::clone(&client),
                style.chunk_prompt,
            )),
            Arc::new(SummaryMergeWorker::new(
                Arc::clone(&client),
                style.merge_prompt,
            )),
        )
        .polisher(Arc::new(ChunkSummaryWorker::new(client, style.final_prompt)))
    }
}

impl<W, M> SummaryPipeline<W, M>
where
    W: Worker<Input = String, Output = String> + 'static,
    M: MergeWorker,
{
    pub fn builder(chunk_worker: Arc<W>, merge_worker: Arc<M>) -> SummaryPipelineBuilder<W, M> {
        SummaryPipelineBuilder {
            segmenter: Segmenter::default(),
            executor: BatchExecutor::new(),
            reducer: HierarchicalReducer::new(),
            coalesce_limit: DEFAULT_COALESCE_LIMIT,
            chunk_worker,
            merge_worker,
            polisher: None,
            event_sender: None,
        }
    }

    /// Summarize one document.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyInput`] when the document normalizes to
    /// nothing, [`PipelineError::AllChunksFailed`] when no chunk survived
    /// its retry budget, and transparent executor/reducer errors when the
    /// machinery itself fails. Partial chunk failure is not an error; the
    /// outcome carries the failure records instead.
    #[tracing::instrument(skip(self, text))]
    pub async fn run(&self, text: &str) -> Result<PipelineOutcome, PipelineError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();

        let chunks = self.segmenter.segment(text);
        if chunks.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let chunk_count = chunks.len();

        let inputs = coalesce(
            chunks.into_iter().map(|chunk| chunk.text).collect(),
            self.coalesce_limit,
        );
        tracing::info!(%run_id, chunk_count, batch_inputs = inputs.len(), "document segmented");
        self.emit(format!(
            "run {run_id}: {chunk_count} chunks, {} batch inputs",
            inputs.len()
        ));

        let report = self
            .executor
            .run(inputs, Arc::clone(&self.chunk_worker))
            .await?;
        if report.outputs.is_empty() {
            return Err(PipelineError::AllChunksFailed {
                failures: report.failures,
            });
        }
        let failures = report.failures;

        let mut summary = self
            .reducer
            .reduce(report.outputs, self.merge_worker.as_ref())
            .await?;

        if let Some(polisher) = &self.polisher {
            self.emit(format!("run {run_id}: polishing merged summary"));
            let ctx = match &self.event_sender {
                Some(sender) => TaskContext::with_sender(0, 1, sender.clone()),
                None => TaskContext::new(0, 1),
            };
            summary = polisher
                .process(summary, ctx)
                .await
                .map_err(|source| PipelineError::Polish { source })?;
        }

        let elapsed = started.elapsed();
        tracing::info!(%run_id, ?elapsed, failed = failures.len(), "summary ready");
        Ok(PipelineOutcome {
            run_id,
            summary,
            chunk_count,
            failures,
            elapsed,
        })
    }

    fn emit(&self, message: String) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(Event::diagnostic("pipeline", message));
        }
    }
}

/// Coalesce adjacent texts while the combined length stays under `limit`
/// characters, joining with blank lines. A text at or over the limit stands
/// alone.
fn coalesce(texts: Vec<String>, limit: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for text in texts {
        let text_len = text.chars().count();
        if current.is_empty() {
            current = text;
            current_len = text_len;
        } else if current_len + text_len < limit {
            current.push_str("\n\n");
            current.push_str(&text);
            current_len += 2 + text_len;
        } else {
            merged.push(std::mem::take(&mut current));
            current = text;
            current_len = text_len;
        }
    }
    if !current.is_empty() {
        merged.push(current);
    }
    merged
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`SummaryPipeline`].
pub struct SummaryPipelineBuilder<W, M> {
    segmenter: Segmenter,
    executor: BatchExecutor,
    reducer: HierarchicalReducer,
    coalesce_limit: usize,
    chunk_worker: Arc<W>,
    merge_worker: Arc<M>,
    polisher: Option<Arc<W>>,
    event_sender: Option<flume::Sender<Event>>,
}

impl<W, M> SummaryPipelineBuilder<W, M>
where
    W: Worker<Input = String, Output = String> + 'static,
    M: MergeWorker,
{
    #[must_use]
    pub fn segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    #[must_use]
    pub fn executor(mut self, executor: BatchExecutor) -> Self {
        self.executor = executor;
        self
    }

    #[must_use]
    pub fn reducer(mut self, reducer: HierarchicalReducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// Adjacent chunks coalesce while their combined length stays under this
    /// many characters. Zero disables coalescing.
    #[must_use]
    pub fn coalesce_limit(mut self, limit: usize) -> Self {
        self.coalesce_limit = limit;
        self
    }

    /// Worker for the final polish pass over the merged summary.
    #[must_use]
    pub fn polisher(mut self, polisher: Arc<W>) -> Self {
        self.polisher = Some(polisher);
        self
    }

    /// Channel that receives pipeline diagnostics and the polish pass's
    /// task events.
    #[must_use]
    pub fn event_sender(mut self, sender: flume::Sender<Event>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    pub fn build(self) -> SummaryPipeline<W, M> {
        SummaryPipeline {
            segmenter: self.segmenter,
            executor: self.executor,
            reducer: self.reducer,
            coalesce_limit: self.coalesce_limit,
            chunk_worker: self.chunk_worker,
            merge_worker: self.merge_worker,
            polisher: self.polisher,
            event_sender: self.event_sender,
        }
    }
}

// ============================================================================
// Outcome & Error Types
// ============================================================================

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Identifier for this run, carried through logs and events.
    pub run_id: Uuid,
    /// The final summary text.
    pub summary: String,
    /// Chunks produced by segmentation, before coalescing.
    pub chunk_count: usize,
    /// Chunks that exhausted their retry budget.
    pub failures: Vec<ItemFailure>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl PipelineOutcome {
    /// True when some chunks failed and the summary covers the remainder.
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Errors that end a pipeline run without a summary.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("document is empty after normalization")]
    #[diagnostic(
        code(sumweave::pipeline::empty_input),
        help("Feed text with at least one non-whitespace character.")
    )]
    EmptyInput,

    #[error("all {} chunks failed to summarize", failures.len())]
    #[diagnostic(
        code(sumweave::pipeline::all_chunks_failed),
        help("Inspect the failure records; the provider may be unreachable or the key invalid.")
    )]
    AllChunksFailed { failures: Vec<ItemFailure> },

    #[error(transparent)]
    #[diagnostic(code(sumweave::pipeline::executor))]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    #[diagnostic(code(sumweave::pipeline::reduce))]
    Reduce(#[from] ReduceError),

    #[error("final polish failed: {source}")]
    #[diagnostic(code(sumweave::pipeline::polish))]
    Polish {
        #[source]
        source: TaskError,
    },
}
