//! # Sumweave: overlap-aware segmentation and map-reduce summarization
//!
//! Sumweave turns long documents into bounded, context-preserving chunks,
//! fans an async worker out over them with capped concurrency and retry,
//! and folds the partial results back into one summary.
//!
//! ## Core Concepts
//!
//! - **Segmenter**: Splits normalized text into chunks that respect a size
//!   bound, carry their section heading, and overlap their neighbor
//! - **Reassembler**: Merges chunked text back together, collapsing the
//!   injected overlap exactly once
//! - **BatchExecutor**: Runs a [`worker::Worker`] over a batch under a
//!   concurrency ceiling with fixed-delay retry and progress accounting
//! - **HierarchicalReducer**: Folds partials level by level through a
//!   [`worker::MergeWorker`] until one text remains
//! - **SummaryPipeline**: Wires all of the above to an OpenAI-compatible
//!   provider for end-to-end document summarization
//!
//! ## Quick Start
//!
//! ### Segmenting a document
//!
//! ```
//! use sumweave::segmenter::Segmenter;
//!
//! let segmenter = Segmenter::builder()
//!     .max_chunk_size(500)
//!     .overlap_size(50)
//!     .try_build()?;
//!
//! let chunks = segmenter.segment("# Title\n\nBody sentence one. Body sentence two.");
//! assert_eq!(chunks.len(), 1);
//! assert!(chunks[0].text.starts_with("# Title"));
//! # Ok::<(), sumweave::segmenter::SegmenterError>(())
//! ```
//!
//! ### Running a worker over a batch
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use sumweave::executor::BatchExecutor;
//! use sumweave::failures::TaskError;
//! use sumweave::worker::{TaskContext, Worker};
//!
//! struct WordCount;
//!
//! #[async_trait]
//! impl Worker for WordCount {
//!     type Input = String;
//!     type Output = usize;
//!
//!     async fn process(&self, input: String, ctx: TaskContext) -> Result<usize, TaskError> {
//!         ctx.emit("count", "counting words")?;
//!         Ok(input.split_whitespace().count())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = BatchExecutor::builder().concurrency_limit(2).try_build()?;
//! let report = executor
//!     .run(
//!         vec!["one two".to_string(), "three".to_string()],
//!         Arc::new(WordCount),
//!     )
//!     .await?;
//! assert_eq!(report.outputs, vec![2, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Summarizing through a provider
//!
//! ```no_run
//! use std::sync::Arc;
//! use sumweave::pipeline::{SummaryPipeline, SummaryStyle};
//! use sumweave::providers::{ChatClient, ProviderConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ChatClient::new(ProviderConfig::from_env()?)?);
//! let pipeline = SummaryPipeline::with_provider(client, SummaryStyle::concise()).build();
//!
//! let outcome = pipeline.run("long document text...").await?;
//! println!("{}", outcome.summary);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Configuration and machinery errors are `thiserror` enums with `miette`
//! diagnostics. Worker failures are [`failures::TaskError`] values: they
//! feed the executor's retry loop, and exhaustion becomes a serializable
//! [`failures::ItemFailure`] record on the batch report instead of aborting
//! the batch.
//!
//! ```
//! use sumweave::failures::TaskError;
//! use sumweave::worker::TaskContext;
//!
//! fn example_emit(ctx: &TaskContext) -> Result<(), TaskError> {
//!     ctx.emit("validation", "checking chunk length")?;
//!     Err(TaskError::msg("chunk was empty"))
//! }
//! ```
//!
//! ## Module Guide
//!
//! - [`segmenter`] - Normalization, heading classification, chunk packing,
//!   overlap injection
//! - [`reassembler`] - Overlap-collapsing chunk merge
//! - [`executor`] - Concurrency-capped batch execution with retry
//! - [`reducer`] - Hierarchical reduction of partial results
//! - [`worker`] - Worker traits and invocation contexts
//! - [`pipeline`] - End-to-end summarization flow and prompt styles
//! - [`providers`] - OpenAI-compatible chat-completions client
//! - [`events`] - Event bus, sinks, and typed events
//! - [`failures`] - Serializable failure records
//! - [`telemetry`] - Tracing setup and output formatting
//! - [`config`] - Default tunables

pub mod config;
pub mod events;
pub mod executor;
pub mod failures;
pub mod pipeline;
pub mod providers;
pub mod reassembler;
pub mod reducer;
pub mod segmenter;
pub mod telemetry;
pub mod worker;
