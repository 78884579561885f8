//! Worker seams for batch execution and hierarchical reduction.
//!
//! This module provides the async traits implemented by anything that
//! processes items for [`BatchExecutor`](crate::executor::BatchExecutor) or
//! merges partials for [`HierarchicalReducer`](crate::reducer::HierarchicalReducer),
//! plus the per-invocation contexts those traits receive.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::events::Event;
use crate::failures::TaskError;

// ============================================================================
// Core Traits
// ============================================================================

/// Core trait for units of work executed over a batch of items.
///
/// A worker receives one input plus its execution context, performs the work,
/// and returns either an output or a [`TaskError`]. Errors are values: the
/// executor's retry loop inspects them, re-invokes `process` with a fresh
/// context (same index, next attempt), and records exhaustion as an item
/// failure without aborting the batch.
///
/// Implementations should be stateless with respect to individual items so
/// that a retried attempt sees the same world as the first.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use sumweave::failures::TaskError;
/// use sumweave::worker::{TaskContext, Worker};
///
/// struct WordCount;
///
/// #[async_trait]
/// impl Worker for WordCount {
///     type Input = String;
///     type Output = usize;
///
///     async fn process(&self, input: String, ctx: TaskContext) -> Result<usize, TaskError> {
///         ctx.emit("count", "counting words")?;
///         Ok(input.split_whitespace().count())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync {
    /// Item type this worker consumes. Cloned per attempt by the retry loop.
    type Input: Clone + Send + Sync + 'static;
    /// Result type produced on success.
    type Output: Send + 'static;

    /// Process one item.
    async fn process(&self, input: Self::Input, ctx: TaskContext)
        -> Result<Self::Output, TaskError>;
}

/// Trait for folding a group of partial results into one.
///
/// The reducer joins each group with blank lines before calling `merge`, so
/// implementations see a single combined text. Errors propagate immediately;
/// the reducer retries nothing.
#[async_trait]
pub trait MergeWorker: Send + Sync {
    /// Fold one blank-line-joined group into a single text.
    async fn merge(&self, combined: String, ctx: MergeContext) -> Result<String, TaskError>;
}

// ============================================================================
// Invocation Contexts
// ============================================================================

/// Execution context passed to a [`Worker`] for one attempt at one item.
///
/// Carries the item's batch position and the attempt counter so emitted
/// events are traceable back to a specific invocation.
#[derive(Clone, Debug)]
pub struct TaskContext {
    /// Zero-based position of the item in the submitted batch.
    pub index: usize,
    /// Attempt number for this invocation, starting at 1.
    pub attempt: u32,
    event_sender: Option<flume::Sender<Event>>,
}

impl TaskContext {
    /// Context without an event channel; `emit` becomes a no-op.
    pub fn new(index: usize, attempt: u32) -> Self {
        Self {
            index,
            attempt,
            event_sender: None,
        }
    }

    /// Context wired to an event channel.
    pub fn with_sender(index: usize, attempt: u32, sender: flume::Sender<Event>) -> Self {
        Self {
            index,
            attempt,
            event_sender: Some(sender),
        }
    }

    /// Emit a task-scoped event enriched with this context's position and
    /// attempt metadata. Silently succeeds when no channel is configured.
    pub fn emit(
        &self,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), ContextError> {
        let Some(sender) = &self.event_sender else {
            return Ok(());
        };
        sender
            .send(Event::task_message_with_meta(
                self.index,
                self.attempt,
                scope,
                message,
            ))
            .map_err(|_| ContextError::ChannelClosed)
    }
}

/// Execution context passed to a [`MergeWorker`] for one group merge.
#[derive(Clone, Debug)]
pub struct MergeContext {
    /// One-based reduction level.
    pub level: usize,
    /// One-based group position within the level.
    pub group: usize,
    event_sender: Option<flume::Sender<Event>>,
}

impl MergeContext {
    /// Context without an event channel; `emit` becomes a no-op.
    pub fn new(level: usize, group: usize) -> Self {
        Self {
            level,
            group,
            event_sender: None,
        }
    }

    /// Context wired to an event channel.
    pub fn with_sender(level: usize, group: usize, sender: flume::Sender<Event>) -> Self {
        Self {
            level,
            group,
            event_sender: Some(sender),
        }
    }

    /// Emit a merge-scoped event. Silently succeeds when no channel is
    /// configured.
    pub fn emit(
        &self,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), ContextError> {
        let Some(sender) = &self.event_sender else {
            return Ok(());
        };
        let message = message.into();
        sender
            .send(Event::task_message(
                scope,
                format!("[level {} group {}] {message}", self.level, self.group),
            ))
            .map_err(|_| ContextError::ChannelClosed)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when using context methods.
#[derive(Debug, Error, Diagnostic)]
pub enum ContextError {
    /// Event could not be sent because the channel is disconnected.
    #[error("failed to emit event: channel disconnected")]
    #[diagnostic(
        code(sumweave::worker::channel_closed),
        help("The event listener may have been stopped. Check the bus lifecycle.")
    )]
    ChannelClosed,
}

impl From<ContextError> for TaskError {
    fn from(err: ContextError) -> Self {
        TaskError::from_error(&err)
    }
}
