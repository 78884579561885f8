//! Concurrency-capped batch execution with per-item retry.
//!
//! [`BatchExecutor`] fans a [`Worker`] out over a batch of items. Each item
//! gets its own task on a [`JoinSet`], but a shared semaphore caps how many
//! items are in flight at once; the permit is held across the item's whole
//! retry loop, sleeps included, so retries never inflate effective
//! concurrency. Worker errors are values that feed the retry loop; only
//! machinery failure (a panicked or cancelled task, a closed semaphore)
//! aborts the batch.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use sumweave::executor::BatchExecutor;
//! use sumweave::failures::TaskError;
//! use sumweave::worker::{TaskContext, Worker};
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl Worker for Shout {
//!     type Input = String;
//!     type Output = String;
//!
//!     async fn process(&self, input: String, _ctx: TaskContext) -> Result<String, TaskError> {
//!         Ok(input.to_uppercase())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = BatchExecutor::new();
//! let report = executor
//!     .run(vec!["alpha".to_string(), "beta".to_string()], Arc::new(Shout))
//!     .await?;
//! assert_eq!(report.outputs, vec!["ALPHA", "BETA"]);
//! assert!(!report.is_degraded());
//! # Ok(())
//! # }
//! ```

mod report;

pub use report::BatchReport;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::config::{DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use crate::events::{Event, ProgressEvent};
use crate::failures::{ItemFailure, TaskError};
use crate::worker::{TaskContext, Worker};

/// Observer invoked after every item reaches a terminal state.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

// ============================================================================
// Executor
// ============================================================================

/// Runs a [`Worker`] over a batch with bounded concurrency and fixed-delay
/// retry.
///
/// Construct with [`BatchExecutor::new`] for the defaults (5 concurrent
/// items, 3 attempts, 500 ms between attempts) or through
/// [`BatchExecutor::builder`] to tune limits and attach observers.
pub struct BatchExecutor {
    concurrency_limit: usize,
    max_attempts: u32,
    retry_delay: Duration,
    progress_label: String,
    event_sender: Option<flume::Sender<Event>>,
    progress_callback: Option<ProgressCallback>,
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            progress_label: "batch".to_string(),
            event_sender: None,
            progress_callback: None,
        }
    }
}

impl BatchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> BatchExecutorBuilder {
        BatchExecutorBuilder::default()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Process every item and collect the batch outcome.
    ///
    /// Each item is attempted up to `max_attempts` times with `retry_delay`
    /// between attempts; exhaustion becomes an [`ItemFailure`] in the report
    /// and never aborts the batch. Successful outputs come back in input
    /// order with failed positions filtered out.
    ///
    /// Empty input returns an empty report without touching the worker.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the batch machinery itself fails: a
    /// worker task panicked or was cancelled, or the semaphore closed while
    /// items were pending. Outstanding tasks are aborted before the error
    /// propagates.
    #[tracing::instrument(skip(self, items, worker), fields(total = items.len()))]
    pub async fn run<W>(
        &self,
        items: Vec<W::Input>,
        worker: Arc<W>,
    ) -> Result<BatchReport<W::Output>, ExecutorError>
    where
        W: Worker + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Ok(BatchReport::empty());
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut tasks: JoinSet<Result<(usize, TaskTerminal<W::Output>), ExecutorError>> =
            JoinSet::new();

        for (index, input) in items.into_iter().enumerate() {
            let worker = Arc::clone(&worker);
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let max_attempts = self.max_attempts;
            let retry_delay = self.retry_delay;
            let label = self.progress_label.clone();
            let event_sender = self.event_sender.clone();
            let progress_callback = self.progress_callback.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ExecutorError::SemaphoreClosed)?;

                let terminal = run_attempts(
                    worker.as_ref(),
                    index,
                    input,
                    max_attempts,
                    retry_delay,
                    event_sender.as_ref(),
                )
                .await;

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                let progress = ProgressEvent::new(label, done, total);
                if let Some(callback) = &progress_callback {
                    callback(progress.clone());
                }
                if let Some(sender) = &event_sender {
                    let _ = sender.send(Event::Progress(progress));
                }

                Ok((index, terminal))
            });
        }

        let mut slots: Vec<Option<W::Output>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        let mut failures: Vec<ItemFailure> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((index, TaskTerminal::Succeeded(output)))) => {
                    slots[index] = Some(output);
                }
                Ok(Ok((_, TaskTerminal::Failed(failure)))) => {
                    failures.push(failure);
                }
                Ok(Err(machinery)) => {
                    tasks.abort_all();
                    return Err(machinery);
                }
                Err(join_error) => {
                    tasks.abort_all();
                    return Err(ExecutorError::Join(join_error));
                }
            }
        }

        failures.sort_by_key(|failure| failure.index);
        Ok(BatchReport {
            outputs: slots.into_iter().flatten().collect(),
            failures,
            total,
        })
    }
}

/// Terminal state of one item after its retry loop.
enum TaskTerminal<T> {
    Succeeded(T),
    Failed(ItemFailure),
}

async fn run_attempts<W: Worker>(
    worker: &W,
    index: usize,
    input: W::Input,
    max_attempts: u32,
    retry_delay: Duration,
    event_sender: Option<&flume::Sender<Event>>,
) -> TaskTerminal<W::Output> {
    let mut last_error: Option<TaskError> = None;

    for attempt in 1..=max_attempts {
        let ctx = match event_sender {
            Some(sender) => TaskContext::with_sender(index, attempt, sender.clone()),
            None => TaskContext::new(index, attempt),
        };
        match worker.process(input.clone(), ctx).await {
            Ok(output) => return TaskTerminal::Succeeded(output),
            Err(error) => {
                if attempt < max_attempts {
                    tracing::debug!(index, attempt, error = %error, "attempt failed, retrying");
                    tokio::time::sleep(retry_delay).await;
                }
                last_error = Some(error);
            }
        }
    }

    let error = last_error.unwrap_or_else(|| TaskError::msg("no attempts were made"));
    tracing::warn!(index, attempts = max_attempts, error = %error, "item permanently failed");
    TaskTerminal::Failed(ItemFailure::new(index, max_attempts, error))
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`BatchExecutor`].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use sumweave::executor::BatchExecutor;
///
/// let executor = BatchExecutor::builder()
///     .concurrency_limit(2)
///     .max_attempts(1)
///     .retry_delay(Duration::from_millis(50))
///     .try_build()?;
/// assert_eq!(executor.concurrency_limit(), 2);
/// # Ok::<(), sumweave::executor::ExecutorError>(())
/// ```
pub struct BatchExecutorBuilder {
    concurrency_limit: usize,
    max_attempts: u32,
    retry_delay: Duration,
    progress_label: String,
    event_sender: Option<flume::Sender<Event>>,
    progress_callback: Option<ProgressCallback>,
}

impl Default for BatchExecutorBuilder {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            progress_label: "batch".to_string(),
            event_sender: None,
            progress_callback: None,
        }
    }
}

impl BatchExecutorBuilder {
    /// Maximum number of items in flight at once. Must be at least 1.
    #[must_use]
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Attempts per item before it is recorded as failed. Must be at least 1.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Fixed pause between an item's attempts.
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Label carried by emitted progress events.
    #[must_use]
    pub fn progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = label.into();
        self
    }

    /// Channel that receives worker task events and progress events.
    #[must_use]
    pub fn event_sender(mut self, sender: flume::Sender<Event>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Callback invoked after every item reaches a terminal state.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Validate the configuration and build the executor.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::ZeroConcurrency`] or
    /// [`ExecutorError::ZeroAttempts`] when a limit is below 1.
    pub fn try_build(self) -> Result<BatchExecutor, ExecutorError> {
        if self.concurrency_limit == 0 {
            return Err(ExecutorError::ZeroConcurrency);
        }
        if self.max_attempts == 0 {
            return Err(ExecutorError::ZeroAttempts);
        }
        Ok(BatchExecutor {
            concurrency_limit: self.concurrency_limit,
            max_attempts: self.max_attempts,
            retry_delay: self.retry_delay,
            progress_label: self.progress_label,
            event_sender: self.event_sender,
            progress_callback: self.progress_callback,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors from executor configuration or batch machinery.
///
/// Worker-level failures never surface here; they are recorded per item in
/// the [`BatchReport`].
#[derive(Debug, Error, Diagnostic)]
pub enum ExecutorError {
    #[error("concurrency_limit must be at least 1")]
    #[diagnostic(
        code(sumweave::executor::concurrency_limit),
        help("Use a limit of 1 for sequential execution.")
    )]
    ZeroConcurrency,

    #[error("max_attempts must be at least 1")]
    #[diagnostic(
        code(sumweave::executor::max_attempts),
        help("Use 1 attempt to disable retries.")
    )]
    ZeroAttempts,

    #[error("worker task join error: {0}")]
    #[diagnostic(code(sumweave::executor::join))]
    Join(#[from] JoinError),

    #[error("semaphore closed while items were pending")]
    #[diagnostic(code(sumweave::executor::semaphore_closed))]
    SemaphoreClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Worker for Echo {
        type Input = usize;
        type Output = usize;

        async fn process(&self, input: usize, _ctx: TaskContext) -> Result<usize, TaskError> {
            Ok(input)
        }
    }

    #[test]
    fn builder_rejects_zero_concurrency() {
        let result = BatchExecutor::builder().concurrency_limit(0).try_build();
        assert!(matches!(result, Err(ExecutorError::ZeroConcurrency)));
    }

    #[test]
    fn builder_rejects_zero_attempts() {
        let result = BatchExecutor::builder().max_attempts(0).try_build();
        assert!(matches!(result, Err(ExecutorError::ZeroAttempts)));
    }

    #[tokio::test]
    async fn empty_input_returns_empty_report() {
        let report = BatchExecutor::new()
            .run(Vec::<usize>::new(), Arc::new(Echo))
            .await
            .unwrap();
        assert_eq!(report.total, 0);
        assert!(report.outputs.is_empty());
        assert!(!report.is_degraded());
    }

    #[tokio::test]
    async fn outputs_preserve_input_order() {
        let report = BatchExecutor::new()
            .run(vec![3, 1, 4, 1, 5], Arc::new(Echo))
            .await
            .unwrap();
        assert_eq!(report.outputs, vec![3, 1, 4, 1, 5]);
        assert_eq!(report.total, 5);
    }
}
