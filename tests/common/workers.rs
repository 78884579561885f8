//! Worker and merger fixtures shared across integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sumweave::failures::TaskError;
use sumweave::worker::{MergeContext, MergeWorker, TaskContext, Worker};

/// Uppercases its input. The smallest worker that does visible work.
#[derive(Debug, Clone, Default)]
pub struct UppercaseWorker;

#[async_trait]
impl Worker for UppercaseWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, _ctx: TaskContext) -> Result<String, TaskError> {
        Ok(input.to_uppercase())
    }
}

/// Fails every attempt below `succeed_on_attempt`, then succeeds.
///
/// Counts every invocation so tests can assert the exact retry cost.
#[derive(Clone)]
pub struct FlakyWorker {
    pub succeed_on_attempt: u32,
    calls: Arc<AtomicUsize>,
}

impl FlakyWorker {
    pub fn new(succeed_on_attempt: u32) -> Self {
        Self {
            succeed_on_attempt,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Worker for FlakyWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, ctx: TaskContext) -> Result<String, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if ctx.attempt < self.succeed_on_attempt {
            return Err(TaskError::msg(format!(
                "transient failure on attempt {}",
                ctx.attempt
            )));
        }
        Ok(format!("{input}@{}", ctx.attempt))
    }
}

/// Emits one task event per attempt, then echoes its input.
#[derive(Debug, Clone, Default)]
pub struct EmittingWorker;

#[async_trait]
impl Worker for EmittingWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, ctx: TaskContext) -> Result<String, TaskError> {
        ctx.emit("work", format!("processing {input}"))?;
        Ok(input)
    }
}

/// Fails every attempt for the listed item indices, succeeds for the rest.
#[derive(Debug, Clone, Default)]
pub struct SelectiveFailWorker {
    pub fail_indices: Vec<usize>,
}

impl SelectiveFailWorker {
    pub fn failing(fail_indices: Vec<usize>) -> Self {
        Self { fail_indices }
    }
}

#[async_trait]
impl Worker for SelectiveFailWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, ctx: TaskContext) -> Result<String, TaskError> {
        if self.fail_indices.contains(&ctx.index) {
            return Err(TaskError::msg(format!("item {} always fails", ctx.index)));
        }
        Ok(format!("done:{input}"))
    }
}

/// Records the high-water mark of simultaneously running `process` calls.
#[derive(Clone)]
pub struct ConcurrencyProbe {
    pub delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Worker for ConcurrencyProbe {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, _ctx: TaskContext) -> Result<String, TaskError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(input)
    }
}

/// Sleeps longer for earlier items so completion order inverts input order.
#[derive(Debug, Clone, Default)]
pub struct StaggerWorker;

#[async_trait]
impl Worker for StaggerWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, ctx: TaskContext) -> Result<String, TaskError> {
        let millis = 50u64.saturating_sub(ctx.index as u64 * 10);
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(format!("{}:{input}", ctx.index))
    }
}

/// Prepends a fixed label. Stands in for the final polish pass.
#[derive(Debug, Clone)]
pub struct PrefixWorker {
    pub prefix: &'static str,
}

#[async_trait]
impl Worker for PrefixWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, _ctx: TaskContext) -> Result<String, TaskError> {
        Ok(format!("{}{input}", self.prefix))
    }
}

/// Joins group members with single spaces and records every call's
/// `(level, group)` position in order.
#[derive(Clone, Default)]
pub struct CountingMerger {
    calls: Arc<Mutex<Vec<(usize, usize)>>>,
}

impl CountingMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MergeWorker for CountingMerger {
    async fn merge(&self, combined: String, ctx: MergeContext) -> Result<String, TaskError> {
        self.calls.lock().unwrap().push((ctx.level, ctx.group));
        Ok(combined.replace("\n\n", " "))
    }
}

/// Succeeds until the nth call (1-based), which fails.
#[derive(Clone)]
pub struct FailingMerger {
    pub fail_on_call: usize,
    calls: Arc<AtomicUsize>,
}

impl FailingMerger {
    pub fn new(fail_on_call: usize) -> Self {
        Self {
            fail_on_call,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MergeWorker for FailingMerger {
    async fn merge(&self, combined: String, _ctx: MergeContext) -> Result<String, TaskError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call {
            return Err(TaskError::msg("merger gave up"));
        }
        Ok(combined.replace("\n\n", " "))
    }
}
