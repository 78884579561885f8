//! Offline summarization demo with local workers.
//!
//! Runs the full pipeline over an embedded article without touching a
//! provider: an extractive worker keeps each chunk's lead sentences, and a
//! local merger stitches the partials back together. Progress, task events,
//! and reduction diagnostics stream to stdout through the event bus.
//!
//! Running this demo:
//! ```bash
//! cargo run --example summarize_demo
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use miette::Result;
use tracing::info;

use sumweave::events::EventBus;
use sumweave::executor::BatchExecutor;
use sumweave::failures::TaskError;
use sumweave::pipeline::SummaryPipeline;
use sumweave::reducer::HierarchicalReducer;
use sumweave::segmenter::{Segmenter, split_sentences};
use sumweave::telemetry::init_tracing;
use sumweave::worker::{MergeContext, MergeWorker, TaskContext, Worker};

const ARTICLE: &str = "\
# Migrating the Metrics Store

Our metrics pipeline originally wrote every sample to a single relational \
table. That held up for two years. Past forty thousand samples per second \
the write path saturated, and nightly rollups started missing their window.

The first attempt sharded the table by metric name. Hot metrics defeated \
it immediately. One busy service produced a third of all samples, so its \
shard carried a third of all load and the rest sat idle.

## The New Write Path

The replacement buffers samples in memory per source, then flushes \
fixed-size blocks to an append-only log. Flushes are sequential writes, \
so the disk does what disks are good at. A background compactor folds \
blocks into sorted runs once they go cold.

Reads changed less than expected. The query layer already spoke in time \
ranges, and sorted runs answer range scans directly. The one regression \
was point lookups for freshly written samples, which now check the \
in-memory buffer first.

Cutover ran both systems in parallel for six weeks. Every query went to \
both stores and a comparator logged any divergence. We found two bugs \
this way, both in timestamp rounding at block boundaries.

## What We Kept

The relational store still owns metadata: retention rules, dashboards, \
and alert definitions. Those tables are small, change rarely, and enjoy \
transactions. Moving them would have bought nothing.

Throughput now holds at two hundred thousand samples per second on the \
same hardware. The compactor lags during regional failover drills, and \
catching it up remains a manual step. That is the next thing to fix.";

/// Extractive stand-in for a model: keeps each chunk's first two sentences.
struct LeadSentenceWorker;

#[async_trait]
impl Worker for LeadSentenceWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, ctx: TaskContext) -> Result<String, TaskError> {
        ctx.emit(
            "extract",
            format!("condensing {} chars", input.chars().count()),
        )?;
        let lead: String = split_sentences(&input).into_iter().take(2).collect();
        Ok(lead.trim().to_string())
    }
}

/// Stitches partial extracts into one running text.
struct StitchMerger;

#[async_trait]
impl MergeWorker for StitchMerger {
    async fn merge(&self, combined: String, ctx: MergeContext) -> Result<String, TaskError> {
        ctx.emit(
            "stitch",
            format!("folding {} chars of partials", combined.chars().count()),
        )?;
        Ok(combined.replace("\n\n", " "))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Stream everything the pipeline emits to stdout.
    let bus = EventBus::default();
    bus.listen_for_events();

    let segmenter = Segmenter::builder()
        .max_chunk_size(300)
        .overlap_size(40)
        .try_build()?;
    let executor = BatchExecutor::builder()
        .concurrency_limit(3)
        .progress_label("chunks")
        .event_sender(bus.get_sender())
        .try_build()?;
    let reducer = HierarchicalReducer::builder()
        .group_size(3)
        .event_sender(bus.get_sender())
        .try_build()?;

    let pipeline = SummaryPipeline::builder(Arc::new(LeadSentenceWorker), Arc::new(StitchMerger))
        .segmenter(segmenter)
        .executor(executor)
        .reducer(reducer)
        .coalesce_limit(0)
        .event_sender(bus.get_sender())
        .build();

    let outcome = pipeline.run(ARTICLE).await?;
    bus.stop_listener().await;

    info!(
        run_id = %outcome.run_id,
        chunks = outcome.chunk_count,
        failed = outcome.failures.len(),
        elapsed = ?outcome.elapsed,
        "pipeline finished"
    );

    println!("\n=== Extractive summary ===\n{}", outcome.summary);
    Ok(())
}
