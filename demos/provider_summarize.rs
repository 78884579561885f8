//! Provider-backed document summarization.
//!
//! Reads a document (path as the first argument, stdin-free), segments it,
//! summarizes the chunks through an OpenAI-compatible endpoint, merges the
//! partials, and polishes the result. Live progress streams to stdout.
//!
//! Configuration comes from the environment (or a `.env` file):
//! - `SUMWEAVE_PROVIDER`: `openai` (default) or `deepseek`
//! - `OPENAI_API_KEY` / `DEEPSEEK_API_KEY`: credentials for the provider
//! - `OPENAI_API_BASE` / `DEEPSEEK_API_BASE`: optional endpoint override
//! - `SUMWEAVE_STYLE`: `concise`, `standard` (default), or `detailed`
//!
//! Running this demo:
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run --example provider_summarize -- paper.txt
//! ```

use std::sync::Arc;

use miette::{IntoDiagnostic, Result, miette};
use tracing::info;

use sumweave::events::EventBus;
use sumweave::executor::BatchExecutor;
use sumweave::failures::pretty_print;
use sumweave::pipeline::{SummaryPipeline, SummaryStyle};
use sumweave::providers::{ChatClient, ProviderConfig};
use sumweave::telemetry::init_tracing;

fn style_from_env() -> SummaryStyle {
    match std::env::var("SUMWEAVE_STYLE").as_deref() {
        Ok("concise") => SummaryStyle::concise(),
        Ok("detailed") => SummaryStyle::detailed(),
        _ => SummaryStyle::standard(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    miette::set_panic_hook();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| miette!("usage: provider_summarize <document.txt>"))?;
    let document = std::fs::read_to_string(&path).into_diagnostic()?;

    let config = ProviderConfig::from_env()?;
    info!(model = %config.model, api_base = %config.api_base, "provider configured");
    let client = Arc::new(ChatClient::new(config)?);

    let bus = EventBus::default();
    bus.listen_for_events();

    let executor = BatchExecutor::builder()
        .concurrency_limit(4)
        .progress_label("chunks")
        .event_sender(bus.get_sender())
        .try_build()?;

    let pipeline = SummaryPipeline::with_provider(client, style_from_env())
        .executor(executor)
        .event_sender(bus.get_sender())
        .build();

    let outcome = pipeline.run(&document).await?;
    bus.stop_listener().await;

    info!(
        run_id = %outcome.run_id,
        chunks = outcome.chunk_count,
        failed = outcome.failures.len(),
        elapsed = ?outcome.elapsed,
        "summary ready"
    );

    if outcome.is_degraded() {
        eprintln!("some chunks failed and are missing from the summary:");
        eprintln!("{}", pretty_print(&outcome.failures));
    }

    println!("{}", outcome.summary);
    Ok(())
}
