//! Benchmarks for the hot paths: segmentation, reassembly, and batch fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use sumweave::executor::BatchExecutor;
use sumweave::failures::TaskError;
use sumweave::reassembler::Reassembler;
use sumweave::segmenter::Segmenter;
use sumweave::worker::{TaskContext, Worker};

const PARAGRAPH_COUNTS: &[usize] = &[16, 64, 256];
const BATCH_SIZES: &[usize] = &[8, 32, 128];

/// Echo worker, so the measurement isolates the executor machinery.
struct EchoWorker;

#[async_trait]
impl Worker for EchoWorker {
    type Input = String;
    type Output = String;

    async fn process(&self, input: String, _ctx: TaskContext) -> Result<String, TaskError> {
        Ok(input)
    }
}

fn synthetic_document(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|p| {
            format!(
                "Paragraph {p} opens with context. It continues with a second sentence. \
                 A third sentence closes the thought."
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn segmenter_throughput(c: &mut Criterion) {
    let segmenter = Segmenter::builder()
        .max_chunk_size(400)
        .overlap_size(60)
        .try_build()
        .expect("segmenter");
    let mut group = c.benchmark_group("segmenter_segment");

    for &paragraphs in PARAGRAPH_COUNTS {
        let doc = synthetic_document(paragraphs);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &doc, |b, doc| {
            b.iter(|| segmenter.segment(doc));
        });
    }

    group.finish();
}

fn reassembler_throughput(c: &mut Criterion) {
    let segmenter = Segmenter::builder()
        .max_chunk_size(400)
        .overlap_size(60)
        .try_build()
        .expect("segmenter");
    let reassembler = Reassembler::new().with_overlap_size(60);
    let mut group = c.benchmark_group("reassembler_merge");

    for &paragraphs in PARAGRAPH_COUNTS {
        let doc = synthetic_document(paragraphs);
        let chunks: Vec<String> = segmenter
            .segment(&doc)
            .into_iter()
            .map(|chunk| chunk.text)
            .collect();
        group.throughput(Throughput::Elements(chunks.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &chunks,
            |b, chunks| {
                b.iter(|| reassembler.merge(chunks));
            },
        );
    }

    group.finish();
}

fn executor_throughput(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("executor_batch");

    for &batch in BATCH_SIZES {
        let inputs: Vec<String> = (0..batch).map(|i| format!("item-{i}")).collect();
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch),
            &inputs,
            |b, inputs| {
                let executor = BatchExecutor::builder()
                    .concurrency_limit(8)
                    .try_build()
                    .expect("executor");
                b.to_async(&runtime).iter(|| async {
                    executor
                        .run(inputs.clone(), Arc::new(EchoWorker))
                        .await
                        .expect("run")
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    segmenter_throughput,
    reassembler_throughput,
    executor_throughput
);
criterion_main!(benches);
