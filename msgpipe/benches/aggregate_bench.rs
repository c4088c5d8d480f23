//! Benchmarks for failure aggregation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use msgpipe::failure::{FailureCollector, ModuleFailure, ProcessorFailure};
use msgpipe::processor::ProcessorRef;

fn aggregate_benchmark(c: &mut Criterion) {
    let processor = ProcessorRef::detached("SenderModule");
    let causes: Vec<ModuleFailure> = (0..16)
        .map(|i| ModuleFailure::with_trace(format!("failure {i}"), format!("at L{i}")))
        .collect();

    c.bench_function("build_16_causes", |b| {
        b.iter(|| ProcessorFailure::build(black_box(&processor), black_box(causes.clone())))
    });

    c.bench_function("collect_and_drain_16", |b| {
        b.iter(|| {
            let mut collector = FailureCollector::new();
            for cause in &causes {
                collector.record(cause.clone());
            }
            black_box(collector.drain())
        })
    });
}

criterion_group!(benches, aggregate_benchmark);
criterion_main!(benches);
