use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;

use tcrforge_core::filter::SurvivalFilter;
use tcrforge_core::generation::{FallbackGenerator, FallbackShape};
use tcrforge_core::scoring::{MaskedLanguageModel, PllScorer, Token, Vocabulary};
use tcrforge_core::sequence::translate;
use tcrforge_core::types::{Sequence, TcrForgeError};
use tcrforge_core::worker::WorkerPool;

mod criterion_config;
use criterion_config::configure_criterion;

/// Uniform distribution at every position; isolates masking overhead.
struct FlatModel {
    vocabulary: Vocabulary,
}

impl MaskedLanguageModel for FlatModel {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn predict_masked(&self, _tokens: &[Token], _position: usize) -> Result<Vec<f64>, TcrForgeError> {
        Ok(vec![1.0; self.vocabulary.len()])
    }
}

fn candidates(count: usize) -> Vec<Sequence> {
    FallbackGenerator::new(FallbackShape::Plain { min: 10, max: 20 }, Some(42)).generate(count)
}

fn bench_translation(c: &mut Criterion) {
    let dna = "TGCGCCAGCAGCTTAGGCCAGGAGACCCAGTACTTCGGCTAA".repeat(4);
    c.bench_function("translate_cdr3", |b| b.iter(|| translate(black_box(&dna))));
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("survival_filter");
    for count in [100, 1_000, 10_000] {
        let batch = candidates(count);
        group.throughput(Throughput::Elements(count as u64));
        for threads in [1, 4] {
            let pool = Arc::new(WorkerPool::new(Some(threads)).expect("pool"));
            let filter = SurvivalFilter::default().with_pool(pool);
            group.bench_with_input(
                BenchmarkId::new(format!("{threads}_threads"), count),
                &batch,
                |b, batch| b.iter(|| filter.apply_all(black_box(batch))),
            );
        }
    }
    group.finish();
}

fn bench_pll(c: &mut Criterion) {
    let mut group = c.benchmark_group("pll_scoring");
    let batch = candidates(200);
    group.throughput(Throughput::Elements(batch.len() as u64));
    for threads in [1, 4] {
        let pool = Arc::new(WorkerPool::new(Some(threads)).expect("pool"));
        let mut scorer = PllScorer::with_model(Box::new(FlatModel {
            vocabulary: Vocabulary::standard(),
        }))
        .with_pool(pool);
        group.bench_function(BenchmarkId::new("flat_model", threads), |b| {
            b.iter(|| scorer.score_sequences(black_box(&batch)))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_translation, bench_filter, bench_pll
}
criterion_main!(benches);
