//! Criterion benchmarks for ranking construction, position queries and fusion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sfl_core::localizer::{FaultLocalizer, FusingLocalizer};
use sfl_core::ranking::{NormalizationStrategy, NormalizedRanking, Ranking, RankingView};
use sfl_core::{Formula, FusionTechnique, SelectionTechnique};
use sfl_spectra::Spectra;

// ── Helpers ──────────────────────────────────────────────────────────

/// Deterministic spectra: trace `t` involves every node `n` with
/// `(n * 7 + t * 13) % 5 < 2`, failing every fourth trace.
fn synthetic_spectra(nodes: usize, traces: usize) -> Spectra<usize> {
    let spectra = Spectra::new();
    for t in 0..traces {
        spectra
            .add_trace(t % 4 != 0)
            .involve((0..nodes).filter(|n| (n * 7 + t * 13) % 5 < 2));
    }
    spectra
}

fn synthetic_ranking(nodes: usize) -> Ranking<usize> {
    let mut ranking = Ranking::new();
    for n in 0..nodes {
        // Coarse buckets so ties are common.
        ranking.rank(n, ((n * 31) % 97) as f64 / 10.0);
    }
    ranking
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking/rank");
    for &size in &[100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(synthetic_ranking(size)))
        });
    }
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking/metrics");
    for &size in &[100usize, 1_000, 10_000] {
        let ranking = synthetic_ranking(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                for n in (0..size).step_by(7) {
                    black_box(ranking.ranking_metrics(&n).ok());
                }
            })
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let ranking = synthetic_ranking(1_000);
    c.bench_function("ranking/normalize_zero_one", |b| {
        b.iter(|| {
            let normalized =
                NormalizedRanking::from_ranking(ranking.clone(), NormalizationStrategy::ZeroOne);
            black_box(normalized.ordered())
        })
    });
}

fn bench_localize(c: &mut Criterion) {
    let spectra = synthetic_spectra(500, 200);
    c.bench_function("localize/ochiai", |b| {
        b.iter(|| black_box(FaultLocalizer::<usize>::localize(&Formula::Ochiai, &spectra).ok()))
    });

    let fusion: FusingLocalizer<usize> = FusingLocalizer::new(
        NormalizationStrategy::ZeroOne,
        SelectionTechnique::OverlapRate,
        FusionTechnique::CombSum,
    );
    c.bench_function("localize/fusion_all_formulas", |b| {
        b.iter(|| black_box(fusion.fuse(&spectra).ok()))
    });
}

criterion_group!(benches, bench_rank, bench_metrics, bench_normalize, bench_localize);
criterion_main!(benches);
