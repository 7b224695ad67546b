//! Resolution benchmarks: fast-path exact lookup, heavy-path rescoring,
//! and the text normalization front door.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use taxon_engine::{
    AliasManager, CancellationToken, EngineConfig, MatchContext, PrecomputePipeline,
    ResolverEngine,
};

fn master_list(species: usize) -> String {
    let mut yaml = String::from("species:\n");
    for i in 0..species {
        yaml.push_str(&format!(
            "  - id: \"{i}\"\n    canonical: \"Soort Nummer {i}\"\n    aliases: [vogel{i}, kwetteraar{i}]\n"
        ));
    }
    yaml
}

fn engine(species: usize) -> ResolverEngine {
    let artifacts = PrecomputePipeline::default()
        .build(&[("bench.yaml".to_string(), master_list(species).into_bytes())])
        .unwrap();
    let manager = Arc::new(AliasManager::new());
    manager.install(&artifacts.corpus_bytes).unwrap();
    ResolverEngine::new(manager, EngineConfig::default())
}

fn bench_fast_path(c: &mut Criterion) {
    let engine = engine(500);
    let context = MatchContext::empty();
    let cancel = CancellationToken::new();

    c.bench_function("fast_path_exact_hit", |b| {
        b.iter(|| {
            let result = engine.resolve(black_box("vogel250"), &context, &cancel);
            black_box(result)
        })
    });
}

fn bench_heavy_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("heavy_path");
    let context = MatchContext::empty();
    let cancel = CancellationToken::new();

    for &species in &[100usize, 500, 2000] {
        let engine = engine(species);
        group.bench_with_input(
            BenchmarkId::from_parameter(species),
            &species,
            |b, _| {
                b.iter(|| {
                    // Misspelled alias: misses the exact map, scores candidates.
                    let result = engine.resolve(black_box("kweteraar250"), &context, &cancel);
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_normalization(c: &mut Criterion) {
    c.bench_function("normalize_hypothesis", |b| {
        b.iter(|| black_box(taxon_engine::text::normalize(black_box("  Alk  óf Zeekoet?! "))))
    });
}

fn bench_precompute(c: &mut Criterion) {
    let sources = vec![("bench.yaml".to_string(), master_list(500).into_bytes())];
    let pipeline = PrecomputePipeline::default();

    c.bench_function("precompute_500_species", |b| {
        b.iter(|| black_box(pipeline.build(black_box(&sources))))
    });
}

criterion_group!(
    benches,
    bench_fast_path,
    bench_heavy_path,
    bench_normalization,
    bench_precompute
);
criterion_main!(benches);
