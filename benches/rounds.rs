//! Round throughput for the three algorithms.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dcopsim::prelude::*;

fn instance(agents: usize) -> DcopInstance {
    GeneratorConfig::new(agents, 10)
        .with_density(0.2, 1.0)
        .with_seed(42)
        .generate()
        .unwrap()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for agents in [30, 100, 300] {
        group.bench_with_input(BenchmarkId::from_parameter(agents), &agents, |b, &agents| {
            b.iter(|| instance(black_box(agents)))
        });
    }
    group.finish();
}

fn bench_rounds(c: &mut Criterion) {
    let instance = instance(100);
    let mut group = c.benchmark_group("rounds");
    group.throughput(Throughput::Elements(50));

    for algorithm in ["dsa", "mgm", "mgm2"] {
        for parallel in [false, true] {
            let id = format!("{}_{}", algorithm, if parallel { "par" } else { "seq" });
            group.bench_function(id, |b| {
                b.iter(|| {
                    let mut config = SimConfig::default().with_algorithm(algorithm).with_seed(7);
                    if !parallel {
                        config = config.sequential();
                    }
                    let mut sim = Simulation::new(&instance, config).unwrap();
                    sim.run(black_box(50));
                    sim.final_global_cost()
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_rounds);
criterion_main!(benches);
