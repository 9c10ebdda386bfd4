//! Ontos evolution benchmarks
//!
//! - Genome mutation and crossover
//! - Kernel self-optimization
//! - Parallel population generations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ontos_common::TraitVector;
use ontos_darwinian::{
    ConstantSignals, CrossoverStrategy, Genome, Kernel, PerformanceSignals, Population,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

// ============ GENOME BENCHMARKS ============

fn bench_genome(c: &mut Criterion) {
    let mut group = c.benchmark_group("genome");
    let mut rng = StdRng::seed_from_u64(1);
    let a = Genome::standard();
    let b = a.mutate(0.5, &mut rng).unwrap();

    group.bench_function("mutate", |bench| {
        bench.iter(|| black_box(a.mutate(black_box(0.15), &mut rng).unwrap()));
    });

    group.bench_function("crossover_mixed", |bench| {
        bench.iter(|| black_box(a.crossover(&b, CrossoverStrategy::Mixed, &mut rng).unwrap()));
    });

    group.finish();
}

// ============ KERNEL BENCHMARKS ============

fn bench_self_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel");
    let provider = |genome: &Genome, _round: u64| PerformanceSignals {
        success_rate: genome.gene_value("chaos_coefficient").unwrap_or(0.0),
        ..PerformanceSignals::default()
    };

    for iterations in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*iterations as u64));
        group.bench_with_input(
            BenchmarkId::new("self_optimize", iterations),
            iterations,
            |bench, &iterations| {
                let mut rng = StdRng::seed_from_u64(7);
                bench.iter(|| {
                    let mut kernel = Kernel::standard();
                    black_box(kernel.self_optimize(iterations, &provider, &mut rng).unwrap())
                });
            },
        );
    }

    group.bench_function("sync_to_traits", |bench| {
        let kernel = Kernel::standard();
        let mut traits = TraitVector::standard();
        bench.iter(|| black_box(kernel.sync_to_traits(&mut traits).unwrap()));
    });

    group.finish();
}

// ============ POPULATION BENCHMARKS ============

fn bench_population(c: &mut Criterion) {
    let mut group = c.benchmark_group("population");
    group.measurement_time(Duration::from_secs(10));

    for size in [8usize, 64, 256].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("evolve_generation", size),
            size,
            |bench, &size| {
                let mut rng = StdRng::seed_from_u64(42);
                let mut population =
                    Population::from_seed(&Kernel::standard(), size, size / 4, &mut rng).unwrap();
                let provider = ConstantSignals::default();
                bench.iter(|| black_box(population.evolve_generation(&provider, &mut rng).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(genome, bench_genome);
criterion_group!(kernel, bench_self_optimize);
criterion_group!(population, bench_population);

criterion_main!(genome, kernel, population);
