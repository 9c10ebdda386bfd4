//! End-to-end evolution scenarios

use std::sync::Arc;

use ontos_common::{TraitVector, CHAOTIC, NO_HARM_INTENT};
use ontos_darwinian::{
    ConstantSignals, CrossoverStrategy, DarwinianConfig, Gene, Genome, Kernel, PerformanceSignals,
    Population,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn single_gene_kernel(name: &str, value: f64, config: &Arc<DarwinianConfig>) -> Kernel {
    let genome = Genome::new(vec![Gene::coefficient(name, value).unwrap()]).unwrap();
    Kernel::new(genome, config.clone()).unwrap()
}

#[test]
fn self_optimize_twenty_rounds_with_constant_signals() {
    let config = Arc::new(DarwinianConfig::default());
    let mut kernel = single_gene_kernel("chaos_coefficient", 0.5, &config);
    let initial = kernel.fitness();
    let mut rng = StdRng::seed_from_u64(2020);

    kernel
        .self_optimize(20, &ConstantSignals::default(), &mut rng)
        .unwrap();

    let history = kernel.fitness_history();
    assert!(history.len() <= 20);
    assert!(history.windows(2).all(|w| w[0] <= w[1]));
    assert!(kernel.fitness() >= initial);
}

#[test]
fn reproduce_hundred_times_is_bounded_and_varied() {
    let config = Arc::new(DarwinianConfig::default());
    let a = single_gene_kernel("g1", 0.2, &config);
    let b = single_gene_kernel("g1", 0.8, &config);
    let mut rng = StdRng::seed_from_u64(77);

    let children: Vec<f64> = (0..100)
        .map(|_| a.reproduce(&b, &mut rng).unwrap().genome().gene_value("g1").unwrap())
        .collect();

    assert!(children.iter().all(|v| (0.0..=1.0).contains(v)));
    let mean = children.iter().sum::<f64>() / children.len() as f64;
    let variance = children.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / children.len() as f64;
    assert!(variance > 0.01, "variance = {}", variance);
    assert!(children.iter().any(|v| *v != 0.2 && *v != 0.8));
}

#[test]
fn blend_only_configuration_converges_on_the_midpoint() {
    let config = Arc::new(DarwinianConfig {
        crossover: CrossoverStrategy::Blend,
        ..DarwinianConfig::default()
    });
    let a = single_gene_kernel("g1", 0.2, &config);
    let b = single_gene_kernel("g1", 0.8, &config);
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..50 {
        let v = a.reproduce(&b, &mut rng).unwrap().genome().gene_value("g1").unwrap();
        // One mutation at rate 0.05 over a unit span moves at most 0.05
        assert!((v - 0.5).abs() <= 0.05 + 1e-12);
    }
}

#[test]
fn population_optimizes_toward_signal_and_syncs_safely() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut population = Population::from_seed(&Kernel::standard(), 10, 3, &mut rng).unwrap();
    let provider = |g: &Genome, _round: u64| PerformanceSignals {
        success_rate: 1.0 - g.gene_value("chaos_coefficient").unwrap_or(1.0),
        ..PerformanceSignals::default()
    };

    let reports = population.evolve(30, &provider, &mut rng).unwrap();
    assert!(reports.last().unwrap().best_fitness > reports[0].best_fitness);

    let best = population.best().unwrap();
    let mut traits = TraitVector::standard();
    best.sync_to_traits(&mut traits).unwrap();
    assert!(traits.get(CHAOTIC).unwrap() < 0.95);
    assert_eq!(traits.floor(NO_HARM_INTENT), Some(1.0));
}
