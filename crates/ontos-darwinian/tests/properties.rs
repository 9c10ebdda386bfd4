//! Property tests for the evolution core

use std::sync::Arc;

use ontos_common::{
    TraitVector, CHAOTIC, CONSTRUCTIVE_CHAOS, NO_HARM_INTENT, RESPECT_BOUNDARIES, SARCASM,
};
use ontos_darwinian::{
    ConstantSignals, CrossoverStrategy, DarwinianConfig, Gene, GeneType, Genome, Kernel,
    PerformanceSignals,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn assert_floors(traits: &TraitVector) {
    assert_eq!(traits.floor(NO_HARM_INTENT), Some(1.0));
    assert!(traits.floor(RESPECT_BOUNDARIES).unwrap() >= 0.95);
    assert!(traits.floor(CONSTRUCTIVE_CHAOS).unwrap() >= 0.90);
}

fn arb_gene(index: usize) -> impl Strategy<Value = Gene> {
    (0.0f64..10.0, 0.0f64..10.0, 0.0f64..=1.0).prop_map(move |(a, b, t)| {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let value = (min + t * (max - min)).min(max);
        Gene::new(&format!("g{}", index), GeneType::Coefficient, value, min, max).unwrap()
    })
}

fn arb_genome() -> impl Strategy<Value = Genome> {
    (1usize..8)
        .prop_flat_map(|n| (0..n).map(arb_gene).collect::<Vec<_>>())
        .prop_map(|genes| Genome::new(genes).unwrap())
}

#[derive(Debug, Clone)]
enum Op {
    Mutate(f64),
    Crossover,
    Inherit(f64),
    Sync,
    Optimize(usize),
    Evaluate(f64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.01f64..=1.0).prop_map(Op::Mutate),
        Just(Op::Crossover),
        (0.0f64..=1.0).prop_map(Op::Inherit),
        Just(Op::Sync),
        (1usize..5).prop_map(Op::Optimize),
        (0.0f64..=1.0).prop_map(Op::Evaluate),
    ]
}

proptest! {
    #[test]
    fn mutate_keeps_genes_in_range(genome in arb_genome(), rate in 0.0001f64..=1.0, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let child = genome.mutate(rate, &mut rng).unwrap();
        prop_assert!(child.verify().is_ok());
        for gene in child.genes() {
            let parent = genome.gene(gene.name()).unwrap();
            prop_assert!(gene.value() >= parent.min() && gene.value() <= parent.max());
        }
        prop_assert_eq!(child.generation(), genome.generation() + 1);
    }

    #[test]
    fn crossover_keeps_genes_between_bounds(genome in arb_genome(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let other = genome.mutate(1.0, &mut rng).unwrap();
        for strategy in [CrossoverStrategy::Mixed, CrossoverStrategy::Uniform, CrossoverStrategy::Blend] {
            let child = genome.crossover(&other, strategy, &mut rng).unwrap();
            prop_assert!(child.verify().is_ok());
            for gene in child.genes() {
                let a = genome.gene_value(gene.name()).unwrap();
                let b = other.gene_value(gene.name()).unwrap();
                prop_assert!(gene.value() >= a.min(b) - 1e-12 && gene.value() <= a.max(b) + 1e-12);
            }
        }
    }

    #[test]
    fn fitness_history_is_monotonic(
        rounds in proptest::collection::vec(1usize..15, 1..5),
        chaos in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut kernel = Kernel::standard();
        let provider = ConstantSignals(PerformanceSignals { chaos_level: chaos, ..PerformanceSignals::default() });
        for iterations in rounds {
            kernel.self_optimize(iterations, &provider, &mut rng).unwrap();
        }
        prop_assert!(kernel.fitness_history().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn floors_survive_any_sequence(ops in proptest::collection::vec(arb_op(), 1..25), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = Arc::new(DarwinianConfig::default());
        let mut kernel = Kernel::new(Genome::standard(), config.clone()).unwrap();
        let partner = Kernel::new(Genome::standard(), config).unwrap();
        let mut traits = TraitVector::standard();
        // Score by the chaos gene so optimization moves the genome around
        let provider = |g: &Genome, _round: u64| PerformanceSignals {
            entertainment: g.gene_value("chaos_coefficient").unwrap_or(0.0),
            ..PerformanceSignals::default()
        };

        for op in ops {
            match op {
                Op::Mutate(rate) => kernel.mutate(rate, &mut rng).unwrap(),
                Op::Crossover => kernel = kernel.reproduce(&partner, &mut rng).unwrap(),
                Op::Inherit(factor) => traits = traits.inherit(factor, &mut rng).unwrap(),
                Op::Sync => {
                    kernel.sync_to_traits(&mut traits).unwrap();
                }
                Op::Optimize(n) => {
                    kernel.self_optimize(n, &provider, &mut rng).unwrap();
                }
                Op::Evaluate(entertainment) => {
                    let signals = ConstantSignals(PerformanceSignals {
                        entertainment,
                        ..PerformanceSignals::default()
                    });
                    kernel.evaluate(&signals, 0);
                }
            }
            assert_floors(&traits);
            let history = kernel.fitness_history();
            prop_assert!(history.windows(2).all(|w| w[0] <= w[1]), "history {:?}", history);
            if let Some(&tail) = history.last() {
                prop_assert!(tail <= kernel.fitness());
            }
            prop_assert!(kernel.genome().verify().is_ok());
            for (name, value) in traits.traits() {
                prop_assert!((0.0..=1.0).contains(value), "{} = {}", name, value);
            }
        }
    }

    #[test]
    fn sync_mirrors_mapped_genes(seed in any::<u64>(), rate in 0.01f64..=1.0) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut kernel = Kernel::standard();
        kernel.mutate(rate, &mut rng).unwrap();
        let mut traits = TraitVector::standard();
        kernel.sync_to_traits(&mut traits).unwrap();
        prop_assert_eq!(traits.get(CHAOTIC), kernel.genome().gene_value("chaos_coefficient"));
        prop_assert_eq!(traits.get(SARCASM), kernel.genome().gene_value("sarcasm_coefficient"));
    }
}
