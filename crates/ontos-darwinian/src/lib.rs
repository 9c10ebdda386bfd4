//! # Darwinian
//!
//! Genome evolution engine for Ontos.
//!
//! ## Fitness Formula
//!
//! ```text
//! η = w_s·success + w_e·entertainment + w_c·chaos_fit + w_t·transcend
//! chaos_fit = max(0, 1 − |chaos − chaos*| / chaos*)
//! ```
//!
//! Where the weights `w_*` and the optimal chaos level `chaos*` are
//! configuration ([`FitnessWeights`]), not code.
//!
//! ## Selection
//!
//! - [`Kernel::self_optimize`]: elitist hill climbing, a candidate replaces the
//!   current genome only if its fitness is at least as high
//! - [`Population::evolve_generation`]: parallel evaluation, top-k retention,
//!   refill by crossover between retained members

pub mod fitness;
pub mod genome;
pub mod kernel;
pub mod population;
pub mod selection;

use ontos_common::{
    OntosError, Result, DEFAULT_MUTATION_RATE, DEFAULT_REPRODUCTION_MUTATION_RATE,
};
use serde::{Deserialize, Serialize};

pub use fitness::{
    appraisal::ActionAppraisal,
    calculator::{FitnessCalculator, FitnessWeights, PerformanceSignals},
    provider::{ConstantSignals, SignalsProvider},
};
pub use genome::{
    crossover::CrossoverStrategy,
    gene::{Gene, GeneType},
    Genome,
};
pub use kernel::{mapping::GeneTraitMapping, Kernel, KernelSnapshot, OptimizationReport};
pub use population::{GenerationReport, Population};
pub use selection::policy::ElitistSelection;

/// Darwinian configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarwinianConfig {
    /// Mutation rate used by self-optimization
    pub mutation_rate: f64,
    /// Mutation rate applied to offspring after crossover
    pub reproduction_mutation_rate: f64,
    /// Gene recombination strategy
    pub crossover: CrossoverStrategy,
    /// Multi-objective fitness weights
    pub weights: FitnessWeights,
    /// Gene → trait projection
    pub trait_mapping: GeneTraitMapping,
}

impl Default for DarwinianConfig {
    fn default() -> Self {
        Self {
            mutation_rate: DEFAULT_MUTATION_RATE,
            reproduction_mutation_rate: DEFAULT_REPRODUCTION_MUTATION_RATE,
            crossover: CrossoverStrategy::default(),
            weights: FitnessWeights::default(),
            trait_mapping: GeneTraitMapping::default(),
        }
    }
}

impl DarwinianConfig {
    pub fn validate(&self) -> Result<()> {
        validate_rate("mutation_rate", self.mutation_rate)?;
        validate_rate("reproduction_mutation_rate", self.reproduction_mutation_rate)?;
        self.weights.validate()?;
        self.trait_mapping.validate()
    }
}

/// Mutation rates live in (0, 1]
pub(crate) fn validate_rate(name: &str, rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0.0 && rate <= 1.0 {
        Ok(())
    } else {
        Err(OntosError::invalid(format!(
            "{} must be in (0, 1], got {}",
            name, rate
        )))
    }
}
