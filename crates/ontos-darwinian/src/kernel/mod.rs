//! Kernel - owns one genome and its fitness history
//!
//! ```text
//!   idle ──self_optimize(&mut)──► optimizing ──(iterations done)──► idle
//! ```
//!
//! The optimizing state is the exclusive borrow held by `self_optimize`. All
//! rounds work on a staged genome and history; the kernel is only written
//! once the loop has finished and the result verified.

pub mod mapping;

use std::sync::Arc;

use ontos_common::{OntosError, Result, TraitVector};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::fitness::provider::SignalsProvider;
use crate::genome::Genome;
use crate::DarwinianConfig;

/// Outcome of one `self_optimize` call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub fitness_before: f64,
    pub fitness_after: f64,
    pub improvement: f64,
    /// Candidates that replaced the current genome
    pub accepted: usize,
    pub rounds: usize,
    pub generation: u64,
}

/// Persisted kernel state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSnapshot {
    pub genome: Genome,
    #[serde(default)]
    pub fitness_history: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Kernel {
    genome: Genome,
    fitness_history: Vec<f64>,
    config: Arc<DarwinianConfig>,
}

impl PartialEq for Kernel {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome && self.fitness_history == other.fitness_history
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::standard()
    }
}

impl Kernel {
    pub fn new(genome: Genome, config: Arc<DarwinianConfig>) -> Result<Self> {
        config.validate()?;
        genome.verify()?;
        Ok(Self {
            genome,
            fitness_history: Vec::new(),
            config,
        })
    }

    /// Standard seed genome under the default configuration
    pub fn standard() -> Self {
        Self {
            genome: Genome::standard(),
            fitness_history: Vec::new(),
            config: Arc::new(DarwinianConfig::default()),
        }
    }

    /// Fresh standard-genome kernel sharing this kernel's configuration
    pub fn sibling_seed(&self) -> Self {
        Self {
            genome: Genome::standard(),
            fitness_history: Vec::new(),
            config: self.config.clone(),
        }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn fitness(&self) -> f64 {
        self.genome.fitness()
    }

    pub fn generation(&self) -> u64 {
        self.genome.generation()
    }

    pub fn fitness_history(&self) -> &[f64] {
        &self.fitness_history
    }

    pub fn config(&self) -> &Arc<DarwinianConfig> {
        &self.config
    }

    /// Evaluate the current genome and cache its fitness
    ///
    /// History restarts if the new fitness falls below its last entry.
    pub fn evaluate<P: SignalsProvider + ?Sized>(&mut self, provider: &P, round: u64) -> f64 {
        let signals = provider.signals(&self.genome, round);
        let fitness = self.genome.evaluate_fitness(&signals, &self.config.weights);
        self.genome.set_fitness(fitness);
        self.rebase_history();
        self.genome.fitness()
    }

    /// Drop the history once the cached fitness sits below its tail
    fn rebase_history(&mut self) {
        let fitness = self.genome.fitness();
        if self.fitness_history.last().is_some_and(|&tail| tail > fitness) {
            debug!(
                fitness,
                dropped = self.fitness_history.len(),
                "Fitness history restarted"
            );
            self.fitness_history.clear();
        }
    }

    /// Elitist hill climbing for exactly `iterations` rounds
    ///
    /// A candidate replaces the current genome iff its fitness is at least the
    /// current genome's, so the appended history never decreases.
    pub fn self_optimize<P, R>(
        &mut self,
        iterations: usize,
        provider: &P,
        rng: &mut R,
    ) -> Result<OptimizationReport>
    where
        P: SignalsProvider + ?Sized,
        R: Rng + ?Sized,
    {
        if iterations == 0 {
            return Err(OntosError::invalid("iterations must be at least 1"));
        }

        let fitness_before = self.genome.fitness();
        let mut current = self.genome.clone();
        let mut accepted_history = Vec::new();

        for round in 0..iterations {
            let mut candidate = current.mutate(self.config.mutation_rate, rng)?;
            let signals = provider.signals(&candidate, round as u64);
            let fitness = candidate.evaluate_fitness(&signals, &self.config.weights);
            candidate.set_fitness(fitness);

            if candidate.fitness() >= current.fitness() {
                debug!(
                    round,
                    fitness = candidate.fitness(),
                    generation = candidate.generation(),
                    "Candidate accepted"
                );
                accepted_history.push(candidate.fitness());
                current = candidate;
            }
        }

        current.verify()?;

        let report = OptimizationReport {
            fitness_before,
            fitness_after: current.fitness(),
            improvement: current.fitness() - fitness_before,
            accepted: accepted_history.len(),
            rounds: iterations,
            generation: current.generation(),
        };

        self.genome = current;
        self.fitness_history.extend(accepted_history);

        info!(
            rounds = report.rounds,
            accepted = report.accepted,
            fitness = report.fitness_after,
            improvement = report.improvement,
            "Self-optimization complete"
        );
        Ok(report)
    }

    /// Offspring of this kernel and `other`: crossover, then one low-rate mutation
    pub fn reproduce<R: Rng + ?Sized>(&self, other: &Kernel, rng: &mut R) -> Result<Kernel> {
        let child = self
            .genome
            .crossover(&other.genome, self.config.crossover, rng)?
            .mutate(self.config.reproduction_mutation_rate, rng)?;
        child.verify()?;

        debug!(
            child = %child.id(),
            generation = child.generation(),
            "Kernel reproduced"
        );
        Ok(Kernel {
            genome: child,
            fitness_history: Vec::new(),
            config: self.config.clone(),
        })
    }

    /// Replace the genome with a mutated copy
    ///
    /// The copy starts unevaluated, so any non-zero history is restarted.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) -> Result<()> {
        let mutated = self.genome.mutate(rate, rng)?;
        mutated.verify()?;
        self.genome = mutated;
        self.rebase_history();
        Ok(())
    }

    /// Project the genome onto `traits` and reassert the ethical floors
    ///
    /// Returns the number of traits written.
    pub fn sync_to_traits(&self, traits: &mut TraitVector) -> Result<usize> {
        let projected = self.config.trait_mapping.project(&self.genome);
        let written = traits.apply_projection(projected)?;
        debug!(written, generation = self.generation(), "Kernel synced to traits");
        Ok(written)
    }

    pub fn reset_history(&mut self) {
        self.fitness_history.clear();
    }

    pub fn snapshot(&self) -> KernelSnapshot {
        KernelSnapshot {
            genome: self.genome.clone(),
            fitness_history: self.fitness_history.clone(),
        }
    }

    pub fn from_snapshot(snapshot: KernelSnapshot, config: Arc<DarwinianConfig>) -> Result<Self> {
        if snapshot.fitness_history.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(OntosError::Serialization(
                "fitness history holds invalid values".to_string(),
            ));
        }
        if snapshot.fitness_history.windows(2).any(|w| w[0] > w[1]) {
            return Err(OntosError::Serialization(
                "fitness history decreases".to_string(),
            ));
        }
        let mut kernel = Kernel::new(snapshot.genome, config)?;
        kernel.fitness_history = snapshot.fitness_history;
        kernel.rebase_history();
        Ok(kernel)
    }
}
