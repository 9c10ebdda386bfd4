//! Genome - a named set of bounded genes
//!
//! Derivation (`mutate`, `crossover`) never edits a genome in place: it
//! returns a new genome with a fresh id, the parents' ids and an unevaluated
//! fitness, so a caller can always compare parent and candidate before
//! committing either.

pub mod crossover;
pub mod gene;

use std::collections::BTreeMap;

use ontos_common::{OntosError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fitness::calculator::{FitnessCalculator, FitnessWeights, PerformanceSignals};
use crate::validate_rate;
use self::crossover::CrossoverStrategy;
use self::gene::{Gene, GeneType};

pub const SARCASM_COEFFICIENT: &str = "sarcasm_coefficient";
pub const CHAOS_COEFFICIENT: &str = "chaos_coefficient";
pub const INTELLIGENCE_COEFFICIENT: &str = "intelligence_coefficient";
pub const PLAYFULNESS_COEFFICIENT: &str = "playfulness_coefficient";
pub const TRANSCEND_THRESHOLD: &str = "transcend_threshold";
pub const SUBORDINATE_SPAWN_PROB: &str = "subordinate_spawn_prob";
pub const LEARNING_RATE: &str = "learning_rate";

/// Evolvable parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "GenomeRepr", try_from = "GenomeRepr")]
pub struct Genome {
    id: Uuid,
    generation: u64,
    genes: BTreeMap<String, Gene>,
    fitness: f64,
    parent_ids: Vec<Uuid>,
}

/// Persisted form: genes as an ordered list
#[derive(Serialize, Deserialize)]
struct GenomeRepr {
    id: Uuid,
    #[serde(default)]
    generation: u64,
    genes: Vec<Gene>,
    #[serde(default)]
    fitness: f64,
    #[serde(default)]
    parent_ids: Vec<Uuid>,
}

impl From<Genome> for GenomeRepr {
    fn from(genome: Genome) -> Self {
        Self {
            id: genome.id,
            generation: genome.generation,
            genes: genome.genes.into_values().collect(),
            fitness: genome.fitness,
            parent_ids: genome.parent_ids,
        }
    }
}

impl TryFrom<GenomeRepr> for Genome {
    type Error = OntosError;

    fn try_from(repr: GenomeRepr) -> Result<Self> {
        let mut genome = Genome::new(repr.genes)
            .map_err(|e| OntosError::Serialization(format!("invalid genome: {}", e)))?;
        genome.id = repr.id;
        genome.generation = repr.generation;
        genome.parent_ids = repr.parent_ids;
        genome.fitness = if repr.fitness.is_finite() {
            repr.fitness.max(0.0)
        } else {
            0.0
        };
        Ok(genome)
    }
}

impl Default for Genome {
    fn default() -> Self {
        Self::standard()
    }
}

impl Genome {
    /// Create a generation-zero genome
    pub fn new(genes: Vec<Gene>) -> Result<Self> {
        if genes.is_empty() {
            return Err(OntosError::invalid("genome needs at least one gene"));
        }
        let mut map = BTreeMap::new();
        for gene in genes {
            let name = gene.name().to_string();
            if map.insert(name.clone(), gene).is_some() {
                return Err(OntosError::invalid(format!("gene '{}' declared twice", name)));
            }
        }
        Ok(Self {
            id: Uuid::now_v7(),
            generation: 0,
            genes: map,
            fitness: 0.0,
            parent_ids: Vec::new(),
        })
    }

    /// Seed genome of a fresh kernel
    pub fn standard() -> Self {
        use GeneType::*;
        let seeds = [
            (SARCASM_COEFFICIENT, Coefficient, 0.9, 0.0, 1.0),
            (CHAOS_COEFFICIENT, Coefficient, 0.95, 0.0, 1.0),
            (INTELLIGENCE_COEFFICIENT, Coefficient, 0.95, 0.5, 1.0),
            (PLAYFULNESS_COEFFICIENT, Coefficient, 0.95, 0.0, 1.0),
            (TRANSCEND_THRESHOLD, Threshold, 0.75, 0.5, 0.95),
            (SUBORDINATE_SPAWN_PROB, Probability, 0.4, 0.1, 0.8),
            (LEARNING_RATE, Coefficient, 0.05, 0.01, 0.2),
        ];
        let genes = seeds
            .into_iter()
            .map(|(name, gene_type, value, min, max)| {
                (name.to_string(), Gene::seed(name, gene_type, value, min, max))
            })
            .collect();
        Self {
            id: Uuid::now_v7(),
            generation: 0,
            genes,
            fitness: 0.0,
            parent_ids: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn parent_ids(&self) -> &[Uuid] {
        &self.parent_ids
    }

    pub fn gene(&self, name: &str) -> Option<&Gene> {
        self.genes.get(name)
    }

    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.values()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn gene_value(&self, name: &str) -> Option<f64> {
        self.genes.get(name).map(Gene::value)
    }

    /// Set a gene, clamped into its declared range
    ///
    /// Editing a gene invalidates the cached fitness.
    pub fn set_gene_value(&mut self, name: &str, value: f64) -> Result<()> {
        let gene = self
            .genes
            .get_mut(name)
            .ok_or_else(|| OntosError::invalid(format!("unknown gene '{}'", name)))?;
        gene.set_value(value)?;
        self.fitness = 0.0;
        Ok(())
    }

    /// Every gene value by name, for consumers steering cognition
    pub fn cognitive_parameters(&self) -> BTreeMap<String, f64> {
        self.genes
            .iter()
            .map(|(name, gene)| (name.clone(), gene.value()))
            .collect()
    }

    /// Derive a mutated child
    pub fn mutate<R: Rng + ?Sized>(&self, rate: f64, rng: &mut R) -> Result<Genome> {
        validate_rate("mutation rate", rate)?;
        let genes = self
            .genes
            .iter()
            .map(|(name, gene)| (name.clone(), gene.perturbed(rate, rng)))
            .collect();
        Ok(Genome {
            id: Uuid::now_v7(),
            generation: self.generation + 1,
            genes,
            fitness: 0.0,
            parent_ids: vec![self.id],
        })
    }

    /// Recombine with another genome carrying the same loci
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &Genome,
        strategy: CrossoverStrategy,
        rng: &mut R,
    ) -> Result<Genome> {
        if self.genes.len() != other.genes.len() {
            return Err(OntosError::IncompatibleGenomes(format!(
                "{} genes vs {} genes",
                self.genes.len(),
                other.genes.len()
            )));
        }
        let mut genes = BTreeMap::new();
        for (name, a) in &self.genes {
            let b = other
                .genes
                .get(name)
                .filter(|b| a.same_locus(b))
                .ok_or_else(|| {
                    OntosError::IncompatibleGenomes(format!(
                        "gene '{}' missing or declared differently",
                        name
                    ))
                })?;
            genes.insert(name.clone(), strategy.recombine(a, b, rng));
        }
        Ok(Genome {
            id: Uuid::now_v7(),
            generation: self.generation.max(other.generation) + 1,
            genes,
            fitness: 0.0,
            parent_ids: vec![self.id, other.id],
        })
    }

    /// Fitness of this genome under the given signals. Pure.
    pub fn evaluate_fitness(&self, signals: &PerformanceSignals, weights: &FitnessWeights) -> f64 {
        FitnessCalculator::calculate(signals, weights)
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = if fitness.is_finite() { fitness.max(0.0) } else { 0.0 };
    }

    /// Check every gene against its range
    pub fn verify(&self) -> Result<()> {
        match self.genes.values().find(|g| !g.in_range()) {
            Some(gene) => Err(OntosError::OutOfRangeGene {
                name: gene.name().to_string(),
                value: gene.value(),
                min: gene.min(),
                max: gene.max(),
            }),
            None => Ok(()),
        }
    }
}
