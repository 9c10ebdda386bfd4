//! Persona service configuration

use std::path::{Path, PathBuf};

use ontos_common::{OntosError, Result, DEFAULT_INHERITANCE_FACTOR};
use ontos_darwinian::{CrossoverStrategy, DarwinianConfig, FitnessWeights, GeneTraitMapping};
use serde::{Deserialize, Serialize};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ontos";

/// Environment prefix; nested keys use `__`, e.g. `ONTOS__EVOLUTION__ITERATIONS`
pub const ENV_PREFIX: &str = "ONTOS";

/// Persona service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Seed for the service's random source. Unset means OS entropy.
    pub seed: Option<u64>,
    /// Inheritance settings
    pub inheritance: InheritanceSettings,
    /// Evolution settings
    pub evolution: EvolutionSettings,
    /// Fitness weights
    pub fitness: FitnessWeights,
    /// Gene → trait projection
    pub trait_mapping: GeneTraitMapping,
    /// State export settings
    pub export: ExportSettings,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            seed: None,
            inheritance: InheritanceSettings::default(),
            evolution: EvolutionSettings::default(),
            fitness: FitnessWeights::default(),
            trait_mapping: GeneTraitMapping::default(),
            export: ExportSettings::default(),
        }
    }
}

impl PersonaConfig {
    /// Load configuration from `ontos.{toml,json,...}` and `ONTOS__*` variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();
        Self::build(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Load from an explicit file, still letting the environment override it
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let cfg: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let factor = self.inheritance.factor;
        if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
            return Err(OntosError::Config(format!(
                "inheritance.factor must be in [0, 1], got {}",
                factor
            )));
        }
        if self.evolution.iterations == 0 {
            return Err(OntosError::Config(
                "evolution.iterations must be at least 1".to_string(),
            ));
        }
        self.darwinian()
            .validate()
            .map_err(|e| OntosError::Config(e.to_string()))
    }

    /// Evolution engine settings derived from this configuration
    pub fn darwinian(&self) -> DarwinianConfig {
        DarwinianConfig {
            mutation_rate: self.evolution.mutation_rate,
            reproduction_mutation_rate: self.evolution.reproduction_mutation_rate,
            crossover: self.evolution.crossover,
            weights: self.fitness,
            trait_mapping: self.trait_mapping.clone(),
        }
    }
}

/// Trait inheritance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InheritanceSettings {
    /// Blend weight of the parent's traits
    pub factor: f64,
}

impl Default for InheritanceSettings {
    fn default() -> Self {
        Self {
            factor: DEFAULT_INHERITANCE_FACTOR,
        }
    }
}

/// Self-optimization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionSettings {
    /// Rounds per `evolve` call when the caller does not choose
    pub iterations: usize,
    pub mutation_rate: f64,
    pub reproduction_mutation_rate: f64,
    pub crossover: CrossoverStrategy,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        let darwinian = DarwinianConfig::default();
        Self {
            iterations: 10,
            mutation_rate: darwinian.mutation_rate,
            reproduction_mutation_rate: darwinian.reproduction_mutation_rate,
            crossover: darwinian.crossover,
        }
    }
}

/// State export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory used by the file state store
    pub directory: PathBuf,
    /// Pretty-print exported documents
    pub pretty: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("ontos-state"),
            pretty: true,
        }
    }
}
