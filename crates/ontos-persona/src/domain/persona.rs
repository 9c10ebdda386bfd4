//! Persona - everything one agent's personality consists of

use std::collections::BTreeMap;
use std::sync::Arc;

use ontos_common::{EmotionKind, EmotionalEvent, EmotionalState, Result, TraitVector};
use ontos_darwinian::{DarwinianConfig, Genome, Kernel, OptimizationReport, SignalsProvider};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::export::PersonaStats;

/// One agent's traits, emotion and evolution kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    pub(crate) traits: TraitVector,
    pub(crate) emotion: EmotionalState,
    pub(crate) kernel: Kernel,
    pub(crate) stats: PersonaStats,
}

impl Persona {
    /// Standard traits, neutral emotion and a seed kernel
    pub fn new(config: Arc<DarwinianConfig>) -> Result<Self> {
        let kernel = Kernel::new(Genome::standard(), config)?;
        Ok(Self::from_parts(TraitVector::standard(), kernel))
    }

    pub fn from_parts(traits: TraitVector, kernel: Kernel) -> Self {
        Self {
            traits,
            emotion: EmotionalState::neutral(),
            kernel,
            stats: PersonaStats::default(),
        }
    }

    pub fn traits(&self) -> &TraitVector {
        &self.traits
    }

    pub fn emotion(&self) -> &EmotionalState {
        &self.emotion
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn stats(&self) -> &PersonaStats {
        &self.stats
    }

    /// Overwrite the emotional state from a task event
    pub fn record_event(
        &mut self,
        event: EmotionalEvent,
        intensity: f64,
        duration: i64,
    ) -> Result<&EmotionalState> {
        self.emotion.update(event, intensity, duration)?;
        if event == EmotionalEvent::Transcend {
            self.stats.transcend_count += 1;
        }
        Ok(&self.emotion)
    }

    pub fn tick(&mut self) -> &EmotionalState {
        self.emotion.tick();
        &self.emotion
    }

    /// Self-optimize the kernel, then project it onto the traits
    ///
    /// Both steps run on copies; the persona is updated only if both succeed.
    pub fn evolve<P, R>(
        &mut self,
        iterations: usize,
        provider: &P,
        rng: &mut R,
    ) -> Result<OptimizationReport>
    where
        P: SignalsProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let mut kernel = self.kernel.clone();
        let mut traits = self.traits.clone();
        let report = kernel.self_optimize(iterations, provider, rng)?;
        kernel.sync_to_traits(&mut traits)?;

        self.kernel = kernel;
        self.traits = traits;
        self.stats.evolution_generation += 1;
        debug!(
            generation = self.stats.evolution_generation,
            fitness = report.fitness_after,
            "Persona evolved"
        );
        Ok(report)
    }

    /// Read-only view for the host
    pub fn state(&self) -> PersonaState {
        PersonaState {
            traits: self.traits.traits().clone(),
            floors: self
                .traits
                .floors()
                .iter()
                .map(|f| (f.name.clone(), f.value))
                .collect(),
            emotion: self.emotion.kind(),
            emotion_intensity: self.emotion.intensity(),
            emotion_remaining: self.emotion.remaining_duration(),
            fitness: self.kernel.fitness(),
            kernel_generation: self.kernel.generation(),
            transcend_count: self.stats.transcend_count,
            evolution_generation: self.stats.evolution_generation,
        }
    }
}

/// Snapshot returned by `get_state`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaState {
    pub traits: BTreeMap<String, f64>,
    pub floors: BTreeMap<String, f64>,
    pub emotion: EmotionKind,
    pub emotion_intensity: f64,
    pub emotion_remaining: u32,
    pub fitness: f64,
    pub kernel_generation: u64,
    pub transcend_count: u64,
    pub evolution_generation: u64,
}
