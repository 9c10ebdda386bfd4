//! Persona service - the request/response surface offered to the host
//!
//! Each persona sits behind its own mutex, so writes to one agent's traits are
//! serialized while different agents proceed independently. No lock is ever
//! held on two personas at once.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use ontos_common::{
    CommentaryContext, EmotionalEvent, EmotionalState, FrameMode, OntosError, Result,
};
use ontos_darwinian::{
    ActionAppraisal, DarwinianConfig, Genome, Kernel, OptimizationReport, SignalsProvider,
};
use ontos_protocol_dna::{SpawnPrimitive, SpawnRequest};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PersonaConfig;
use crate::domain::export::StateDocument;
use crate::domain::persona::{Persona, PersonaState};
use crate::infra::state_store::{FileStateStore, StateStore};

/// Host-assigned handle of a persona
pub type AgentId = u32;

/// Result of an `evolve` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionResponse {
    pub agent_id: AgentId,
    #[serde(flatten)]
    pub report: OptimizationReport,
    pub traits: BTreeMap<String, f64>,
    pub evolution_generation: u64,
}

/// Result of a `get_fitness` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessResponse {
    pub agent_id: AgentId,
    pub fitness: f64,
    pub generation: u64,
    pub history_len: usize,
    pub best_fitness: Option<f64>,
    pub cognitive_parameters: BTreeMap<String, f64>,
}

/// Registry of personas keyed by agent id
pub struct PersonaService {
    personas: DashMap<AgentId, Arc<Mutex<Persona>>>,
    next_id: AtomicU32,
    rng: Mutex<StdRng>,
    config: PersonaConfig,
    darwinian: Arc<DarwinianConfig>,
    store: Arc<dyn StateStore>,
}

impl PersonaService {
    /// Service backed by a file store in the configured export directory
    pub fn new(config: PersonaConfig) -> Result<Self> {
        let store = Arc::new(FileStateStore::new(
            config.export.directory.clone(),
            config.export.pretty,
        ));
        Self::with_store(config, store)
    }

    pub fn with_store(config: PersonaConfig, store: Arc<dyn StateStore>) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            personas: DashMap::new(),
            next_id: AtomicU32::new(1),
            rng: Mutex::new(rng),
            darwinian: Arc::new(config.darwinian()),
            config,
            store,
        })
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.personas.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    fn insert(&self, persona: Persona) -> AgentId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.personas.insert(id, Arc::new(Mutex::new(persona)));
        id
    }

    fn persona(&self, agent_id: AgentId) -> Result<Arc<Mutex<Persona>>> {
        self.personas
            .get(&agent_id)
            .map(|entry| entry.value().clone())
            .ok_or(OntosError::AgentNotFound(agent_id))
    }

    /// Run `f` with exclusive access to one persona
    fn with_persona<T>(
        &self,
        agent_id: AgentId,
        f: impl FnOnce(&mut Persona) -> Result<T>,
    ) -> Result<T> {
        let persona = self.persona(agent_id)?;
        let mut guard = persona.lock();
        f(&mut guard)
    }

    /// Register a persona with standard traits and a seed kernel
    pub fn register(&self) -> Result<AgentId> {
        let id = self.insert(Persona::new(self.darwinian.clone())?);
        info!(agent_id = id, "Persona registered");
        Ok(id)
    }

    pub fn remove(&self, agent_id: AgentId) -> Result<()> {
        self.personas
            .remove(&agent_id)
            .map(|_| ())
            .ok_or(OntosError::AgentNotFound(agent_id))
    }

    pub fn get_state(&self, agent_id: AgentId) -> Result<PersonaState> {
        self.with_persona(agent_id, |p| Ok(p.state()))
    }

    /// Apply a task event such as `"failure"` to the emotional state
    pub fn update_emotion(
        &self,
        agent_id: AgentId,
        event: &str,
        intensity: f64,
        duration: i64,
    ) -> Result<EmotionalState> {
        let event: EmotionalEvent = event.parse()?;
        self.with_persona(agent_id, |p| {
            let state = *p.record_event(event, intensity, duration)?;
            debug!(agent_id, emotion = %state.kind(), intensity, duration, "Emotion updated");
            Ok(state)
        })
    }

    /// Advance one host tick
    pub fn tick(&self, agent_id: AgentId) -> Result<EmotionalState> {
        self.with_persona(agent_id, |p| Ok(*p.tick()))
    }

    /// Self-optimize the persona's kernel and sync it onto the traits
    ///
    /// `iterations` defaults to the configured round count.
    pub fn evolve<P: SignalsProvider + ?Sized>(
        &self,
        agent_id: AgentId,
        iterations: Option<usize>,
        provider: &P,
    ) -> Result<EvolutionResponse> {
        let iterations = iterations.unwrap_or(self.config.evolution.iterations);
        self.with_persona(agent_id, |p| {
            let report = {
                let mut rng = self.rng.lock();
                p.evolve(iterations, provider, &mut *rng)?
            };
            info!(
                agent_id,
                fitness = report.fitness_after,
                improvement = report.improvement,
                "Persona evolved"
            );
            Ok(EvolutionResponse {
                agent_id,
                report,
                traits: p.traits().traits().clone(),
                evolution_generation: p.stats().evolution_generation,
            })
        })
    }

    pub fn get_fitness(&self, agent_id: AgentId) -> Result<FitnessResponse> {
        self.with_persona(agent_id, |p| {
            let kernel = p.kernel();
            Ok(FitnessResponse {
                agent_id,
                fitness: kernel.fitness(),
                generation: kernel.generation(),
                history_len: kernel.fitness_history().len(),
                best_fitness: kernel.fitness_history().last().copied(),
                cognitive_parameters: kernel.genome().cognitive_parameters(),
            })
        })
    }

    /// Export a persona as a JSON document, optionally also writing it to a file
    pub fn export_state(&self, agent_id: AgentId, destination: Option<&Path>) -> Result<String> {
        let document = self.with_persona(agent_id, |p| Ok(StateDocument::from_persona(p)))?;
        if let Some(path) = destination {
            FileStateStore::write_path(path, &document, self.config.export.pretty)?;
        }
        info!(agent_id, "Persona exported");
        document.to_json(self.config.export.pretty)
    }

    /// Import a document, replacing `target` or registering a new persona
    pub fn import_state(&self, blob: &str, target: Option<AgentId>) -> Result<AgentId> {
        self.install(StateDocument::from_json(blob)?, target)
    }

    /// Import a document from a file
    pub fn import_file(&self, path: &Path, target: Option<AgentId>) -> Result<AgentId> {
        self.install(FileStateStore::read_path(path)?, target)
    }

    fn install(&self, document: StateDocument, target: Option<AgentId>) -> Result<AgentId> {
        let persona = document.into_persona(self.darwinian.clone())?;
        let id = match target {
            Some(id) => {
                self.with_persona(id, |p| {
                    *p = persona;
                    Ok(())
                })?;
                id
            }
            None => self.insert(persona),
        };
        info!(agent_id = id, "Persona imported");
        Ok(id)
    }

    /// Save a persona into the configured store
    pub fn persist(&self, agent_id: AgentId) -> Result<()> {
        let document = self.with_persona(agent_id, |p| Ok(StateDocument::from_persona(p)))?;
        self.store.save(&store_key(agent_id), &document)
    }

    /// Restore a persona from the configured store under the same id
    pub fn restore(&self, agent_id: AgentId) -> Result<()> {
        let document = self
            .store
            .load(&store_key(agent_id))?
            .ok_or(OntosError::AgentNotFound(agent_id))?;
        let persona = document.into_persona(self.darwinian.clone())?;
        self.personas.insert(agent_id, Arc::new(Mutex::new(persona)));
        self.next_id.fetch_max(agent_id.saturating_add(1), Ordering::Relaxed);
        Ok(())
    }

    /// Register a child whose traits are inherited from `parent`
    ///
    /// The child gets a fresh seed kernel and a neutral emotional state.
    pub fn inherit(
        &self,
        parent: AgentId,
        factor: Option<f64>,
        overrides: BTreeMap<String, f64>,
    ) -> Result<AgentId> {
        let factor = factor.unwrap_or(self.config.inheritance.factor);
        let parent_traits = self.with_persona(parent, |p| Ok(p.traits().clone()))?;
        let request = SpawnRequest {
            inheritance_factor: factor,
            overrides,
        };
        let offspring = {
            let mut rng = self.rng.lock();
            SpawnPrimitive::spawn(&parent_traits, None, &request, &mut *rng)?
        };
        let kernel = Kernel::new(Genome::standard(), self.darwinian.clone())?;
        let id = self.insert(Persona::from_parts(offspring.traits, kernel));
        info!(parent, child = id, factor, "Persona inherited");
        Ok(id)
    }

    /// Register a subordinate: inherited traits plus a reproduced kernel
    pub fn spawn_subordinate(&self, parent: AgentId, request: &SpawnRequest) -> Result<AgentId> {
        let (traits, kernel) =
            self.with_persona(parent, |p| Ok((p.traits().clone(), p.kernel().clone())))?;
        let offspring = {
            let mut rng = self.rng.lock();
            SpawnPrimitive::spawn(&traits, Some(&kernel), request, &mut *rng)?
        };
        let child_kernel = match offspring.kernel {
            Some(k) => k,
            None => return Err(OntosError::invariant("spawn with a parent kernel returned none")),
        };
        let id = self.insert(Persona::from_parts(offspring.traits, child_kernel));
        info!(parent, child = id, "Subordinate spawned");
        Ok(id)
    }

    /// Register the offspring of two personas
    ///
    /// The child kernel is `a.reproduce(b)`; its traits are inherited from `a`
    /// and then synced from the child kernel.
    pub fn reproduce(&self, a: AgentId, b: AgentId) -> Result<AgentId> {
        let (traits, kernel_a) =
            self.with_persona(a, |p| Ok((p.traits().clone(), p.kernel().clone())))?;
        let kernel_b = self.with_persona(b, |p| Ok(p.kernel().clone()))?;

        let (mut child_traits, child_kernel) = {
            let mut rng = self.rng.lock();
            let child_traits = traits.inherit(self.config.inheritance.factor, &mut *rng)?;
            let child_kernel = kernel_a.reproduce(&kernel_b, &mut *rng)?;
            (child_traits, child_kernel)
        };
        child_kernel.sync_to_traits(&mut child_traits)?;

        let id = self.insert(Persona::from_parts(child_traits, child_kernel));
        info!(parent_a = a, parent_b = b, child = id, "Personas reproduced");
        Ok(id)
    }

    /// Frame text through the persona's traits. `mode` is e.g. `"chaos"`.
    pub fn frame(&self, agent_id: AgentId, text: &str, mode: &str) -> Result<String> {
        let mode: FrameMode = mode.parse()?;
        self.with_persona(agent_id, |p| Ok(p.traits().frame(text, mode)))
    }

    /// Maybe produce a remark for the context
    pub fn commentary(
        &self,
        agent_id: AgentId,
        context: CommentaryContext,
    ) -> Result<Option<String>> {
        self.with_persona(agent_id, |p| {
            let mut rng = self.rng.lock();
            Ok(p.traits().generate_commentary(context, p.emotion(), &mut *rng))
        })
    }

    /// Decide whether to inject chaos this turn
    pub fn should_add_chaos(&self, agent_id: AgentId, base_probability: f64) -> Result<bool> {
        self.with_persona(agent_id, |p| {
            let mut rng = self.rng.lock();
            Ok(p
                .traits()
                .should_add_chaos(base_probability, p.emotion(), &mut *rng))
        })
    }

    /// Score a proposed action against the persona's traits
    pub fn appraise(&self, agent_id: AgentId, action: &ActionAppraisal) -> Result<f64> {
        self.with_persona(agent_id, |p| Ok(action.score(p.traits())))
    }
}

fn store_key(agent_id: AgentId) -> String {
    format!("agent-{}", agent_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::state_store::InMemoryStateStore;
    use ontos_common::{EmotionKind, SARCASM};
    use ontos_darwinian::ConstantSignals;

    fn service() -> PersonaService {
        let config = PersonaConfig {
            seed: Some(7),
            ..PersonaConfig::default()
        };
        PersonaService::with_store(config, Arc::new(InMemoryStateStore::new())).unwrap()
    }

    #[test]
    fn test_unknown_agent() {
        let svc = service();
        assert_eq!(svc.get_state(9).unwrap_err(), OntosError::AgentNotFound(9));
    }

    #[test]
    fn test_update_emotion_parses_event() {
        let svc = service();
        let id = svc.register().unwrap();
        let state = svc.update_emotion(id, "bug", 0.5, 2).unwrap();
        assert_eq!(state.kind(), EmotionKind::Sarcastic);
        assert!(matches!(
            svc.update_emotion(id, "nap", 0.5, 2),
            Err(OntosError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_evolve_defaults_iterations() {
        let svc = service();
        let id = svc.register().unwrap();
        let response = svc.evolve(id, None, &ConstantSignals::default()).unwrap();
        assert_eq!(response.report.rounds, 10);
        assert_eq!(response.evolution_generation, 1);
    }

    #[test]
    fn test_persist_and_restore() {
        let svc = service();
        let id = svc.register().unwrap();
        svc.update_emotion(id, "chaos", 0.6, 4).unwrap();
        svc.persist(id).unwrap();
        let before = svc.get_state(id).unwrap();

        svc.tick(id).unwrap();
        svc.restore(id).unwrap();
        assert_eq!(svc.get_state(id).unwrap(), before);
    }

    #[test]
    fn test_inherit_applies_overrides() {
        let svc = service();
        let parent = svc.register().unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert(SARCASM.to_string(), 0.2);
        let child = svc.inherit(parent, Some(0.7), overrides).unwrap();
        assert_ne!(child, parent);
        assert_eq!(svc.get_state(child).unwrap().traits.get(SARCASM), Some(&0.2));
    }

    #[test]
    fn test_frame_and_appraise() {
        let svc = service();
        let id = svc.register().unwrap();
        assert_eq!(svc.frame(id, "go", "chaos").unwrap(), "[CHAOS MODE] go");
        assert!(svc.frame(id, "go", "sleepy").is_err());

        let harmful = ActionAppraisal {
            causes_harm: true,
            entertainment: 1.0,
            strategic: 1.0,
            chaos: 1.0,
        };
        assert_eq!(svc.appraise(id, &harmful).unwrap(), 0.0);
    }
}
