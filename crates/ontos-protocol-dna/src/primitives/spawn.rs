//! Spawn primitive - derive a subordinate from its parent

use std::collections::BTreeMap;

use ontos_common::{EmotionalState, OntosError, Result, TraitVector, DEFAULT_INHERITANCE_FACTOR};
use ontos_darwinian::Kernel;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Parameters of a spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRequest {
    /// Blend weight of the parent's traits, in [0, 1]
    pub inheritance_factor: f64,
    /// Trait values forced onto the child after inheritance and kernel sync
    pub overrides: BTreeMap<String, f64>,
}

impl Default for SpawnRequest {
    fn default() -> Self {
        Self {
            inheritance_factor: DEFAULT_INHERITANCE_FACTOR,
            overrides: BTreeMap::new(),
        }
    }
}

impl SpawnRequest {
    pub fn with_factor(inheritance_factor: f64) -> Self {
        Self {
            inheritance_factor,
            ..Self::default()
        }
    }

    pub fn with_override(mut self, name: &str, value: f64) -> Self {
        self.overrides.insert(name.to_string(), value);
        self
    }
}

/// A freshly spawned subordinate
#[derive(Debug, Clone)]
pub struct Offspring {
    pub traits: TraitVector,
    pub kernel: Option<Kernel>,
    /// Subordinates start without an emotional state
    pub emotion: EmotionalState,
}

/// Spawn a subordinate from a parent
pub struct SpawnPrimitive;

impl SpawnPrimitive {
    /// Derive a child
    ///
    /// 1. inherit the parent's traits with the request's factor
    /// 2. if the parent has a kernel, reproduce it with a fresh seed kernel
    ///    and sync the child kernel onto the child traits
    /// 3. apply the explicit overrides, which win over both
    ///
    /// Nothing is returned unless every step succeeds; the parent is only read.
    pub fn spawn<R: Rng + ?Sized>(
        parent_traits: &TraitVector,
        parent_kernel: Option<&Kernel>,
        request: &SpawnRequest,
        rng: &mut R,
    ) -> Result<Offspring> {
        if !request.inheritance_factor.is_finite()
            || !(0.0..=1.0).contains(&request.inheritance_factor)
        {
            return Err(OntosError::invalid(format!(
                "inheritance factor must be in [0, 1], got {}",
                request.inheritance_factor
            )));
        }

        let mut traits = parent_traits.inherit(request.inheritance_factor, rng)?;

        let kernel = match parent_kernel {
            Some(parent) => {
                let child = parent.reproduce(&parent.sibling_seed(), rng)?;
                child.sync_to_traits(&mut traits)?;
                debug!(
                    generation = child.generation(),
                    "Subordinate kernel reproduced"
                );
                Some(child)
            }
            None => None,
        };

        traits.apply_overrides(request.overrides.iter().map(|(k, v)| (k.as_str(), *v)))?;

        info!(
            factor = request.inheritance_factor,
            overrides = request.overrides.len(),
            with_kernel = kernel.is_some(),
            "Subordinate spawned"
        );
        Ok(Offspring {
            traits,
            kernel,
            emotion: EmotionalState::neutral(),
        })
    }
}
