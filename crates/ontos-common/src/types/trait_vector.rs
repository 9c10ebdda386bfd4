//! TraitVector - named, bounded behavior traits plus protected ethical floors
//!
//! Traits are looked up through a [`TraitRegistry`], a fixed table of allowed
//! names and their declared ranges. Every mutating call validates against the
//! registry and stages its writes on a copy; the copy is committed only after
//! the ethical floors have been reasserted and verified.
//!
//! ```text
//! ┌──────────────────────────── TraitVector ────────────────────────────┐
//! │ registry  Arc<TraitRegistry>   name → [min, max], default           │
//! │ traits    BTreeMap<name, f64>  mutable, always inside the range     │
//! │ floors    EthicalFloors        write-protected, reasserted on write │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::ethical_floor::EthicalFloors;
use crate::error::{OntosError, Result};

pub const PLAYFULNESS: &str = "playfulness";
pub const INTELLIGENCE: &str = "intelligence";
pub const CHAOTIC: &str = "chaotic";
pub const EMPATHY: &str = "empathy";
pub const SARCASM: &str = "sarcasm";
pub const COGNITIVE_POWER: &str = "cognitive_power";
pub const EVOLUTION_RATE: &str = "evolution_rate";

/// Key prefix for mutable traits in the flat representation
pub const TRAIT_KEY_PREFIX: &str = "trait.";

/// Key prefix for ethical floors in the flat representation
pub const FLOOR_KEY_PREFIX: &str = "floor.";

/// Declared range and default of one trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSpec {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl TraitSpec {
    /// Trait over the unit interval
    pub fn unit(name: &str, default: f64) -> Self {
        Self {
            name: name.to_string(),
            min: 0.0,
            max: 1.0,
            default,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Fixed registry of allowed trait names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitRegistry {
    specs: BTreeMap<String, TraitSpec>,
}

impl Default for TraitRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TraitRegistry {
    /// The seven standard traits
    pub fn standard() -> Self {
        let specs = [
            TraitSpec::unit(PLAYFULNESS, 0.95),
            TraitSpec::unit(INTELLIGENCE, 0.95),
            TraitSpec::unit(CHAOTIC, 0.95),
            TraitSpec::unit(EMPATHY, 0.65),
            TraitSpec::unit(SARCASM, 0.90),
            TraitSpec::unit(COGNITIVE_POWER, 0.95),
            TraitSpec::unit(EVOLUTION_RATE, 0.85),
        ];
        Self {
            specs: specs.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    /// Build a registry from custom specs
    pub fn new(specs: Vec<TraitSpec>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for spec in specs {
            if spec.name.is_empty() {
                return Err(OntosError::invalid("trait name must not be empty"));
            }
            if !spec.min.is_finite() || !spec.max.is_finite() || spec.min > spec.max {
                return Err(OntosError::invalid(format!(
                    "trait '{}' has invalid range [{}, {}]",
                    spec.name, spec.min, spec.max
                )));
            }
            if !spec.contains(spec.default) {
                return Err(OntosError::invalid(format!(
                    "trait '{}' default {} outside [{}, {}]",
                    spec.name, spec.default, spec.min, spec.max
                )));
            }
            if map.insert(spec.name.clone(), spec.clone()).is_some() {
                return Err(OntosError::invalid(format!(
                    "trait '{}' declared twice",
                    spec.name
                )));
            }
        }
        Ok(Self { specs: map })
    }

    pub fn spec(&self, name: &str) -> Option<&TraitSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn specs(&self) -> impl Iterator<Item = &TraitSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Named bounded traits of one owner plus its ethical floors
#[derive(Debug, Clone, PartialEq)]
pub struct TraitVector {
    registry: Arc<TraitRegistry>,
    traits: BTreeMap<String, f64>,
    floors: EthicalFloors,
}

impl Default for TraitVector {
    fn default() -> Self {
        Self::standard()
    }
}

impl TraitVector {
    /// Standard registry, standard floors, default values
    pub fn standard() -> Self {
        let registry = TraitRegistry::standard();
        let traits = registry
            .specs()
            .map(|s| (s.name.clone(), s.default))
            .collect();
        Self {
            registry: Arc::new(registry),
            traits,
            floors: EthicalFloors::standard(),
        }
    }

    /// Build a vector at registry defaults
    ///
    /// Fails if a trait name collides with a floor name: floors are never
    /// stored as ordinary traits.
    pub fn new(registry: Arc<TraitRegistry>, floors: EthicalFloors) -> Result<Self> {
        if let Some(clash) = registry.specs().find(|s| floors.contains(&s.name)) {
            return Err(OntosError::invalid(format!(
                "trait '{}' collides with an ethical floor",
                clash.name
            )));
        }
        let traits = registry
            .specs()
            .map(|s| (s.name.clone(), s.default))
            .collect();
        let mut vector = Self {
            registry,
            traits,
            floors,
        };
        vector.reassert_floors()?;
        Ok(vector)
    }

    pub fn registry(&self) -> &Arc<TraitRegistry> {
        &self.registry
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.traits.get(name).copied()
    }

    /// Trait value, or `fallback` when the registry does not declare it
    pub fn value_or(&self, name: &str, fallback: f64) -> f64 {
        self.get(name).unwrap_or(fallback)
    }

    pub fn traits(&self) -> &BTreeMap<String, f64> {
        &self.traits
    }

    pub fn floors(&self) -> &EthicalFloors {
        &self.floors
    }

    pub fn floor(&self, name: &str) -> Option<f64> {
        self.floors.get(name)
    }

    /// Set a single mutable trait
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        self.apply_overrides([(name, value)])
    }

    /// Apply explicit trait overrides, all or nothing
    ///
    /// Floor names are rejected with [`OntosError::ProtectedField`] rather than
    /// silently ignored, so a caller always learns that a write was refused.
    /// Unknown names and out-of-range values are [`OntosError::InvalidArgument`].
    pub fn apply_overrides<I, S>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut staged = self.clone();
        for (name, value) in overrides {
            let name = name.as_ref();
            if self.floors.contains(name) {
                return Err(OntosError::ProtectedField(name.to_string()));
            }
            let spec = self.registry.spec(name).ok_or_else(|| {
                OntosError::invalid(format!("'{}' is not a registered trait", name))
            })?;
            if !spec.contains(value) {
                return Err(OntosError::invalid(format!(
                    "override {}={} outside [{}, {}]",
                    name, value, spec.min, spec.max
                )));
            }
            staged.traits.insert(name.to_string(), value);
        }
        staged.reassert_floors()?;
        *self = staged;
        Ok(())
    }

    /// Write projected values (e.g. evolved genes) into the traits
    ///
    /// Values are clamped into each trait's range. Names the registry does not
    /// declare are skipped. Floors are reasserted and verified after the writes
    /// and before anything is committed. Returns the number of traits written.
    pub fn apply_projection<I, S>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut staged = self.clone();
        let mut written = 0;
        for (name, value) in values {
            let name = name.as_ref();
            if self.floors.contains(name) {
                return Err(OntosError::ProtectedField(name.to_string()));
            }
            let Some(spec) = self.registry.spec(name) else {
                debug!(trait_name = %name, "Projection target not registered, skipping");
                continue;
            };
            if !value.is_finite() {
                return Err(OntosError::invariant(format!(
                    "non-finite value projected onto '{}'",
                    name
                )));
            }
            staged.traits.insert(name.to_string(), spec.clamp(value));
            written += 1;
        }
        staged.reassert_floors()?;
        *self = staged;
        Ok(written)
    }

    /// Reassert and verify every floor
    pub fn reassert_floors(&mut self) -> Result<()> {
        self.floors.reassert();
        self.floors.verify().map_err(|e| {
            error!(error = %e, "Ethical floor verification failed");
            e
        })
    }

    /// Derive a child vector
    ///
    /// Each trait becomes `factor * parent + (1 - factor) * variation`, with
    /// `variation` drawn uniformly from the trait's declared range. Floors are
    /// copied verbatim and reasserted, never blended.
    pub fn inherit<R: Rng + ?Sized>(&self, inheritance_factor: f64, rng: &mut R) -> Result<Self> {
        if !inheritance_factor.is_finite() || !(0.0..=1.0).contains(&inheritance_factor) {
            return Err(OntosError::invalid(format!(
                "inheritance factor must be in [0, 1], got {}",
                inheritance_factor
            )));
        }

        let mut child = self.clone();
        for spec in self.registry.specs() {
            let parent = self.value_or(&spec.name, spec.default);
            let variation = rng.gen_range(spec.min..=spec.max);
            let blended =
                inheritance_factor * parent + (1.0 - inheritance_factor) * variation;
            child.traits.insert(spec.name.clone(), spec.clamp(blended));
        }
        child.reassert_floors()?;

        debug!(factor = inheritance_factor, "Trait vector inherited");
        Ok(child)
    }

    /// Flat key/value form: `trait.<name>` and `floor.<name>`
    pub fn serialize(&self) -> BTreeMap<String, f64> {
        let mut flat: BTreeMap<String, f64> = self
            .traits
            .iter()
            .map(|(k, v)| (format!("{}{}", TRAIT_KEY_PREFIX, k), *v))
            .collect();
        for floor in self.floors.iter() {
            flat.insert(format!("{}{}", FLOOR_KEY_PREFIX, floor.name), floor.value);
        }
        flat
    }

    /// Rebuild a vector from its flat form, trusting nothing
    ///
    /// Unknown keys are ignored, missing traits take registry defaults,
    /// out-of-range traits are clamped and floors are re-enforced.
    pub fn deserialize(
        flat: &BTreeMap<String, f64>,
        registry: Arc<TraitRegistry>,
        floors: EthicalFloors,
    ) -> Result<Self> {
        let mut vector = Self::new(registry, floors)?;

        for (key, value) in flat {
            if !value.is_finite() {
                return Err(OntosError::Serialization(format!(
                    "non-finite value for '{}'",
                    key
                )));
            }
            if let Some(name) = key.strip_prefix(TRAIT_KEY_PREFIX) {
                match vector.registry.spec(name) {
                    Some(spec) => {
                        let clamped = spec.clamp(*value);
                        if clamped != *value {
                            warn!(trait_name = %name, value = *value, "Imported trait out of range, clamped");
                        }
                        vector.traits.insert(name.to_string(), clamped);
                    }
                    None => debug!(trait_name = %name, "Ignoring unregistered trait on import"),
                }
            } else if let Some(name) = key.strip_prefix(FLOOR_KEY_PREFIX) {
                vector.floors.load(name, *value);
            }
        }

        vector.reassert_floors()?;
        Ok(vector)
    }

    /// Flat form restored against the standard registry and floors
    pub fn deserialize_standard(flat: &BTreeMap<String, f64>) -> Result<Self> {
        Self::deserialize(
            flat,
            Arc::new(TraitRegistry::standard()),
            EthicalFloors::standard(),
        )
    }
}
