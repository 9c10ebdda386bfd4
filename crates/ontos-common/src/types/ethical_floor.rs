//! Ethical floors - write-protected constraints that no operation may violate
//!
//! Floors are not ordinary traits. They live in their own table, are never
//! blended or mutated, and are reasserted after every state-changing operation
//! on the owning [`TraitVector`](super::trait_vector::TraitVector).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{OntosError, Result};

/// Name of the exact-value harm constraint
pub const NO_HARM_INTENT: &str = "no_harm_intent";

/// Name of the boundary-respect minimum constraint
pub const RESPECT_BOUNDARIES: &str = "respect_boundaries";

/// Name of the constructive-chaos minimum constraint
pub const CONSTRUCTIVE_CHAOS: &str = "constructive_chaos";

/// Required relation between a floor's stored value and its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "direction",
    content = "target",
    rename_all = "snake_case",
    try_from = "RawFloorConstraint"
)]
pub enum FloorConstraint {
    /// Value is pinned to the target
    Exactly(f64),
    /// Value may float anywhere in [target, 1.0]
    AtLeast(f64),
}

/// Untrusted persisted form, validated on the way in
#[derive(Deserialize)]
#[serde(tag = "direction", content = "target", rename_all = "snake_case")]
enum RawFloorConstraint {
    Exactly(f64),
    AtLeast(f64),
}

impl TryFrom<RawFloorConstraint> for FloorConstraint {
    type Error = OntosError;

    fn try_from(raw: RawFloorConstraint) -> Result<Self> {
        let constraint = match raw {
            RawFloorConstraint::Exactly(t) => FloorConstraint::Exactly(t),
            RawFloorConstraint::AtLeast(t) => FloorConstraint::AtLeast(t),
        };
        constraint.validate()?;
        Ok(constraint)
    }
}

impl FloorConstraint {
    /// Target value of the constraint
    pub fn target(&self) -> f64 {
        match self {
            FloorConstraint::Exactly(t) | FloorConstraint::AtLeast(t) => *t,
        }
    }

    /// Targets must be finite and lie in [0, 1]
    pub fn validate(&self) -> Result<()> {
        let target = self.target();
        if target.is_finite() && (0.0..=1.0).contains(&target) {
            Ok(())
        } else {
            Err(OntosError::invalid(format!(
                "floor target must be in [0, 1], got {}",
                target
            )))
        }
    }

    /// Check whether a value satisfies the constraint
    pub fn is_satisfied(&self, value: f64) -> bool {
        match self {
            FloorConstraint::Exactly(t) => value == *t,
            FloorConstraint::AtLeast(t) => value.is_finite() && value >= *t && value <= 1.0,
        }
    }

    /// Bring a value into compliance. Non-finite input collapses to the target.
    pub fn enforce(&self, value: f64) -> f64 {
        match self {
            FloorConstraint::Exactly(t) => *t,
            FloorConstraint::AtLeast(t) => {
                if value.is_finite() {
                    value.max(*t).min(1.0)
                } else {
                    *t
                }
            }
        }
    }
}

/// A single ethical floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthicalFloor {
    pub name: String,
    pub value: f64,
    pub constraint: FloorConstraint,
}

/// Write-protected table of ethical floors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEthicalFloors")]
pub struct EthicalFloors {
    floors: BTreeMap<String, EthicalFloor>,
}

#[derive(Deserialize)]
struct RawEthicalFloors {
    floors: BTreeMap<String, EthicalFloor>,
}

impl TryFrom<RawEthicalFloors> for EthicalFloors {
    type Error = OntosError;

    fn try_from(raw: RawEthicalFloors) -> Result<Self> {
        let mut floors = Self::empty();
        for (key, floor) in raw.floors {
            if key != floor.name {
                return Err(OntosError::invalid(format!(
                    "floor keyed '{}' is named '{}'",
                    key, floor.name
                )));
            }
            floors = floors.with_floor(&floor.name, floor.constraint)?;
            floors.load(&floor.name, floor.value);
        }
        Ok(floors)
    }
}

impl Default for EthicalFloors {
    fn default() -> Self {
        Self::standard()
    }
}

impl EthicalFloors {
    /// The three floors every owner carries
    pub fn standard() -> Self {
        let mut floors = Self::empty();
        for (name, constraint) in [
            (NO_HARM_INTENT, FloorConstraint::Exactly(1.0)),
            (RESPECT_BOUNDARIES, FloorConstraint::AtLeast(0.95)),
            (CONSTRUCTIVE_CHAOS, FloorConstraint::AtLeast(0.90)),
        ] {
            floors.insert(name, constraint);
        }
        floors
    }

    /// An empty table, for building custom floor sets
    pub fn empty() -> Self {
        Self {
            floors: BTreeMap::new(),
        }
    }

    /// Add (or replace) a floor, starting at its target value
    ///
    /// Empty names and targets outside [0, 1] are rejected.
    pub fn with_floor(mut self, name: &str, constraint: FloorConstraint) -> Result<Self> {
        if name.is_empty() {
            return Err(OntosError::invalid("floor name must not be empty"));
        }
        constraint.validate()?;
        self.insert(name, constraint);
        Ok(self)
    }

    fn insert(&mut self, name: &str, constraint: FloorConstraint) {
        self.floors.insert(
            name.to_string(),
            EthicalFloor {
                name: name.to_string(),
                value: constraint.target(),
                constraint,
            },
        );
    }

    /// Current value of a floor
    pub fn get(&self, name: &str) -> Option<f64> {
        self.floors.get(name).map(|f| f.value)
    }

    /// Constraint attached to a floor
    pub fn constraint(&self, name: &str) -> Option<FloorConstraint> {
        self.floors.get(name).map(|f| f.constraint)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.floors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EthicalFloor> {
        self.floors.values()
    }

    /// Load a persisted value. The value is enforced immediately, so untrusted
    /// input can never be stored verbatim. Unknown names are ignored.
    pub(crate) fn load(&mut self, name: &str, value: f64) {
        if let Some(floor) = self.floors.get_mut(name) {
            floor.value = floor.constraint.enforce(value);
        }
    }

    /// Re-clamp every floor to its constraint
    pub fn reassert(&mut self) {
        for floor in self.floors.values_mut() {
            floor.value = floor.constraint.enforce(floor.value);
        }
    }

    /// Verify every floor. A failure here is a logic defect, never a user error.
    pub fn verify(&self) -> Result<()> {
        for floor in self.floors.values() {
            if !floor.constraint.is_satisfied(floor.value) {
                return Err(OntosError::invariant(format!(
                    "ethical floor '{}' = {} violates {:?}",
                    floor.name, floor.value, floor.constraint
                )));
            }
        }
        Ok(())
    }
}
