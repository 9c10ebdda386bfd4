//! Versioned export document
//!
//! The document is plain JSON. Unknown fields are ignored on import, so older
//! readers accept documents from newer writers of the same major version.
//! Every value is re-validated: traits are clamped, floors re-enforced and
//! genes clamped into range.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ontos_common::{EmotionalState, OntosError, Result, TraitVector};
use ontos_darwinian::{DarwinianConfig, Kernel, KernelSnapshot};
use serde::{Deserialize, Serialize};

use super::persona::Persona;

pub const EXPORT_FORMAT: &str = "ontos.persona";
pub const EXPORT_VERSION: u32 = 1;

/// Counters carried alongside the persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaStats {
    pub transcend_count: u64,
    pub evolution_generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub format: String,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    /// Flat `trait.<name>` / `floor.<name>` map
    pub traits: BTreeMap<String, f64>,
    #[serde(default)]
    pub emotion: EmotionalState,
    pub kernel: KernelSnapshot,
    #[serde(default)]
    pub stats: PersonaStats,
}

impl StateDocument {
    pub fn from_persona(persona: &Persona) -> Self {
        Self {
            format: EXPORT_FORMAT.to_string(),
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            traits: persona.traits.serialize(),
            emotion: persona.emotion,
            kernel: persona.kernel.snapshot(),
            stats: persona.stats,
        }
    }

    /// Rebuild the persona, trusting nothing in the document
    pub fn into_persona(self, config: Arc<DarwinianConfig>) -> Result<Persona> {
        self.check_header()?;
        let traits = TraitVector::deserialize_standard(&self.traits)?;
        let kernel = Kernel::from_snapshot(self.kernel, config)?;
        Ok(Persona {
            traits,
            emotion: self.emotion,
            kernel,
            stats: self.stats,
        })
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json(blob: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(blob)?;
        document.check_header()?;
        Ok(document)
    }

    fn check_header(&self) -> Result<()> {
        if self.format != EXPORT_FORMAT {
            return Err(OntosError::Serialization(format!(
                "unexpected document format '{}'",
                self.format
            )));
        }
        if self.version > EXPORT_VERSION {
            return Err(OntosError::Serialization(format!(
                "document version {} is newer than supported version {}",
                self.version, EXPORT_VERSION
            )));
        }
        Ok(())
    }
}
