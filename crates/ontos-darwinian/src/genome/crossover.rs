//! Gene recombination strategies

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::gene::Gene;

/// How a child's gene is derived from its two parents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverStrategy {
    /// Per gene, a fair coin chooses between `Uniform` and `Blend`
    #[default]
    Mixed,
    /// Take one parent's value, chosen by a fair coin
    Uniform,
    /// Average the parents' values
    Blend,
}

impl CrossoverStrategy {
    /// Recombine one locus. Both genes must share name and range.
    pub(crate) fn recombine<R: Rng + ?Sized>(&self, a: &Gene, b: &Gene, rng: &mut R) -> Gene {
        let blend = match self {
            CrossoverStrategy::Mixed => rng.gen_bool(0.5),
            CrossoverStrategy::Uniform => false,
            CrossoverStrategy::Blend => true,
        };
        if blend {
            a.with_value((a.value() + b.value()) / 2.0)
        } else if rng.gen_bool(0.5) {
            a.clone()
        } else {
            b.clone()
        }
    }
}
