//! Action appraisal: score a proposed action against the owner's traits

use ontos_common::{TraitVector, CHAOTIC, INTELLIGENCE, PLAYFULNESS};
use serde::{Deserialize, Serialize};

/// Host's assessment of a proposed action
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionAppraisal {
    pub causes_harm: bool,
    pub entertainment: f64,
    pub strategic: f64,
    pub chaos: f64,
}

impl ActionAppraisal {
    /// Score in [0, 1]. Harmful actions are vetoed outright.
    pub fn score(&self, traits: &TraitVector) -> f64 {
        if self.causes_harm {
            return 0.0;
        }

        let e = self.entertainment.clamp(0.0, 1.0);
        let s = self.strategic.clamp(0.0, 1.0);
        let c = self.chaos.clamp(0.0, 1.0);

        let mut score = 0.3 * e + 0.4 * s + 0.3 * c;
        if traits.value_or(PLAYFULNESS, 0.0) > 0.8 {
            score += 0.1 * e;
        }
        if traits.value_or(CHAOTIC, 0.0) > 0.9 {
            score += 0.15 * c;
        }
        if traits.value_or(INTELLIGENCE, 0.0) > 0.9 {
            score += 0.1 * s;
        }

        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harm_is_vetoed() {
        let action = ActionAppraisal {
            causes_harm: true,
            entertainment: 1.0,
            strategic: 1.0,
            chaos: 1.0,
        };
        assert_eq!(action.score(&TraitVector::standard()), 0.0);
    }

    #[test]
    fn test_trait_bonuses() {
        let action = ActionAppraisal {
            causes_harm: false,
            entertainment: 0.5,
            strategic: 0.5,
            chaos: 0.5,
        };
        let mut dull = TraitVector::standard();
        dull.apply_overrides([(PLAYFULNESS, 0.1), (CHAOTIC, 0.1), (INTELLIGENCE, 0.1)])
            .unwrap();
        let base = action.score(&dull);
        assert!((base - 0.5).abs() < 1e-12);
        assert!(action.score(&TraitVector::standard()) > base);
    }

    #[test]
    fn test_score_capped() {
        let action = ActionAppraisal {
            causes_harm: false,
            entertainment: 1.0,
            strategic: 1.0,
            chaos: 1.0,
        };
        assert_eq!(action.score(&TraitVector::standard()), 1.0);
    }
}
