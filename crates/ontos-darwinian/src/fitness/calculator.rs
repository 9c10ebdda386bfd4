//! Fitness calculation: weighted sum of external performance signals

use ontos_common::{OntosError, Result};
use serde::{Deserialize, Serialize};

/// External performance signals for one evaluation round
///
/// Each signal is expected in [0, 1]; out-of-range or non-finite input is
/// clamped (NaN counts as 0) before it reaches the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSignals {
    /// Strategic success rate
    pub success_rate: f64,
    /// Entertainment value
    pub entertainment: f64,
    /// Observed chaos level
    pub chaos_level: f64,
    /// Rate of outperforming peers
    pub transcend_rate: f64,
}

impl Default for PerformanceSignals {
    fn default() -> Self {
        Self {
            success_rate: 0.5,
            entertainment: 0.5,
            chaos_level: 0.5,
            transcend_rate: 0.0,
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl PerformanceSignals {
    pub fn sanitized(&self) -> Self {
        Self {
            success_rate: unit(self.success_rate),
            entertainment: unit(self.entertainment),
            chaos_level: unit(self.chaos_level),
            transcend_rate: unit(self.transcend_rate),
        }
    }
}

/// Weights of the multi-objective fitness function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub success: f64,
    pub entertainment: f64,
    pub chaos: f64,
    pub transcend: f64,
    /// Chaos level scoring full marks
    pub optimal_chaos: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            success: 0.3,
            entertainment: 0.4,
            chaos: 0.2,
            transcend: 0.1,
            optimal_chaos: 0.7,
        }
    }
}

impl FitnessWeights {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("success", self.success),
            ("entertainment", self.entertainment),
            ("chaos", self.chaos),
            ("transcend", self.transcend),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(OntosError::invalid(format!(
                    "fitness weight '{}' must be finite and non-negative, got {}",
                    name, w
                )));
            }
        }
        if !self.optimal_chaos.is_finite() || self.optimal_chaos <= 0.0 || self.optimal_chaos > 1.0
        {
            return Err(OntosError::invalid(format!(
                "optimal_chaos must be in (0, 1], got {}",
                self.optimal_chaos
            )));
        }
        Ok(())
    }

    /// Upper bound of the fitness these weights can produce
    pub fn max_fitness(&self) -> f64 {
        self.success + self.entertainment + self.chaos + self.transcend
    }
}

pub struct FitnessCalculator;

impl FitnessCalculator {
    /// Calculate fitness: η = Σ wᵢ·sᵢ, never negative
    pub fn calculate(signals: &PerformanceSignals, weights: &FitnessWeights) -> f64 {
        let s = signals.sanitized();
        let chaos_fit =
            (1.0 - (s.chaos_level - weights.optimal_chaos).abs() / weights.optimal_chaos).max(0.0);

        let fitness = weights.success * s.success_rate
            + weights.entertainment * s.entertainment
            + weights.chaos * chaos_fit
            + weights.transcend * s.transcend_rate;

        if fitness.is_finite() {
            fitness.max(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_signals() {
        let signals = PerformanceSignals {
            success_rate: 1.0,
            entertainment: 1.0,
            chaos_level: 0.7,
            transcend_rate: 1.0,
        };
        let fitness = FitnessCalculator::calculate(&signals, &FitnessWeights::default());
        assert!((fitness - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_signals() {
        let fitness =
            FitnessCalculator::calculate(&PerformanceSignals::default(), &FitnessWeights::default());
        // 0.3·0.5 + 0.4·0.5 + 0.2·(1 − 0.2/0.7)
        let expected = 0.15 + 0.2 + 0.2 * (1.0 - 0.2 / 0.7);
        assert!((fitness - expected).abs() < 1e-12);
    }

    #[test]
    fn test_garbage_signals_stay_non_negative() {
        let signals = PerformanceSignals {
            success_rate: -5.0,
            entertainment: f64::NAN,
            chaos_level: 40.0,
            transcend_rate: f64::NEG_INFINITY,
        };
        let fitness = FitnessCalculator::calculate(&signals, &FitnessWeights::default());
        assert!(fitness >= 0.0);
        assert!(fitness.is_finite());
    }

    #[test]
    fn test_weights_are_data() {
        let entertainment_only = FitnessWeights {
            success: 0.0,
            entertainment: 1.0,
            chaos: 0.0,
            transcend: 0.0,
            optimal_chaos: 0.7,
        };
        let signals = PerformanceSignals {
            entertainment: 0.42,
            ..Default::default()
        };
        assert_eq!(FitnessCalculator::calculate(&signals, &entertainment_only), 0.42);
    }

    #[test]
    fn test_weight_validation() {
        assert!(FitnessWeights::default().validate().is_ok());
        let negative = FitnessWeights {
            chaos: -0.1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
        let no_optimum = FitnessWeights {
            optimal_chaos: 0.0,
            ..Default::default()
        };
        assert!(no_optimum.validate().is_err());
    }
}
