//! A single bounded gene

use ontos_common::{OntosError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Role of a gene in the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneType {
    /// Scalar multiplier
    #[default]
    Coefficient,
    /// Decision boundary
    Threshold,
    /// Probabilistic weight
    Probability,
    /// Differential operator parameter
    Operator,
    /// Architectural parameter
    Structure,
}

/// Named gene with a declared valid range
///
/// The value is always inside `[min, max]`: construction rejects anything
/// else, setters clamp, and deserialization clamps untrusted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGene")]
pub struct Gene {
    name: String,
    gene_type: GeneType,
    value: f64,
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawGene {
    name: String,
    #[serde(default)]
    gene_type: GeneType,
    value: f64,
    #[serde(default)]
    min: f64,
    #[serde(default = "unit_max")]
    max: f64,
}

fn unit_max() -> f64 {
    1.0
}

impl TryFrom<RawGene> for Gene {
    type Error = OntosError;

    fn try_from(raw: RawGene) -> Result<Self> {
        validate_range(&raw.name, raw.min, raw.max)?;
        if !raw.value.is_finite() {
            return Err(OntosError::Serialization(format!(
                "gene '{}' has non-finite value",
                raw.name
            )));
        }
        Ok(Self {
            value: raw.value.clamp(raw.min, raw.max),
            name: raw.name,
            gene_type: raw.gene_type,
            min: raw.min,
            max: raw.max,
        })
    }
}

fn validate_range(name: &str, min: f64, max: f64) -> Result<()> {
    if name.is_empty() {
        return Err(OntosError::invalid("gene name must not be empty"));
    }
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(OntosError::invalid(format!(
            "gene '{}' has invalid range [{}, {}]",
            name, min, max
        )));
    }
    Ok(())
}

impl Gene {
    /// Create a gene, rejecting values outside its range
    pub fn new(name: &str, gene_type: GeneType, value: f64, min: f64, max: f64) -> Result<Self> {
        validate_range(name, min, max)?;
        if !value.is_finite() || value < min || value > max {
            return Err(OntosError::OutOfRangeGene {
                name: name.to_string(),
                value,
                min,
                max,
            });
        }
        Ok(Self {
            name: name.to_string(),
            gene_type,
            value,
            min,
            max,
        })
    }

    /// Built-in seed gene. Ranges are static, so the value is clamped rather
    /// than checked.
    pub(crate) fn seed(name: &str, gene_type: GeneType, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            gene_type,
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    /// Coefficient gene over [0, 1]
    pub fn coefficient(name: &str, value: f64) -> Result<Self> {
        Self::new(name, GeneType::Coefficient, value, 0.0, 1.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gene_type(&self) -> GeneType {
        self.gene_type
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn in_range(&self) -> bool {
        self.value.is_finite() && self.value >= self.min && self.value <= self.max
    }

    /// Same name, type and range
    pub fn same_locus(&self, other: &Gene) -> bool {
        self.name == other.name
            && self.gene_type == other.gene_type
            && self.min == other.min
            && self.max == other.max
    }

    /// Set the value, clamped into range. Non-finite input is rejected.
    pub fn set_value(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(OntosError::invalid(format!(
                "gene '{}' cannot take non-finite value",
                self.name
            )));
        }
        self.value = value.clamp(self.min, self.max);
        Ok(())
    }

    /// Copy with the value moved by a bounded delta of at most `rate · span`
    pub(crate) fn perturbed<R: Rng + ?Sized>(&self, rate: f64, rng: &mut R) -> Gene {
        let delta = rng.gen_range(-1.0..=1.0) * rate * self.span();
        Gene {
            value: (self.value + delta).clamp(self.min, self.max),
            ..self.clone()
        }
    }

    /// Copy carrying a different value, clamped into range
    pub(crate) fn with_value(&self, value: f64) -> Gene {
        Gene {
            value: value.clamp(self.min, self.max),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_rejects_out_of_range() {
        let err = Gene::new("learning_rate", GeneType::Coefficient, 0.5, 0.01, 0.2).unwrap_err();
        assert!(matches!(err, OntosError::OutOfRangeGene { .. }));
        assert!(Gene::new("x", GeneType::Threshold, 0.5, 1.0, 0.0).is_err());
        assert!(Gene::new("", GeneType::Threshold, 0.5, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_set_value_clamps() {
        let mut gene = Gene::new("rate", GeneType::Coefficient, 0.1, 0.0, 0.5).unwrap();
        gene.set_value(0.9).unwrap();
        assert_eq!(gene.value(), 0.5);
        gene.set_value(-1.0).unwrap();
        assert_eq!(gene.value(), 0.0);
        assert!(gene.set_value(f64::NAN).is_err());
    }

    #[test]
    fn test_perturbation_is_bounded() {
        let gene = Gene::new("t", GeneType::Threshold, 0.75, 0.5, 0.95).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..1000 {
            let mutated = gene.perturbed(0.2, &mut rng);
            assert!(mutated.in_range());
            assert!((mutated.value() - gene.value()).abs() <= 0.2 * gene.span() + 1e-12);
        }
    }

    #[test]
    fn test_deserialize_clamps() {
        let json = r#"{"name":"g","gene_type":"probability","value":3.0,"min":0.1,"max":0.8}"#;
        let gene: Gene = serde_json::from_str(json).unwrap();
        assert_eq!(gene.value(), 0.8);
        assert_eq!(gene.gene_type(), GeneType::Probability);

        let bad = r#"{"name":"g","value":0.5,"min":2.0,"max":1.0}"#;
        assert!(serde_json::from_str::<Gene>(bad).is_err());
    }
}
