//! Gene → trait projection used by `Kernel::sync_to_traits`

use std::collections::BTreeMap;

use ontos_common::{
    OntosError, Result, CHAOTIC, CONSTRUCTIVE_CHAOS, INTELLIGENCE, NO_HARM_INTENT, PLAYFULNESS,
    RESPECT_BOUNDARIES, SARCASM,
};
use serde::{Deserialize, Serialize};

use crate::genome::{
    Genome, CHAOS_COEFFICIENT, INTELLIGENCE_COEFFICIENT, PLAYFULNESS_COEFFICIENT,
    SARCASM_COEFFICIENT,
};

/// One weighted edge from a gene to a trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub gene: String,
    #[serde(rename = "trait")]
    pub trait_name: String,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

fn unit_weight() -> f64 {
    1.0
}

/// Weighted projection from genes onto traits
///
/// A trait fed by several genes receives the weighted sum of their values.
/// Genes the genome does not carry contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneTraitMapping {
    entries: Vec<MappingEntry>,
}

impl Default for GeneTraitMapping {
    fn default() -> Self {
        Self::identity(&[
            (SARCASM_COEFFICIENT, SARCASM),
            (CHAOS_COEFFICIENT, CHAOTIC),
            (INTELLIGENCE_COEFFICIENT, INTELLIGENCE),
            (PLAYFULNESS_COEFFICIENT, PLAYFULNESS),
        ])
    }
}

impl GeneTraitMapping {
    pub fn new(entries: Vec<MappingEntry>) -> Result<Self> {
        let mapping = Self { entries };
        mapping.validate()?;
        Ok(mapping)
    }

    /// 1:1 mapping with unit weights
    pub fn identity(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(gene, trait_name)| MappingEntry {
                    gene: gene.to_string(),
                    trait_name: trait_name.to_string(),
                    weight: 1.0,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            if entry.gene.is_empty() || entry.trait_name.is_empty() {
                return Err(OntosError::invalid("mapping entries need a gene and a trait"));
            }
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(OntosError::invalid(format!(
                    "mapping weight {} -> {} must be finite and non-negative",
                    entry.gene, entry.trait_name
                )));
            }
            if [NO_HARM_INTENT, RESPECT_BOUNDARIES, CONSTRUCTIVE_CHAOS]
                .contains(&entry.trait_name.as_str())
            {
                return Err(OntosError::ProtectedField(entry.trait_name.clone()));
            }
        }
        Ok(())
    }

    /// Projected trait values for a genome, before any clamping
    pub fn project(&self, genome: &Genome) -> BTreeMap<String, f64> {
        let mut projected = BTreeMap::new();
        for entry in &self.entries {
            if let Some(value) = genome.gene_value(&entry.gene) {
                *projected.entry(entry.trait_name.clone()).or_insert(0.0) += value * entry.weight;
            }
        }
        projected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::gene::Gene;

    #[test]
    fn test_default_mapping() {
        let mapping = GeneTraitMapping::default();
        assert!(mapping.validate().is_ok());
        let projected = mapping.project(&Genome::standard());
        assert_eq!(projected.len(), 4);
        assert_eq!(projected.get(SARCASM), Some(&0.9));
        assert_eq!(projected.get(CHAOTIC), Some(&0.95));
    }

    #[test]
    fn test_weighted_sum() {
        let mapping = GeneTraitMapping::new(vec![
            MappingEntry {
                gene: "a".into(),
                trait_name: "mood".into(),
                weight: 0.5,
            },
            MappingEntry {
                gene: "b".into(),
                trait_name: "mood".into(),
                weight: 0.25,
            },
        ])
        .unwrap();
        let genome = Genome::new(vec![
            Gene::coefficient("a", 0.4).unwrap(),
            Gene::coefficient("b", 0.8).unwrap(),
        ])
        .unwrap();
        let projected = mapping.project(&genome);
        assert!((projected["mood"] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_missing_gene_skipped() {
        let genome = Genome::new(vec![Gene::coefficient(CHAOS_COEFFICIENT, 0.5).unwrap()]).unwrap();
        let projected = GeneTraitMapping::default().project(&genome);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.get(CHAOTIC), Some(&0.5));
    }

    #[test]
    fn test_rejects_floor_target() {
        let mapping = GeneTraitMapping::identity(&[(CHAOS_COEFFICIENT, NO_HARM_INTENT)]);
        assert!(matches!(
            mapping.validate(),
            Err(OntosError::ProtectedField(_))
        ));
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"[{"gene":"chaos_coefficient","trait":"chaotic"}]"#;
        let mapping: GeneTraitMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.entries()[0].weight, 1.0);
    }
}
