//! Elitist selection: keep the top k of N, refill the rest

use std::cmp::Reverse;

use ontos_common::{OntosError, Result};
use ordered_float::OrderedFloat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElitistSelection {
    elite_size: usize,
    population_size: usize,
}

impl ElitistSelection {
    /// Requires 1 ≤ elite_size < population_size
    pub fn new(elite_size: usize, population_size: usize) -> Result<Self> {
        if elite_size == 0 || elite_size >= population_size {
            return Err(OntosError::invalid(format!(
                "elite size must be in [1, {}), got {}",
                population_size, elite_size
            )));
        }
        Ok(Self {
            elite_size,
            population_size,
        })
    }

    pub fn elite_size(&self) -> usize {
        self.elite_size
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Slots refilled by offspring each generation
    pub fn offspring_count(&self) -> usize {
        self.population_size - self.elite_size
    }

    /// Member indices by descending fitness. Ties keep their original order.
    pub fn rank(&self, fitness: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..fitness.len()).collect();
        order.sort_by_key(|&i| Reverse(OrderedFloat(fitness[i])));
        order
    }

    /// Indices of the retained members
    pub fn survivors(&self, fitness: &[f64]) -> Vec<usize> {
        let mut order = self.rank(fitness);
        order.truncate(self.elite_size);
        order
    }
}
