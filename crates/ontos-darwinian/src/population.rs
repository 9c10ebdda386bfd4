//! Population - fixed-size set of kernels evolved generation by generation
//!
//! Members are evaluated in parallel; ranking is the barrier. Each generation
//! is built on a staged member list and committed only when complete.

use ontos_common::{OntosError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::fitness::provider::SignalsProvider;
use crate::kernel::Kernel;
use crate::selection::policy::ElitistSelection;

/// Summary of one evolved generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation index that was evaluated
    pub generation: u64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub retained: usize,
    pub offspring: usize,
}

#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Kernel>,
    selection: ElitistSelection,
    generation: u64,
}

impl Population {
    /// Requires at least two members and 1 ≤ elite_size < members
    pub fn new(members: Vec<Kernel>, elite_size: usize) -> Result<Self> {
        if members.len() < 2 {
            return Err(OntosError::invalid(format!(
                "population needs at least 2 members, got {}",
                members.len()
            )));
        }
        let selection = ElitistSelection::new(elite_size, members.len())?;
        Ok(Self {
            members,
            selection,
            generation: 0,
        })
    }

    /// `size` members derived from `seed`: the seed itself plus mutated copies
    pub fn from_seed<R: Rng + ?Sized>(
        seed: &Kernel,
        size: usize,
        elite_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let rate = seed.config().mutation_rate;
        let mut members = Vec::with_capacity(size);
        members.push(seed.clone());
        while members.len() < size {
            let mut member = seed.clone();
            member.reset_history();
            member.mutate(rate, rng)?;
            members.push(member);
        }
        Self::new(members, elite_size)
    }

    pub fn members(&self) -> &[Kernel] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn elite_size(&self) -> usize {
        self.selection.elite_size()
    }

    /// Member with the highest cached fitness
    pub fn best(&self) -> Option<&Kernel> {
        let fitness: Vec<f64> = self.members.iter().map(Kernel::fitness).collect();
        self.selection
            .rank(&fitness)
            .first()
            .and_then(|&i| self.members.get(i))
    }

    /// Evaluate, rank, retain the elite and refill with their offspring
    ///
    /// Every refill child comes out of [`Kernel::reproduce`], which already
    /// applies one mutation at `reproduction_mutation_rate`. With probability
    /// `mutation_rate` the child gets one more mutation at that same low rate.
    pub fn evolve_generation<P, R>(&mut self, provider: &P, rng: &mut R) -> Result<GenerationReport>
    where
        P: SignalsProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let round = self.generation;
        let mut evaluated = self.members.clone();
        evaluated.par_iter_mut().for_each(|member| {
            member.evaluate(provider, round);
        });

        // Barrier: every member is evaluated before ranking starts
        let fitness: Vec<f64> = evaluated.iter().map(Kernel::fitness).collect();
        let survivors = self.selection.survivors(&fitness);
        let best_fitness = survivors.first().map(|&i| fitness[i]).unwrap_or(0.0);
        let mean_fitness = fitness.iter().sum::<f64>() / fitness.len() as f64;

        let elite: Vec<Kernel> = survivors.iter().map(|&i| evaluated[i].clone()).collect();
        let mut next = elite.clone();
        while next.len() < self.members.len() {
            let (a, b) = match (elite.choose(rng), elite.choose(rng)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(OntosError::invariant("no elite members to reproduce from")),
            };
            let mut child = a.reproduce(b, rng)?;
            let config = a.config();
            if rng.gen_bool(config.mutation_rate) {
                child.mutate(config.reproduction_mutation_rate, rng)?;
            }
            next.push(child);
        }

        let report = GenerationReport {
            generation: round,
            best_fitness,
            mean_fitness,
            retained: elite.len(),
            offspring: next.len() - elite.len(),
        };

        self.members = next;
        self.generation += 1;

        debug!(
            generation = report.generation,
            best = report.best_fitness,
            mean = report.mean_fitness,
            "Generation evolved"
        );
        Ok(report)
    }

    /// Run several generations
    pub fn evolve<P, R>(
        &mut self,
        generations: usize,
        provider: &P,
        rng: &mut R,
    ) -> Result<Vec<GenerationReport>>
    where
        P: SignalsProvider + ?Sized,
        R: Rng + ?Sized,
    {
        if generations == 0 {
            return Err(OntosError::invalid("generations must be at least 1"));
        }
        let mut staged = self.clone();
        let reports = (0..generations)
            .map(|_| staged.evolve_generation(provider, rng))
            .collect::<Result<Vec<_>>>()?;
        *self = staged;

        if let Some(last) = reports.last() {
            info!(
                generations,
                best = last.best_fitness,
                mean = last.mean_fitness,
                "Population evolved"
            );
        }
        Ok(reports)
    }
}
