//! Sources of external performance signals
//!
//! A provider is consulted once per candidate per round. It receives the
//! candidate genome and the round index so it can model conditions that shift
//! over time or depend on the evolved parameters. Providers must be `Sync`:
//! population members are evaluated in parallel.

use super::calculator::PerformanceSignals;
use crate::genome::Genome;

/// Supplies performance signals for a genome in a given round
pub trait SignalsProvider: Sync {
    fn signals(&self, genome: &Genome, round: u64) -> PerformanceSignals;
}

impl<F> SignalsProvider for F
where
    F: Fn(&Genome, u64) -> PerformanceSignals + Sync,
{
    fn signals(&self, genome: &Genome, round: u64) -> PerformanceSignals {
        self(genome, round)
    }
}

/// The same signals every round, whatever the genome
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantSignals(pub PerformanceSignals);

impl SignalsProvider for ConstantSignals {
    fn signals(&self, _genome: &Genome, _round: u64) -> PerformanceSignals {
        self.0
    }
}
