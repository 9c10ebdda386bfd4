//! Fitness evaluation
pub mod appraisal;
pub mod calculator;
pub mod provider;

pub use self::calculator::FitnessCalculator;
