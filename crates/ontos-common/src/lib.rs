//! # Ontos Common
//!
//! Shared types and errors for the Ontos personality evolution engine.
//!
//! ## Core Types
//!
//! - [`TraitVector`]: bounded behavior traits plus write-protected ethical floors
//! - [`TraitRegistry`]: the fixed set of allowed trait names and their ranges
//! - [`EthicalFloors`]: exact and minimum constraints reasserted after every write
//! - [`EmotionalState`]: decaying emotion driven by external task events
//!
//! ## Behavior
//!
//! - [`FrameMode`]: pure framing of incoming text
//! - [`CommentaryContext`]: seeded, probabilistic commentary selection

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{OntosError, Result};
pub use types::{
    behavior::{CommentaryContext, FrameMode, FRAME_ACTIVATION},
    emotion::{CommentaryStyle, EmotionKind, EmotionalEvent, EmotionalState},
    ethical_floor::{
        EthicalFloor, EthicalFloors, FloorConstraint, CONSTRUCTIVE_CHAOS, NO_HARM_INTENT,
        RESPECT_BOUNDARIES,
    },
    trait_vector::{
        TraitRegistry, TraitSpec, TraitVector, CHAOTIC, COGNITIVE_POWER, EMPATHY,
        EVOLUTION_RATE, INTELLIGENCE, PLAYFULNESS, SARCASM,
    },
};

/// Ontos version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default blend weight of parent traits on inheritance
pub const DEFAULT_INHERITANCE_FACTOR: f64 = 0.7;

/// Default mutation rate for self-optimization
pub const DEFAULT_MUTATION_RATE: f64 = 0.15;

/// Default mutation rate applied to offspring after crossover
pub const DEFAULT_REPRODUCTION_MUTATION_RATE: f64 = 0.05;
