//! Persona domain types
pub mod export;
pub mod persona;

pub use export::{PersonaStats, StateDocument};
pub use persona::{Persona, PersonaState};
