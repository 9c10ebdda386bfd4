//! # Protocol DNA
//!
//! Lineage primitives for Ontos.
//!
//! ## Primitives
//!
//! - **Spawn**: derive a subordinate from a parent: inherited traits, a
//!   reproduced kernel synced onto them, then explicit overrides

pub mod primitives;

// Re-export primitives
pub use primitives::spawn::{Offspring, SpawnPrimitive, SpawnRequest};
