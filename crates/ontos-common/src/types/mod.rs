//! Core data types for Ontos

pub mod behavior;
pub mod emotion;
pub mod ethical_floor;
pub mod trait_vector;
