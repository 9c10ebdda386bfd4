//! # Ontos Persona
//!
//! Per-agent personality service.
//!
//! A persona bundles an agent's [`TraitVector`](ontos_common::TraitVector),
//! its [`EmotionalState`](ontos_common::EmotionalState) and an evolution
//! [`Kernel`](ontos_darwinian::Kernel). The service keeps one persona per
//! agent id and offers the host a synchronous request/response surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   PersonaService                     │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐      │
//! │  │  Emotion   │  │  Evolve    │  │  Lineage   │      │
//! │  │  & Ticks   │  │  & Sync    │  │  (spawn)   │      │
//! │  └─────┬──────┘  └─────┬──────┘  └─────┬──────┘      │
//! │        └───────────────┼───────────────┘             │
//! │         DashMap<AgentId, Mutex<Persona>>             │
//! │                        │                             │
//! │  ┌─────────────────────┴──────────────────────┐      │
//! │  │   StateStore (file or in-memory)           │      │
//! │  └────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod domain;
pub mod infra;
pub mod protocol;
pub mod service;

// Re-export core types
pub use config::PersonaConfig;
pub use domain::export::{StateDocument, EXPORT_FORMAT, EXPORT_VERSION};
pub use domain::persona::{Persona, PersonaState};
pub use infra::state_store::{FileStateStore, InMemoryStateStore, StateStore};
pub use protocol::{Request, Response};
pub use service::{AgentId, EvolutionResponse, FitnessResponse, PersonaService};

/// Persona service version
pub const PERSONA_VERSION: &str = env!("CARGO_PKG_VERSION");
