//! Infrastructure components
pub mod state_store;

pub use state_store::{FileStateStore, InMemoryStateStore, StateStore};
