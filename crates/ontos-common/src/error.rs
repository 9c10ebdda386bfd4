//! Error types for the Ontos engine
//!
//! Provides a unified error type shared by every crate in the workspace.
//! Request-level failures (`InvalidArgument`, `ProtectedField`, ...) leave all
//! state untouched; invariant failures are fatal and abort the operation.

use thiserror::Error;

/// Result type alias using OntosError
pub type Result<T> = std::result::Result<T, OntosError>;

/// Unified error type for Ontos operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OntosError {
    // Input validation errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Field '{0}' is an ethical floor and cannot be written directly")]
    ProtectedField(String),

    #[error("Unknown trait: {0}")]
    UnknownTrait(String),

    // Genome errors
    #[error("Gene '{name}' out of range: {value} not in [{min}, {max}]")]
    OutOfRangeGene {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Incompatible genomes: {0}")]
    IncompatibleGenomes(String),

    // Internal invariant violated after a state-changing operation
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(u32),
}

impl OntosError {
    /// Create an invalid argument error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Fatal errors indicate a logic defect in clamp/mutate code rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OntosError::OutOfRangeGene { .. } | OntosError::InvariantViolation(_)
        )
    }
}

impl From<serde_json::Error> for OntosError {
    fn from(err: serde_json::Error) -> Self {
        OntosError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for OntosError {
    fn from(err: std::io::Error) -> Self {
        OntosError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for OntosError {
    fn from(err: config::ConfigError) -> Self {
        OntosError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OntosError::ProtectedField("no_harm_intent".to_string());
        assert!(err.to_string().contains("no_harm_intent"));
    }

    #[test]
    fn test_out_of_range_gene_display() {
        let err = OntosError::OutOfRangeGene {
            name: "learning_rate".to_string(),
            value: 0.5,
            min: 0.01,
            max: 0.2,
        };
        assert!(err.to_string().contains("learning_rate"));
        assert!(err.to_string().contains("0.2"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(OntosError::invariant("floor broken").is_fatal());
        assert!(!OntosError::invalid("bad intensity").is_fatal());
        assert!(!OntosError::ProtectedField("x".into()).is_fatal());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: OntosError = parse.unwrap_err().into();
        assert!(matches!(err, OntosError::Serialization(_)));
    }
}
