//! Error types for type-ratio computations
//!
//! Provides a unified error type for all type-ratio crates.

use thiserror::Error;

/// Core error type for type-ratio operations
#[derive(Error, Debug)]
pub enum Error {
    /// The request violates a data-model invariant
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A stored artifact failed its format or length invariants
    #[error("Malformed artifact {name}: {reason}")]
    MalformedArtifact { name: String, reason: String },

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error (for store operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a token present in both universes
    pub fn overlap(token: impl std::fmt::Debug) -> Self {
        Self::InvalidRequest(format!(
            "token {token:?} appears in both universe 0 and universe 1"
        ))
    }

    /// Create an error for a malformed artifact
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an error for a level outside [0, 1]
    pub fn invalid_level(level: f64) -> Self {
        Self::InvalidParameter(format!("Level {level} must be in [0, 1]"))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidParameter(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Whether this error marks an unusable artifact rather than a failed run
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedArtifact { .. })
    }

    /// Whether this is an IO error for a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
