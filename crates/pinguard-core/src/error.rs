//! Error types for the PinGuard core library

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors that can occur while loading or saving guard configuration
#[derive(Debug, Error)]
pub enum GuardError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Config directory could not be resolved
    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl From<serde_json::Error> for GuardError {
    fn from(e: serde_json::Error) -> Self {
        GuardError::Serialization(e.to_string())
    }
}
