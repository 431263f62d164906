//! Error types for the Windgate library.

use thiserror::Error;

/// Main error type for Windgate operations.
#[derive(Error, Debug)]
pub enum WindgateError {
    /// A client or resource identity passed to key derivation was invalid.
    /// This is a programmer error and is never retried.
    #[error("Invalid key input: {0}")]
    InvalidKeyInput(String),

    /// A policy violated its construction-time constraints. Surfaces at
    /// configuration load, never at request time.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// A request named a resource scope with no registered policy.
    #[error("No rate limit policy registered for scope '{0}'")]
    UnknownScope(String),

    /// The counter store could not be reached or timed out. Transient;
    /// translated by the configured failure mode.
    #[error("Counter store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Windgate operations.
pub type Result<T> = std::result::Result<T, WindgateError>;
