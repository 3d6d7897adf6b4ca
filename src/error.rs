//! Error types

use thiserror::Error;

/// Result alias for fallible crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop the server
#[derive(Debug, Error)]
pub enum Error {
    /// Binding, accepting or serving failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured bind address could not be parsed or resolved
    #[error("invalid address: {0}")]
    InvalidAddr(String),
}
