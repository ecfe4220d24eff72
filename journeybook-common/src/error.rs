//! Common error types for JourneyBook

use thiserror::Error;

/// Common result type for JourneyBook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the gallery core
#[derive(Error, Debug)]
pub enum Error {
    /// Directory or description artifact missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Read, write or copy failure (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation request failed or returned a non-2xx status
    #[error("Network error: {0}")]
    Network(String),

    /// Generation response lacked the expected fields
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input (e.g. a source path without a file name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for errors caused by a missing file or directory
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
