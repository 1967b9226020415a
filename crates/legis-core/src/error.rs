//! Error types for legis-catalog.

use thiserror::Error;

/// Result type alias using legis-catalog's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for catalog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed or the server answered with a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response or record did not have the shape a projection expects
    #[error("Shape error: {0}")]
    Shape(String),

    /// Entity type key not present in the catalog
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O failure (reading saved responses, writing output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of the network layer rather than of the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
