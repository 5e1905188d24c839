//! Error types for the Wealthgate client

use thiserror::Error;

/// Errors that can occur when using the Wealthgate client
#[derive(Error, Debug)]
pub enum GateError {
    /// Request to the server failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Server rejected the request body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Server failed while verifying
    #[error("Server error: {0}")]
    Server(String),

    /// Failed to serialize/deserialize a body or the token file
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token storage failed
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for Wealthgate client operations
pub type Result<T> = std::result::Result<T, GateError>;
