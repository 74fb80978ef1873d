//! Error types for fxbridge

use thiserror::Error;

/// Result type for fxbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// fxbridge error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Server unreachable or password rejected
    #[error("Connection failed: {0}")]
    Connection(String),

    /// No reply before the deadline; carries the offending command
    #[error("Command timeout: {0}")]
    Timeout(String),

    /// Datagram socket error
    #[error("Socket error: {0}")]
    Socket(String),

    /// Malformed protocol traffic
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing or unusable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err.to_string())
    }
}
