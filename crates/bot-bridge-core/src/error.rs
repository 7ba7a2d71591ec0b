//! Error types for the bot bridge

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration could not be read
    #[error("Config error: {0}")]
    Config(String),

    /// Port file content is not a valid port number
    #[error("Invalid port {value:?}: {reason}")]
    InvalidPort { value: String, reason: String },

    /// Connection lost or remote call failed in transit
    #[error("Transport error: {0}")]
    Transport(String),

    /// Reconnecting after a transport failure did not succeed
    #[error("Reconnect failed after {attempts} attempt(s): {source}")]
    Reconnect {
        attempts: u32,
        #[source]
        source: Box<BridgeError>,
    },

    /// Unexpected or malformed message
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Decision service reported an error
    #[error("Service error {code}: {message}")]
    Service { code: i32, message: String },

    /// Virtual joystick update failed
    #[error("Device {device} error: {message}")]
    Device { device: u32, message: String },
}

impl BridgeError {
    /// Whether the error means the connection handle can no longer be trusted
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_) | BridgeError::Reconnect { .. })
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

/// Error codes carried in gateway `Error` replies
pub mod error_codes {
    pub const INVALID_REQUEST: i32 = -32600;
    pub const DECISION_FAILED: i32 = -32000;
}
