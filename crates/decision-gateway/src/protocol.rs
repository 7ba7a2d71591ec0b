//! Wire protocol between the bridge and the decision process
//!
//! Messages are serialized as JSON with internally-tagged enums.
//! Format: {"Type": "MessageType", ...fields}
//!
//! Field names are PascalCase to match the decision process.

use bot_bridge_core::{InputVectorPair, OutputVector, Team};
use serde::{Deserialize, Serialize};

/// Messages exchanged over the gateway
///
/// Note: `rename_all` on enums only affects variant names, not field names inside variants.
/// Each field must be explicitly renamed using `#[serde(rename = "...")]` for PascalCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all = "PascalCase")]
pub enum GatewayMessage {
    // === Bridge -> Decision process ===
    /// Ask for the control vector for one tick
    GetOutputVector {
        #[serde(rename = "Input")]
        input: InputVectorPair,
        #[serde(rename = "Team")]
        team: Team,
    },

    // === Decision process -> Bridge ===
    /// Control vector for the requested tick
    OutputVector {
        #[serde(rename = "Values")]
        values: OutputVector,
    },

    /// Error response
    Error {
        #[serde(rename = "Code")]
        code: i32,
        #[serde(rename = "Message")]
        message: String,
    },
}

/// Serialize a message to JSON bytes
pub fn serialize(msg: &GatewayMessage) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(msg)
}

/// Deserialize a message from JSON bytes
pub fn deserialize(bytes: &[u8]) -> Result<GatewayMessage, serde_json::Error> {
    serde_json::from_slice(bytes)
}
