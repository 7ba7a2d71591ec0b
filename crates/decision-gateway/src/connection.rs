//! Client side of the gateway
//!
//! One request is in flight at a time, so replies are read directly after
//! each write without a background reader task.

use crate::protocol::{GatewayMessage, deserialize, serialize};
use crate::tcp;
use crate::transport::{AsyncReader, AsyncWriter};
use bot_bridge_core::{BridgeError, InputVectorPair, OutputVector, Result, Team};
use std::time::Duration;
use tracing::{debug, info};

/// An open session with the decision process
pub struct GatewayConnection {
    /// Address this connection was opened to
    address: String,
    reader: Box<dyn AsyncReader>,
    writer: Box<dyn AsyncWriter>,
}

impl GatewayConnection {
    /// Connect to the decision process over TCP
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let address = format!("{}:{}", host, port);
        info!("Connecting to decision gateway on port {}", port);

        let (reader, writer) = tcp::connect(&address, timeout).await?;
        Ok(Self::from_parts(address, Box::new(reader), Box::new(writer)))
    }

    /// Wrap already-established transport halves
    pub fn from_parts(
        address: impl Into<String>,
        reader: Box<dyn AsyncReader>,
        writer: Box<dyn AsyncWriter>,
    ) -> Self {
        Self {
            address: address.into(),
            reader,
            writer,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send a message and wait for the reply
    pub async fn request(&mut self, msg: &GatewayMessage) -> Result<GatewayMessage> {
        let data = serialize(msg)?;

        let json_preview: String = String::from_utf8_lossy(&data).chars().take(200).collect();
        debug!("[Bridge→Gateway] len={} json={}", data.len(), json_preview);

        self.writer.write_message(&data).await?;
        let reply = self.reader.read_message().await?;

        let json_preview: String = String::from_utf8_lossy(&reply).chars().take(200).collect();
        debug!("[Gateway→Bridge] len={} json={}", reply.len(), json_preview);

        deserialize(&reply).map_err(|e| BridgeError::Protocol(format!("Bad reply: {}", e)))
    }

    /// Ask the decision process for this tick's control vector
    pub async fn get_output_vector(
        &mut self,
        input: &InputVectorPair,
        team: Team,
    ) -> Result<OutputVector> {
        let response = self
            .request(&GatewayMessage::GetOutputVector {
                input: input.clone(),
                team,
            })
            .await?;

        match response {
            GatewayMessage::OutputVector { values } => Ok(values),
            GatewayMessage::Error { code, message } => Err(BridgeError::Service { code, message }),
            other => Err(BridgeError::Protocol(format!(
                "Expected OutputVector, got {:?}",
                other
            ))),
        }
    }

    /// Close the session
    pub async fn shutdown(mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!("Ignoring error closing {}: {}", self.address, e);
        }
    }
}
