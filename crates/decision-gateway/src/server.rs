//! Gateway server hosting a decision service
//!
//! The decision process binds a local port and answers `GetOutputVector`
//! requests from any number of bridges. Each connection is served on its
//! own task; the service itself is shared behind a mutex.

use crate::protocol::{GatewayMessage, deserialize, serialize};
use crate::tcp;
use crate::transport::{AsyncReader, AsyncWriter};
use async_trait::async_trait;
use bot_bridge_core::{BridgeError, InputVectorPair, OutputVector, Result, Team, error_codes};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Trait for implementing a decision process
///
/// Implement this trait to answer control requests from bridges.
#[async_trait]
pub trait DecisionService: Send + 'static {
    /// Produce the control vector for one tick
    async fn output_vector(&mut self, input: InputVectorPair, team: Team) -> Result<OutputVector>;
}

/// Decision gateway server
pub struct GatewayServer<S: DecisionService> {
    service: Arc<Mutex<S>>,
}

impl<S: DecisionService> GatewayServer<S> {
    /// Create a new server around the given service
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }

    /// Serve connections accepted from `listener`
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener
                .accept()
                .await
                .map_err(|e| BridgeError::Transport(format!("Accept failed: {}", e)))?;
            debug!("Bridge connected from {}", peer);

            let service = self.service.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(service, stream).await {
                    warn!("Connection from {} ended: {}", peer, e);
                }
            });
        }
    }
}

/// Serve one bridge until it disconnects
async fn handle_connection<S: DecisionService>(
    service: Arc<Mutex<S>>,
    stream: TcpStream,
) -> Result<()> {
    let (mut reader, mut writer) = tcp::split(stream)?;

    loop {
        let data = match reader.read_message().await {
            Ok(data) => data,
            Err(BridgeError::Transport(_)) => {
                debug!("Bridge disconnected");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let reply = match deserialize(&data) {
            Ok(msg) => respond(&service, msg).await,
            Err(e) => {
                error!("Failed to deserialize request: {}", e);
                GatewayMessage::Error {
                    code: error_codes::INVALID_REQUEST,
                    message: e.to_string(),
                }
            }
        };

        writer.write_message(&serialize(&reply)?).await?;
    }
}

/// Answer a single request
pub async fn respond<S: DecisionService>(
    service: &Mutex<S>,
    msg: GatewayMessage,
) -> GatewayMessage {
    match msg {
        GatewayMessage::GetOutputVector { input, team } => {
            match service.lock().await.output_vector(input, team).await {
                Ok(values) => GatewayMessage::OutputVector { values },
                Err(e) => {
                    warn!("Decision for {} failed: {}", team, e);
                    GatewayMessage::Error {
                        code: error_codes::DECISION_FAILED,
                        message: e.to_string(),
                    }
                }
            }
        }
        other => GatewayMessage::Error {
            code: error_codes::INVALID_REQUEST,
            message: format!("Unexpected request: {:?}", other),
        },
    }
}
