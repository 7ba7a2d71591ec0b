//! Transport abstractions for the gateway
//!
//! Provides AsyncReader/AsyncWriter traits and a length-prefixed framing
//! over any tokio byte stream. Frames are a 4-byte little-endian length
//! followed by the JSON payload.

use async_trait::async_trait;
use bot_bridge_core::{BridgeError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side will accept
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Trait for async reading from a transport
#[async_trait]
pub trait AsyncReader: Send {
    /// Read a complete message from the transport
    async fn read_message(&mut self) -> Result<Vec<u8>>;
}

/// Trait for async writing to a transport
#[async_trait]
pub trait AsyncWriter: Send {
    /// Write a complete message to the transport
    async fn write_message(&mut self, data: &[u8]) -> Result<()>;

    /// Close the write side
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Length-prefixed reader over a byte stream
#[derive(Debug)]
pub struct FramedReader<R>(pub R);

impl<R> FramedReader<R> {
    pub fn new(inner: R) -> Self {
        Self(inner)
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> AsyncReader for FramedReader<R> {
    async fn read_message(&mut self) -> Result<Vec<u8>> {
        let mut len_bytes = [0u8; 4];
        self.0.read_exact(&mut len_bytes).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                BridgeError::Transport("Connection closed by peer".into())
            } else {
                BridgeError::Transport(format!("Read length failed: {}", e))
            }
        })?;
        let len = u32::from_le_bytes(len_bytes) as usize;

        if len > MAX_FRAME_LEN {
            return Err(BridgeError::Protocol(format!(
                "Message too large: {} bytes",
                len
            )));
        }

        let mut data = vec![0u8; len];
        self.0
            .read_exact(&mut data)
            .await
            .map_err(|e| BridgeError::Transport(format!("Read data failed: {}", e)))?;

        Ok(data)
    }
}

/// Length-prefixed writer over a byte stream
#[derive(Debug)]
pub struct FramedWriter<W>(pub W);

impl<W> FramedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self(inner)
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> AsyncWriter for FramedWriter<W> {
    async fn write_message(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > MAX_FRAME_LEN {
            return Err(BridgeError::Protocol(format!(
                "Message too large: {} bytes",
                data.len()
            )));
        }

        let len = (data.len() as u32).to_le_bytes();
        self.0
            .write_all(&len)
            .await
            .map_err(|e| BridgeError::Transport(format!("Write length failed: {}", e)))?;

        self.0
            .write_all(data)
            .await
            .map_err(|e| BridgeError::Transport(format!("Write data failed: {}", e)))?;

        // Flush to ensure data is sent
        self.0
            .flush()
            .await
            .map_err(|e| BridgeError::Transport(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.0
            .shutdown()
            .await
            .map_err(|e| BridgeError::Transport(format!("Shutdown failed: {}", e)))
    }
}
