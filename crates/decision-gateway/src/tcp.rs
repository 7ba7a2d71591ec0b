//! TCP transport for the gateway
//!
//! The decision process listens on a local TCP port; both the bridge and the
//! gateway server frame messages over split stream halves.

use crate::transport::{FramedReader, FramedWriter};
use bot_bridge_core::{BridgeError, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// Framed read half of a TCP connection
pub type TcpReadWrapper = FramedReader<OwnedReadHalf>;

/// Framed write half of a TCP connection
pub type TcpWriteWrapper = FramedWriter<OwnedWriteHalf>;

/// Connect to `addr` within `timeout` and split into framed halves
pub async fn connect(addr: &str, timeout: Duration) -> Result<(TcpReadWrapper, TcpWriteWrapper)> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| BridgeError::Transport(format!("Connection timeout to {}", addr)))?
        .map_err(|e| BridgeError::Transport(format!("Failed to connect to {}: {}", addr, e)))?;

    split(stream)
}

/// Split an established stream into framed halves
pub fn split(stream: TcpStream) -> Result<(TcpReadWrapper, TcpWriteWrapper)> {
    // Disable Nagle's algorithm, one small frame per tick
    stream
        .set_nodelay(true)
        .map_err(|e| BridgeError::Transport(format!("Failed to set TCP_NODELAY: {}", e)))?;

    let (read_half, write_half) = stream.into_split();
    Ok((FramedReader::new(read_half), FramedWriter::new(write_half)))
}
