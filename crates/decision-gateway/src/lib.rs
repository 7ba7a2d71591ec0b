//! Gateway between the bot bridge and an external decision process
//!
//! This crate provides:
//! - Wire protocol for output vector requests and replies
//! - Framed transport abstractions (AsyncReader/AsyncWriter traits)
//! - TCP transport
//! - Client-side connection used by the bridge
//! - Gateway server hosting a `DecisionService`

pub mod connection;
pub mod protocol;
pub mod server;
pub mod tcp;
pub mod transport;

pub use connection::GatewayConnection;
pub use protocol::{GatewayMessage, deserialize, serialize};
pub use server::{DecisionService, GatewayServer};
pub use transport::{AsyncReader, AsyncWriter, FramedReader, FramedWriter, MAX_FRAME_LEN};
