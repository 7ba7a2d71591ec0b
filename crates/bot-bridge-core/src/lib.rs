//! # bot-bridge-core
//!
//! Core types shared by the bot bridge crates.
//!
//! This crate provides:
//! - Team designators
//! - Input vector pairs and the 7-field output control vector
//! - Error taxonomy
//! - Port configuration and the bounded reconnect policy
//! - Virtual joystick state and the neutral reset operation

pub mod config;
pub mod device;
pub mod error;
pub mod input;
pub mod output;
pub mod team;

pub use config::{BridgeConfig, DEFAULT_PORT, DEFAULT_PORT_FILE, ReconnectPolicy, resolve_port};
pub use device::{JoystickState, MemoryJoystick, VirtualJoystick, reset, reset_all};
pub use error::{BridgeError, Result, error_codes};
pub use input::InputVectorPair;
pub use output::OutputVector;
pub use team::Team;
