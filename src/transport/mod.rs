//! Relay transport layer.
//!
//! This module provides the low-level connection to a device's console
//! line through its terminal-server relay: connection setup, raw stream
//! I/O, and telnet protocol filtering.

pub mod config;
mod telnet;

pub use config::{Credentials, TransportConfig};
pub use telnet::TelnetTransport;
