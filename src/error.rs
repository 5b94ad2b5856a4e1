//! Error types for termfleet.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for termfleet operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Relay transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Session state-machine errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Inventory lookup errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// I/O error outside any session stage (log/archive directory setup)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Transport layer errors (relay connection, stream I/O).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to the terminal-server relay
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: String,
        #[source]
        source: io::Error,
    },

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection was closed by the relay or the device
    #[error("Connection disconnected")]
    Disconnected,

    /// I/O error on the stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Session layer errors. Each variant maps to one stage of the device
/// dialog; lower-level stream errors are normalized into the stage's
/// `reason` before they reach a caller.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Login dialog did not reach a usable prompt
    #[error("login failed on {device}: {reason}")]
    LoginFailed { device: String, reason: String },

    /// Privilege escalation failed
    #[error("enable failed on {device}: {reason}")]
    EnableFailed { device: String, reason: String },

    /// Factory reset sequence failed
    #[error("factory reset failed on {device}: {reason}")]
    ResetFailed { device: String, reason: String },

    /// Command execution failed
    #[error("command {command:?} failed on {device}: {reason}")]
    CommandFailed {
        device: String,
        command: String,
        reason: String,
    },

    /// Configuration push failed
    #[error("configuration push failed on {device}: {reason}")]
    ConfigPushFailed { device: String, reason: String },

    /// Configuration push source file does not exist
    #[error("configuration file not found: {path}")]
    MissingConfigFile { path: PathBuf },

    /// Running-configuration archival failed
    #[error("configuration save failed on {device}: {reason}")]
    SaveConfigFailed { device: String, reason: String },

    /// The stream presented a state no transition covers. Never expected;
    /// signals a bug or a badly misbehaving device.
    #[error("unexpected stream state: {context}")]
    UnexpectedStream { context: String },
}

/// Inventory layer errors (pod/router/switch lookup, data file loading).
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Pod number outside the provisioned range
    #[error("pod number {0} is out of range")]
    PodOutOfRange(u32),

    /// Pod number refers to a reserved/unavailable slot
    #[error("pod number {0} is reserved")]
    PodReserved(u32),

    /// Router instance number outside the pod's range
    #[error("router number {0} is out of range")]
    RouterOutOfRange(u32),

    /// Switch instance number outside the pod's range
    #[error("switch number {0} is out of range")]
    SwitchOutOfRange(u32),

    /// Inventory data file could not be read
    #[error("failed to read inventory data {path}: {source}")]
    DataFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Inventory data file could not be parsed
    #[error("invalid inventory data: {0}")]
    DataFormat(#[from] serde_json::Error),
}

/// Result type alias using termfleet's Error.
pub type Result<T> = std::result::Result<T, Error>;
