//! Relay connection configuration and credentials.

use std::time::Duration;

use secrecy::SecretString;

/// Configuration for one terminal-server relay connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Terminal-server host (hostname or IP address).
    pub host: String,

    /// Terminal-server TCP port. Kept as text: inventory data carries the
    /// port the way the relay labels it.
    pub port: String,

    /// Timeout applied to connect and to every pattern wait.
    pub timeout: Duration,

    /// How many trailing bytes of the output buffer are searched for
    /// prompt patterns.
    pub search_depth: usize,
}

impl TransportConfig {
    /// Create a config for the given relay endpoint with default tuning.
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            timeout: Duration::from_secs(30),
            search_depth: 1000,
        }
    }

    /// Set the connect/expect timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// In-band login credentials for a device session.
///
/// The password is exchanged in plaintext on the wire (the relay protocol
/// offers nothing better) but is kept wrapped in memory and never logged.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username sent at the relay's login prompt.
    pub username: String,

    /// Password sent at the relay's password prompt.
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from a plaintext pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}
