//! Relay transport over a plain TCP stream.
//!
//! Terminal servers expose each console line as a telnet endpoint. The
//! device dialog only needs the raw byte stream, but the relay may still
//! open with telnet option negotiation, so inbound data passes through a
//! small stateful filter that strips protocol bytes and refuses every
//! negotiated option (`DO x` -> `WONT x`, `WILL x` -> `DONT x`).

use log::{debug, trace};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::config::TransportConfig;
use crate::error::TransportError;

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

/// Telnet negotiation parser state. A command may be split across reads,
/// so the state persists between chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NegotiationState {
    Data,
    Command,
    Option(u8),
    Subnegotiation,
    SubnegotiationCommand,
}

/// Stateful filter separating application data from telnet protocol bytes.
#[derive(Debug)]
struct NegotiationFilter {
    state: NegotiationState,
}

impl NegotiationFilter {
    fn new() -> Self {
        Self {
            state: NegotiationState::Data,
        }
    }

    /// Strip telnet commands from `raw`, producing the application data
    /// and the negotiation replies to send back.
    fn filter(&mut self, raw: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut data = Vec::with_capacity(raw.len());
        let mut replies = Vec::new();

        for &byte in raw {
            self.state = match self.state {
                NegotiationState::Data => {
                    if byte == IAC {
                        NegotiationState::Command
                    } else {
                        data.push(byte);
                        NegotiationState::Data
                    }
                }
                NegotiationState::Command => match byte {
                    // Escaped 0xFF data byte.
                    IAC => {
                        data.push(IAC);
                        NegotiationState::Data
                    }
                    DO | DONT | WILL | WONT => NegotiationState::Option(byte),
                    SB => NegotiationState::Subnegotiation,
                    // NOP, GA, and friends carry no option byte.
                    _ => NegotiationState::Data,
                },
                NegotiationState::Option(verb) => {
                    match verb {
                        DO => replies.extend_from_slice(&[IAC, WONT, byte]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, byte]),
                        // DONT/WONT acknowledge our refusals; no reply.
                        _ => {}
                    }
                    NegotiationState::Data
                }
                NegotiationState::Subnegotiation => {
                    if byte == IAC {
                        NegotiationState::SubnegotiationCommand
                    } else {
                        NegotiationState::Subnegotiation
                    }
                }
                NegotiationState::SubnegotiationCommand => {
                    if byte == SE {
                        NegotiationState::Data
                    } else {
                        NegotiationState::Subnegotiation
                    }
                }
            };
        }

        (data, replies)
    }
}

/// Connection to one device's console line via its terminal-server relay.
#[derive(Debug)]
pub struct TelnetTransport {
    stream: TcpStream,
    config: TransportConfig,
    negotiation: NegotiationFilter,

    /// Negotiation replies not yet written. Kept out of `read_chunk`'s
    /// hot path so a timed-out read future never drops a chunk that was
    /// already consumed from the socket.
    pending_replies: Vec<u8>,
}

impl TelnetTransport {
    /// Connect to the relay endpoint, bounded by the configured timeout.
    pub async fn connect(config: TransportConfig) -> Result<Self, TransportError> {
        let addr = config.socket_addr();
        debug!("connecting to relay {}", addr);

        let stream = tokio::time::timeout(config.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| TransportError::Timeout(config.timeout))?
            .map_err(|e| TransportError::ConnectionFailed {
                host: config.host.clone(),
                port: config.port.clone(),
                source: e,
            })?;

        // Interactive dialog: latency matters more than throughput.
        let _ = stream.set_nodelay(true);

        Ok(Self {
            stream,
            config,
            negotiation: NegotiationFilter::new(),
            pending_replies: Vec::new(),
        })
    }

    /// Get the configuration used for this connection.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Write bytes to the relay. Fire-and-forget from the dialog's point
    /// of view; the kernel may buffer.
    pub async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.flush_replies().await?;
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read one chunk from the relay with telnet protocol bytes removed.
    ///
    /// The returned chunk may be empty when a read contained only
    /// negotiation traffic; that is not end-of-stream. A zero-byte read
    /// from the socket is, and maps to [`TransportError::Disconnected`].
    pub async fn read_chunk(&mut self) -> Result<Vec<u8>, TransportError> {
        self.flush_replies().await?;

        let mut raw = [0u8; 4096];
        let n = self.stream.read(&mut raw).await?;
        if n == 0 {
            return Err(TransportError::Disconnected);
        }

        let (data, replies) = self.negotiation.filter(&raw[..n]);
        self.pending_replies.extend_from_slice(&replies);
        Ok(data)
    }

    /// Send any queued negotiation refusals.
    async fn flush_replies(&mut self) -> Result<(), TransportError> {
        if self.pending_replies.is_empty() {
            return Ok(());
        }
        let replies = std::mem::take(&mut self.pending_replies);
        trace!("refusing {} bytes of telnet negotiation", replies.len());
        self.stream.write_all(&replies).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Terminate the connection.
    ///
    /// A graceful close shuts the socket down and reports whether that
    /// succeeded; a forced close just drops it.
    pub async fn close(mut self, force: bool) -> bool {
        if force {
            debug!(
                "force-closing relay connection to {}",
                self.config.socket_addr()
            );
            return true;
        }
        self.stream.shutdown().await.is_ok()
    }
}
