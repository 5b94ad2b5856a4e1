//! Interactive console channel: send/expect over the relay transport.
//!
//! `expect` is the single blocking primitive of the whole session state
//! machine: wait until one of an ordered list of recognizers matches the
//! unconsumed output, or until a deadline passes. Timing out is a value,
//! not an error - most dialog loops dispatch on it.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use crate::error::TransportError;
use crate::logging::SharedTranscript;
use crate::transport::{TelnetTransport, TransportConfig};

/// Result of a single `expect` call.
#[derive(Debug)]
pub enum ExpectOutcome {
    /// One of the supplied patterns matched.
    Matched {
        /// Index of the first pattern in the supplied list that matched.
        index: usize,
        /// Text consumed before the match.
        before: String,
        /// The matched text itself.
        matched: String,
    },

    /// No pattern matched before the deadline. Everything buffered up to
    /// that point is consumed into `before`.
    TimedOut {
        /// Text consumed while waiting.
        before: String,
    },
}

impl ExpectOutcome {
    /// Check whether this outcome is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExpectOutcome::TimedOut { .. })
    }
}

/// Channel pairing one relay connection with pattern-driven reads.
///
/// Every byte consumed while waiting is mirrored to the transcript sink
/// regardless of match outcome, so failed sessions can be audited from
/// their `.stdout` file.
pub struct ConsoleChannel {
    transport: TelnetTransport,
    buffer: PatternBuffer,
    transcript: SharedTranscript,
}

impl ConsoleChannel {
    /// Connect to the relay and wrap the connection in a channel.
    pub async fn open(
        config: TransportConfig,
        transcript: SharedTranscript,
    ) -> Result<Self, TransportError> {
        let buffer = PatternBuffer::new(config.search_depth);
        let transport = TelnetTransport::connect(config).await?;
        Ok(Self {
            transport,
            buffer,
            transcript,
        })
    }

    /// The timeout applied to pattern waits unless overridden.
    pub fn default_timeout(&self) -> Duration {
        self.transport.config().timeout
    }

    /// Send a line, terminated with a carriage return.
    pub async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\r');
        self.transport.send(&bytes).await
    }

    /// Send a bare carriage return.
    pub async fn send_return(&mut self) -> Result<(), TransportError> {
        self.transport.send(b"\r").await
    }

    /// Wait until one of `patterns` matches the unconsumed output, or the
    /// timeout elapses.
    ///
    /// Patterns are tried in list order on every new chunk; the first one
    /// that matches wins, and its index in `patterns` is returned. Text
    /// before the match is consumed into the outcome, the matched text is
    /// consumed as well, and anything after it stays buffered for the
    /// next call.
    pub async fn expect(
        &mut self,
        patterns: &[&Regex],
        timeout: Duration,
    ) -> Result<ExpectOutcome, TransportError> {
        let deadline = Instant::now() + timeout;

        loop {
            // Buffered data from a previous call may already hold a match.
            for (index, pattern) in patterns.iter().enumerate() {
                if let Some((start, end)) = self.buffer.find(pattern) {
                    let before = lossy(self.buffer.take_until(start));
                    let matched = lossy(self.buffer.take_until(end - start));
                    trace!("expect matched pattern {} ({:?})", index, matched);
                    return Ok(ExpectOutcome::Matched {
                        index,
                        before,
                        matched,
                    });
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                trace!("expect timed out after {:?}", timeout);
                return Ok(ExpectOutcome::TimedOut {
                    before: lossy(self.buffer.take_all()),
                });
            }

            match tokio::time::timeout(remaining, self.transport.read_chunk()).await {
                Err(_) => {
                    trace!("expect timed out after {:?}", timeout);
                    return Ok(ExpectOutcome::TimedOut {
                        before: lossy(self.buffer.take_all()),
                    });
                }
                Ok(Ok(chunk)) => {
                    if !chunk.is_empty() {
                        self.transcript.lock().unwrap().write_bytes(&chunk);
                        self.buffer.extend(&chunk);
                    }
                }
                Ok(Err(e)) => return Err(e),
            }
        }
    }

    /// Wait for a single pattern. `Ok(Some(before))` on a match,
    /// `Ok(None)` on timeout.
    pub async fn expect_single(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> Result<Option<String>, TransportError> {
        match self.expect(&[pattern], timeout).await? {
            ExpectOutcome::Matched { before, .. } => Ok(Some(before)),
            ExpectOutcome::TimedOut { .. } => Ok(None),
        }
    }

    /// Close the underlying connection.
    pub async fn close(self, force: bool) -> bool {
        self.transport.close(force).await
    }
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}
