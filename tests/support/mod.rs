//! Scripted fake console device for integration tests.
//!
//! A `ScriptedDevice` binds a loopback listener and plays a fixed script
//! against the first connection: wait for expected input, send canned
//! output, pause. Everything received is recorded so tests can assert on
//! the exact byte sequence a session sent.

// Each integration test binary compiles this module separately and uses
// a different subset of it.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use termfleet::logging::{DeviceLog, SharedTranscript, TranscriptSink};
use termfleet::{DeviceDescriptor, Session, SessionConfig};

/// One step of a device script.
pub enum Step {
    /// Read until this text has arrived (after any previously expected
    /// text).
    Expect(&'static str),
    /// Write this text to the session.
    Send(&'static str),
    /// Wait before the next step.
    Pause(Duration),
}

pub struct ScriptedDevice {
    pub addr: SocketAddr,
    handle: JoinHandle<String>,
}

impl ScriptedDevice {
    /// Bind a loopback listener and serve `steps` to the first connection.
    pub async fn spawn(steps: Vec<Step>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            let mut cursor = 0usize;

            for step in steps {
                match step {
                    Step::Send(text) => {
                        stream.write_all(text.as_bytes()).await.unwrap();
                        stream.flush().await.unwrap();
                    }
                    Step::Pause(duration) => tokio::time::sleep(duration).await,
                    Step::Expect(text) => loop {
                        if let Some(pos) = received[cursor..].find(text) {
                            cursor += pos + text.len();
                            break;
                        }
                        let mut buf = [0u8; 1024];
                        let n = tokio::time::timeout(
                            Duration::from_secs(10),
                            stream.read(&mut buf),
                        )
                        .await
                        .unwrap_or_else(|_| {
                            panic!("device timed out waiting for {text:?}; got {received:?}")
                        })
                        .unwrap();
                        if n == 0 {
                            panic!("peer closed while device waited for {text:?}; got {received:?}");
                        }
                        received.push_str(&String::from_utf8_lossy(&buf[..n]));
                    },
                }
            }

            // Script done; keep recording until the session hangs up.
            loop {
                let mut buf = [0u8; 1024];
                match tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf)).await {
                    Ok(Ok(0)) | Err(_) => break,
                    Ok(Ok(n)) => received.push_str(&String::from_utf8_lossy(&buf[..n])),
                    Ok(Err(_)) => break,
                }
            }

            received
        });

        Self { addr, handle }
    }

    /// Descriptor pointing a session at this fake device.
    pub fn descriptor(&self, name: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(name, self.addr.ip().to_string(), self.addr.port().to_string())
    }

    /// Wait for the script to finish and return everything received.
    pub async fn finish(self) -> String {
        self.handle.await.unwrap()
    }
}

/// Open a `Session` against a scripted device, with sinks under `dir`.
pub async fn open_session(
    device: &ScriptedDevice,
    name: &str,
    dir: &Path,
    timeout: Duration,
) -> Session {
    let config = SessionConfig {
        timeout,
        config_dir: dir.join("config"),
        archive_dir: dir.join("config_archive").join("test-run"),
        ..SessionConfig::default()
    };
    let (transcript, log) = sinks(dir, name);
    Session::open(&device.descriptor(name), config, transcript, log)
        .await
        .unwrap()
}

/// Transcript and log sinks rooted at `dir`.
pub fn sinks(dir: &Path, name: &str) -> (SharedTranscript, Arc<DeviceLog>) {
    let transcript = TranscriptSink::open(&dir.join(format!("{name}.stdout")), false)
        .unwrap()
        .shared();
    let log = Arc::new(DeviceLog::open(dir, name).unwrap());
    (transcript, log)
}

/// The standard relay login exchange ending at a privileged prompt.
/// Session sends exactly `op\r` + `pw\r` + `\r`.
pub fn login_privileged() -> Vec<Step> {
    vec![
        Step::Send("\r\nUsername: "),
        Step::Expect("op\r"),
        Step::Send("Password: "),
        Step::Expect("pw\r"),
        Step::Expect("\r"),
        Step::Send("\r\nrouter#"),
    ]
}
