//! Per-device log and transcript sinks.
//!
//! Each device in a run gets two files under `logs/<run>/`:
//!
//! - `<name>.log` - structured, timestamped dialog log
//! - `<name>.stdout` - the raw session transcript
//!
//! The execution context owns which sinks receive transcript bytes; in
//! verbose mode the transcript is duplicated to stdout as well.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Local;
use log::Level;

/// Shared handle to a transcript sink. The console channel writes through
/// it on every read; the execution context flushes it at teardown.
pub type SharedTranscript = Arc<Mutex<TranscriptSink>>;

/// Sink for the raw byte transcript of one session.
pub struct TranscriptSink {
    file: BufWriter<File>,
    echo: bool,
}

impl TranscriptSink {
    /// Open a transcript file. With `echo`, bytes are duplicated to
    /// stdout as they arrive.
    pub fn open(path: &Path, echo: bool) -> io::Result<Self> {
        Ok(Self {
            file: BufWriter::new(File::create(path)?),
            echo,
        })
    }

    /// Turn this sink into a shareable handle.
    pub fn shared(self) -> SharedTranscript {
        Arc::new(Mutex::new(self))
    }

    /// Append bytes to the transcript. Write errors are swallowed: a
    /// full disk must not abort a device dialog mid-operation.
    pub fn write_bytes(&mut self, data: &[u8]) {
        let _ = self.file.write_all(data);
        if self.echo {
            let mut out = io::stdout().lock();
            let _ = out.write_all(data);
            let _ = out.flush();
        }
    }

    /// Flush buffered transcript bytes to the file.
    pub fn flush(&mut self) {
        let _ = self.file.flush();
    }
}

/// Structured log scoped to one device, mirrored to the `log` facade.
pub struct DeviceLog {
    name: String,
    file: Mutex<BufWriter<File>>,
}

impl DeviceLog {
    /// Open `<dir>/<name>.log` for appending within this run.
    pub fn open(dir: &Path, name: &str) -> io::Result<Self> {
        let file = File::create(dir.join(format!("{name}.log")))?;
        Ok(Self {
            name: name.to_string(),
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    /// The device this log is scoped to.
    pub fn device(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        self.write(Level::Debug, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.write(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.write(Level::Warn, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.write(Level::Error, msg.as_ref());
    }

    fn write(&self, level: Level, msg: &str) {
        let stamp = Local::now().format("%m/%d/%Y %I:%M:%S %p");
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{stamp} - {} - {level:<6} - {msg}", self.name);
        }
        log::log!(target: self.name.as_str(), level, "{msg}");
    }

    /// Flush buffered log lines to the file.
    pub fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_log_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let log = DeviceLog::open(dir.path(), "pod1-r1").unwrap();
        log.info("logged in");
        log.flush();

        let text = std::fs::read_to_string(dir.path().join("pod1-r1.log")).unwrap();
        assert!(text.contains(" - pod1-r1 - INFO   - logged in"));
    }

    #[test]
    fn test_transcript_sink_writes_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod1-r1.stdout");
        let mut sink = TranscriptSink::open(&path, false).unwrap();
        sink.write_bytes(b"router> enable\r\n");
        sink.flush();

        assert_eq!(std::fs::read(&path).unwrap(), b"router> enable\r\n");
    }
}
