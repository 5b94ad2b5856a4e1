//! Per-device execution context.
//!
//! A context wires one [`DeviceDescriptor`] to its per-run log and
//! transcript sinks before any session operation runs, and guarantees
//! their release afterward - whatever the exit path. The session itself
//! is created lazily on [`login`](ExecutionContext::login).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use secrecy::SecretString;

use crate::banner;
use crate::error::{Error, Result, SessionError};
use crate::inventory::DeviceDescriptor;
use crate::logging::{DeviceLog, SharedTranscript, TranscriptSink};
use crate::session::{
    CaptureMode, EnableOptions, LoginOptions, Session, SessionConfig,
};
use crate::transport::Credentials;

/// Default run identifier: the current hour, so repeated invocations in
/// the same hour share one log directory.
pub fn default_execution_name() -> String {
    Local::now().format("%Y-%m-%d-%H").to_string()
}

/// Everything one device needs for one run: identity, sinks, and the
/// session once login has opened it.
pub struct ExecutionContext {
    descriptor: DeviceDescriptor,
    execution_name: String,
    base_dir: PathBuf,
    timeout: Duration,
    verbose: bool,
    log: Option<Arc<DeviceLog>>,
    transcript: Option<SharedTranscript>,
    session: Option<Session>,
}

impl ExecutionContext {
    /// Create a context for one device under the given run identifier.
    pub fn new(descriptor: DeviceDescriptor, execution_name: impl Into<String>) -> Self {
        Self {
            descriptor,
            execution_name: execution_name.into(),
            base_dir: PathBuf::from("."),
            timeout: Duration::from_secs(30),
            verbose: false,
            log: None,
            transcript: None,
            session: None,
        }
    }

    /// Create a context under the default (timestamp) run identifier.
    pub fn with_default_run(descriptor: DeviceDescriptor) -> Self {
        Self::new(descriptor, default_execution_name())
    }

    /// Anchor the `logs/`, `config/` and `config_archive/` layout
    /// somewhere other than the working directory.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Set the connect/expect timeout for the session.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Duplicate the session transcript to stdout as well as its file.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The device name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The run identifier shared by every device in this invocation.
    pub fn execution_name(&self) -> &str {
        &self.execution_name
    }

    /// Where this device's raw transcript is written.
    pub fn transcript_path(&self) -> PathBuf {
        self.log_dir().join(format!("{}.stdout", self.descriptor.name))
    }

    fn log_dir(&self) -> PathBuf {
        self.base_dir.join("logs").join(&self.execution_name)
    }

    /// Open the run's log directory and this device's sinks, and print
    /// the start banner.
    pub fn pre_process(&mut self) -> Result<()> {
        banner::start(&format!(
            "STARTING EXECUTION SEQUENCE FOR {}",
            self.descriptor.name
        ));

        let log_dir = self.log_dir();
        std::fs::create_dir_all(&log_dir)?;

        let log = DeviceLog::open(&log_dir, &self.descriptor.name)?;
        let transcript = TranscriptSink::open(&self.transcript_path(), self.verbose)?;

        self.log = Some(Arc::new(log));
        self.transcript = Some(transcript.shared());
        Ok(())
    }

    /// Open the relay session (lazily, on first call) and run the login
    /// dialog.
    pub async fn login(&mut self, credentials: &Credentials, options: &LoginOptions) -> Result<()> {
        if self.transcript.is_none() {
            self.pre_process()?;
        }

        if self.session.is_none() {
            let config = SessionConfig {
                timeout: self.timeout,
                config_dir: self.base_dir.join("config"),
                archive_dir: self
                    .base_dir
                    .join("config_archive")
                    .join(&self.execution_name),
                ..SessionConfig::default()
            };
            let transcript = self.transcript.as_ref().cloned().expect("sinks just opened");
            let log = self.log.as_ref().cloned().expect("sinks just opened");
            let session = Session::open(&self.descriptor, config, transcript, log).await?;
            self.session = Some(session);
        }

        self.session
            .as_mut()
            .expect("session just opened")
            .login(credentials, options)
            .await
    }

    /// Escalate the active session to privileged mode.
    pub async fn enable(
        &mut self,
        passwords: &[SecretString],
        options: &EnableOptions,
    ) -> Result<()> {
        self.active_session(|device| SessionError::EnableFailed {
            device,
            reason: "no active session".into(),
        })?
        .enable(passwords, options)
        .await
    }

    /// Factory-reset the device over the active session.
    pub async fn factory_reset(&mut self, erase_vlan: bool) -> Result<()> {
        self.active_session(|device| SessionError::ResetFailed {
            device,
            reason: "no active session".into(),
        })?
        .factory_reset(erase_vlan)
        .await
    }

    /// Execute a command over the active session.
    pub async fn send_command(&mut self, command: &str, mode: CaptureMode) -> Result<String> {
        let cmd = command.to_string();
        self.active_session(move |device| SessionError::CommandFailed {
            device,
            command: cmd,
            reason: "no active session".into(),
        })?
        .send_command(command, mode)
        .await
    }

    /// Push the device's configuration file over the active session.
    pub async fn push_config(&mut self, path: Option<&Path>) -> Result<()> {
        self.active_session(|device| SessionError::ConfigPushFailed {
            device,
            reason: "no active session".into(),
        })?
        .push_config(path)
        .await
    }

    /// Archive the device's running configuration over the active session.
    pub async fn save_config(&mut self) -> Result<PathBuf> {
        self.active_session(|device| SessionError::SaveConfigFailed {
            device,
            reason: "no active session".into(),
        })?
        .save_config()
        .await
    }

    /// Tear down the session, if one is open. Returns whether a clean
    /// close happened.
    pub async fn disconnect(&mut self, force: bool) -> bool {
        match self.session.take() {
            Some(session) => session.disconnect(force).await,
            None => false,
        }
    }

    /// Flush and release the sinks and print the end banner. Safe to call
    /// on any exit path, including after a failed stage.
    pub fn post_process(&mut self) {
        if let Some(transcript) = &self.transcript {
            if let Ok(mut sink) = transcript.lock() {
                sink.flush();
            }
        }
        if let Some(log) = &self.log {
            log.flush();
        }
        banner::end(&format!(
            "ENDING EXECUTION SEQUENCE FOR {}",
            self.descriptor.name
        ));
    }

    fn active_session(
        &mut self,
        missing: impl FnOnce(String) -> SessionError,
    ) -> Result<&mut Session> {
        let device = self.descriptor.name.clone();
        self.session
            .as_mut()
            .ok_or_else(|| Error::Session(missing(device)))
    }
}
