//! The interactive session state machine.
//!
//! A [`Session`] owns exactly one relay connection for the lifetime of one
//! execution attempt against one device, and drives the device through its
//! command-line dialog: login, privilege escalation, factory reset,
//! command execution with output capture, configuration push, and
//! configuration archival.
//!
//! Every operation is a deterministic sequence of send/expect steps. Any
//! failure - stream error, timeout, exhausted retries - is normalized into
//! the stage's typed [`SessionError`] before it reaches a caller; raw
//! transport errors never escape.

pub mod dialog;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::time::sleep;

use crate::channel::{ConsoleChannel, ExpectOutcome, PromptSet};
use crate::error::{Error, Result, SessionError};
use crate::inventory::DeviceDescriptor;
use crate::logging::{DeviceLog, SharedTranscript};
use crate::transport::{Credentials, TransportConfig};
use dialog::{
    EnableAction, EnableMachine, EnableOutcome, LoginAction, LoginMachine, LoginOutcome,
    PushOutcome, WizardAction, WizardOutcome,
};

/// Tuning and filesystem layout for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Timeout applied to connect and to every pattern wait.
    pub timeout: Duration,

    /// Tail-window size for prompt searches.
    pub search_depth: usize,

    /// Directory holding per-device configuration push sources
    /// (`<name>.cfg`).
    pub config_dir: PathBuf,

    /// Directory receiving archived running configurations for this run.
    pub archive_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search_depth: 1000,
            config_dir: PathBuf::from("config"),
            archive_dir: PathBuf::from("config_archive"),
        }
    }
}

/// Options for the login dialog.
#[derive(Debug, Clone)]
pub struct LoginOptions {
    /// Prompt-classification attempts before giving up.
    pub attempts: u32,

    /// Pause applied in the slow spots of the dialog (wizard decline,
    /// retry nudges).
    pub retry_interval: Duration,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            attempts: 2,
            retry_interval: Duration::from_millis(500),
        }
    }
}

/// Options for the enable dialog.
#[derive(Debug, Clone)]
pub struct EnableOptions {
    /// Prompt-classification attempts before giving up.
    pub attempts: u32,

    /// Send `terminal length 0` once privileged.
    pub disable_paging: bool,
}

impl Default for EnableOptions {
    fn default() -> Self {
        Self {
            attempts: 2,
            disable_paging: true,
        }
    }
}

/// Output capture policy for [`Session::send_command`].
#[derive(Debug, Clone)]
pub enum CaptureMode {
    /// Stop at the first reappearance of the privileged prompt. Fast, but
    /// may truncate multi-page or delayed output.
    Fast,

    /// Keep accumulating output across bounded waits of `interval` until
    /// the privileged prompt reappears. Intermediate timeouts that made
    /// progress are iteration boundaries, not errors.
    Accurate { interval: Duration },
}

impl Default for CaptureMode {
    fn default() -> Self {
        CaptureMode::Accurate {
            interval: Duration::from_secs(5),
        }
    }
}

/// Which operation a failure belongs to; maps to the typed error.
enum Stage {
    Login,
    Enable,
    Reset,
    Command(String),
    Push,
    Save,
}

impl Stage {
    fn describe(&self) -> &'static str {
        match self {
            Stage::Login => "login",
            Stage::Enable => "enable",
            Stage::Reset => "factory reset",
            Stage::Command(_) => "command execution",
            Stage::Push => "configuration push",
            Stage::Save => "configuration save",
        }
    }
}

/// Why an operation's dialog stopped early. Converted into the stage's
/// typed error at the operation boundary.
#[derive(Debug)]
enum Abort {
    /// Stream error, timeout, or exhausted retries.
    Stream(String),

    /// The expect result carried an index no transition covers.
    Protocol(String),
}

impl From<crate::error::TransportError> for Abort {
    fn from(e: crate::error::TransportError) -> Self {
        Abort::Stream(e.to_string())
    }
}

/// Decode an expect result into an operation outcome, treating a timeout
/// as the operation's timeout value and an unmapped index as a protocol
/// violation.
fn decode<T>(
    outcome: ExpectOutcome,
    from_index: fn(usize) -> Option<T>,
    timed_out: T,
    what: &str,
) -> std::result::Result<T, Abort> {
    match outcome {
        ExpectOutcome::TimedOut { .. } => Ok(timed_out),
        ExpectOutcome::Matched { index, .. } => from_index(index)
            .ok_or_else(|| Abort::Protocol(format!("unmapped pattern index {index} during {what}"))),
    }
}

/// Filter a configuration file down to the lines worth sending: blank
/// lines and `!` comment lines are dropped, trailing whitespace trimmed.
fn config_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| {
            let stripped = line.trim_start();
            !stripped.is_empty() && !stripped.starts_with('!')
        })
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// One interactive session against one device.
pub struct Session {
    device: String,
    channel: ConsoleChannel,
    prompts: &'static PromptSet,
    log: Arc<DeviceLog>,
    privileged: bool,
    config_dir: PathBuf,
    archive_dir: PathBuf,
}

impl Session {
    /// Open the relay connection for `descriptor`.
    ///
    /// The session starts unprivileged and disconnected from any device
    /// state; call [`login`](Self::login) next.
    pub async fn open(
        descriptor: &DeviceDescriptor,
        config: SessionConfig,
        transcript: SharedTranscript,
        log: Arc<DeviceLog>,
    ) -> Result<Self> {
        log.info(format!(
            "opening relay session to {} via {}:{}",
            descriptor.name, descriptor.host, descriptor.port
        ));

        let transport = TransportConfig {
            host: descriptor.host.clone(),
            port: descriptor.port.clone(),
            timeout: config.timeout,
            search_depth: config.search_depth,
        };
        let channel = ConsoleChannel::open(transport, transcript).await?;

        Ok(Self {
            device: descriptor.name.clone(),
            channel,
            prompts: PromptSet::shared(),
            log,
            privileged: false,
            config_dir: config.config_dir,
            archive_dir: config.archive_dir,
        })
    }

    /// The device this session is bound to.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Whether the session has reached the elevated command mode.
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Log in through the relay and classify the resulting prompt.
    ///
    /// Leaves the session at whichever mode the device lands in:
    /// `privileged` is set accordingly, and a device found sitting in
    /// configuration mode is backed out to the privileged prompt first.
    pub async fn login(&mut self, credentials: &Credentials, options: &LoginOptions) -> Result<()> {
        match self.login_dialog(credentials, options).await {
            Ok(()) => Ok(()),
            Err(abort) => Err(self.fail(Stage::Login, abort)),
        }
    }

    /// Escalate to privileged mode, optionally disabling terminal paging.
    ///
    /// Idempotent when the session is already privileged: the prompt
    /// classifies as privileged immediately and no password is consumed.
    pub async fn enable(
        &mut self,
        passwords: &[SecretString],
        options: &EnableOptions,
    ) -> Result<()> {
        match self.enable_dialog(passwords, options).await {
            Ok(()) => Ok(()),
            Err(abort) => Err(self.fail(Stage::Enable, abort)),
        }
    }

    /// Reset the device to factory defaults: optionally delete the VLAN
    /// database, erase the startup configuration, and reload.
    ///
    /// Success is the device acknowledging the reload request; the
    /// connection usually drops shortly after.
    pub async fn factory_reset(&mut self, erase_vlan: bool) -> Result<()> {
        if !self.privileged {
            return Err(self.fail(Stage::Reset, Abort::Stream("session is not privileged".into())));
        }
        match self.reset_dialog(erase_vlan).await {
            Ok(()) => Ok(()),
            Err(abort) => Err(self.fail(Stage::Reset, abort)),
        }
    }

    /// Execute a command and capture its output.
    ///
    /// The returned text is everything the device wrote before the final
    /// privileged prompt, command echo included.
    pub async fn send_command(&mut self, command: &str, mode: CaptureMode) -> Result<String> {
        if !self.privileged {
            return Err(self.fail(
                Stage::Command(command.to_string()),
                Abort::Stream("session is not privileged".into()),
            ));
        }
        match self.capture_dialog(command, &mode).await {
            Ok(output) => Ok(output),
            Err(abort) => Err(self.fail(Stage::Command(command.to_string()), abort)),
        }
    }

    /// Push a prepared configuration file to the device, line by line.
    ///
    /// With no explicit path the per-device default
    /// `<config_dir>/<name>.cfg` is used; a missing file is a
    /// [`SessionError::MissingConfigFile`] and nothing is sent. Blank and
    /// `!` comment lines are dropped. If the device falls back to the
    /// privileged prompt before all lines are sent, the push ends there -
    /// some lines legitimately exit configuration mode.
    pub async fn push_config(&mut self, path: Option<&Path>) -> Result<()> {
        if !self.privileged {
            return Err(self.fail(Stage::Push, Abort::Stream("session is not privileged".into())));
        }

        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config_dir.join(format!("{}.cfg", self.device)));
        if !path.is_file() {
            self.log
                .error(format!("configuration file {} does not exist", path.display()));
            return Err(SessionError::MissingConfigFile { path }.into());
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| self.fail(Stage::Push, Abort::Stream(e.to_string())))?;
        let lines = config_lines(&text);
        self.log.info(format!(
            "pushing {} configuration lines from {}",
            lines.len(),
            path.display()
        ));

        match self.push_dialog(&lines).await {
            Ok(()) => Ok(()),
            Err(abort) => Err(self.fail(Stage::Push, abort)),
        }
    }

    /// Capture the running configuration and archive it under
    /// `<archive_dir>/<name>.cfg`, creating the directory on demand.
    ///
    /// Returns the path written.
    pub async fn save_config(&mut self) -> Result<PathBuf> {
        if !self.privileged {
            return Err(self.fail(Stage::Save, Abort::Stream("session is not privileged".into())));
        }

        std::fs::create_dir_all(&self.archive_dir)
            .map_err(|e| self.fail(Stage::Save, Abort::Stream(e.to_string())))?;

        let output = match self
            .capture_dialog("show running-config", &CaptureMode::default())
            .await
        {
            Ok(output) => output,
            Err(abort) => return Err(self.fail(Stage::Save, abort)),
        };

        let path = self.archive_dir.join(format!("{}.cfg", self.device));
        std::fs::write(&path, &output)
            .map_err(|e| self.fail(Stage::Save, Abort::Stream(e.to_string())))?;

        self.log
            .info(format!("archived running configuration to {}", path.display()));
        Ok(path)
    }

    /// Terminate the session, closing the relay connection. Consumes the
    /// session: cleanup happens exactly once whatever the exit path.
    pub async fn disconnect(self, force: bool) -> bool {
        self.log.info(format!("disconnecting from {}", self.device));
        self.channel.close(force).await
    }

    // --- dialog bodies ---------------------------------------------------

    async fn login_dialog(
        &mut self,
        credentials: &Credentials,
        options: &LoginOptions,
    ) -> std::result::Result<(), Abort> {
        let p = self.prompts;

        self.log.info("waiting for the relay login prompt");
        self.await_pattern(&p.username, "the relay username prompt")
            .await?;
        self.log
            .debug(format!("got username prompt, sending username {}", credentials.username));
        self.channel.send_line(&credentials.username).await?;

        self.await_pattern(&p.password, "the relay password prompt")
            .await?;
        self.log.debug("got password prompt, sending password");
        self.channel
            .send_line(credentials.password.expose_secret())
            .await?;

        // A short pause and a bare return flush the banner text.
        sleep(Duration::from_millis(200)).await;
        self.channel.send_return().await?;

        let timeout = self.channel.default_timeout();
        let set = p.login_set();
        let mut machine = LoginMachine::new(options.attempts);

        loop {
            let outcome = decode(
                self.channel.expect(&set, timeout).await?,
                LoginOutcome::from_index,
                LoginOutcome::TimedOut,
                "login",
            )?;

            match machine.on_prompt(outcome) {
                LoginAction::Succeed { privileged } => {
                    self.privileged = privileged;
                    self.log.info(if privileged {
                        "now in privileged mode"
                    } else {
                        "now in unprivileged mode"
                    });
                    return Ok(());
                }
                LoginAction::ExitConfigMode => {
                    self.log
                        .debug("found configuration mode, sending end to back out");
                    self.exchange("end", &p.privileged, "the privileged prompt after end")
                        .await?;
                    self.privileged = true;
                    self.log.info("now in privileged mode");
                    return Ok(());
                }
                LoginAction::DeclineWizard => {
                    self.log
                        .info("declining the initial configuration dialog");
                    self.channel.send_line("no").await?;
                    sleep(options.retry_interval).await;

                    let wizard = decode(
                        self.channel.expect(&p.wizard_set(), timeout).await?,
                        WizardOutcome::from_index,
                        WizardOutcome::TimedOut,
                        "login wizard",
                    )?;
                    match machine.on_wizard(wizard) {
                        WizardAction::Accept => {
                            self.privileged = false;
                            self.log.info("now in unprivileged mode");
                            return Ok(());
                        }
                        WizardAction::ConfirmAutoinstall => {
                            self.log.info("confirming autoinstall termination");
                            self.channel.send_line("yes").await?;
                            sleep(options.retry_interval).await;
                        }
                        WizardAction::Nudge => {
                            self.log.warn(format!(
                                "login attempt failed, {} left",
                                machine.attempts_left()
                            ));
                            sleep(options.retry_interval).await;
                            self.channel.send_return().await?;
                        }
                        WizardAction::GiveUp => {
                            return Err(Abort::Stream("login attempts exhausted".into()));
                        }
                    }
                }
                LoginAction::ConfirmAutoinstall => {
                    self.log.info("confirming autoinstall termination");
                    self.channel.send_line("yes").await?;
                    sleep(options.retry_interval).await;
                }
                LoginAction::Nudge => {
                    self.log.warn(format!(
                        "login attempt failed, {} left",
                        machine.attempts_left()
                    ));
                    sleep(options.retry_interval).await;
                    self.channel.send_return().await?;
                }
                LoginAction::GiveUp => {
                    return Err(Abort::Stream("login attempts exhausted".into()));
                }
            }
        }
    }

    async fn enable_dialog(
        &mut self,
        passwords: &[SecretString],
        options: &EnableOptions,
    ) -> std::result::Result<(), Abort> {
        let p = self.prompts;

        self.log.debug("sending return to get a fresh prompt");
        self.channel.send_return().await?;

        let timeout = self.channel.default_timeout();
        let set = p.enable_set();
        let mut machine = EnableMachine::new(options.attempts);

        loop {
            let outcome = decode(
                self.channel.expect(&set, timeout).await?,
                EnableOutcome::from_index,
                EnableOutcome::TimedOut,
                "enable",
            )?;

            match machine.on_prompt(outcome) {
                EnableAction::SendEnable => {
                    self.log.debug("unprivileged prompt, sending enable");
                    self.channel.send_line("enable").await?;
                    sleep(Duration::from_millis(100)).await;
                }
                EnableAction::SendPassword { index, terminal } => {
                    let slot = index.min(passwords.len().saturating_sub(1));
                    let Some(password) = passwords.get(slot) else {
                        return Err(Abort::Stream(
                            "no enable password candidates supplied".into(),
                        ));
                    };
                    self.log
                        .debug(format!("password prompt, sending candidate {}", slot + 1));
                    self.channel.send_line(password.expose_secret()).await?;
                    if terminal {
                        return Err(Abort::Stream("enable password candidates exhausted".into()));
                    }
                }
                EnableAction::Succeed => {
                    self.privileged = true;
                    self.log.info("now in privileged mode");
                    if options.disable_paging {
                        self.log.debug("disabling terminal paging");
                        self.exchange(
                            "terminal length 0",
                            &p.privileged,
                            "the privileged prompt after disabling paging",
                        )
                        .await?;
                    }
                    return Ok(());
                }
                EnableAction::ExitConfigMode => {
                    self.log
                        .debug("found configuration mode, sending end to back out");
                    self.channel.send_line("end").await?;
                }
                EnableAction::Nudge => {
                    self.log.warn("enable attempt failed, retrying");
                    sleep(Duration::from_millis(200)).await;
                    self.channel.send_return().await?;
                }
                EnableAction::GiveUp => {
                    return Err(Abort::Stream("enable attempts exhausted".into()));
                }
            }
        }
    }

    async fn reset_dialog(&mut self, erase_vlan: bool) -> std::result::Result<(), Abort> {
        let p = self.prompts;
        let timeout = self.channel.default_timeout();

        if erase_vlan {
            self.log.info("deleting the vlan database file");
            self.exchange(
                "delete flash:vlan.dat",
                &p.vlan_file_check,
                "the vlan filename check",
            )
            .await?;
            self.log.debug("accepting the filename, sending return");
            self.channel.send_return().await?;
            self.await_pattern(&p.confirm, "the vlan delete confirmation")
                .await?;
            self.log.debug("confirming the delete, sending return");
            self.channel.send_return().await?;
            self.await_pattern(&p.privileged, "the privileged prompt after vlan delete")
                .await?;
            self.log.info("vlan database file deleted");
        }

        self.log.info("erasing the startup configuration");
        self.exchange("erase startup-config", &p.confirm, "the erase confirmation")
            .await?;
        self.log.debug("confirming the erase, sending return");
        self.channel.send_return().await?;
        self.await_pattern(&p.privileged, "the privileged prompt after erase")
            .await?;
        self.log.info("startup configuration erased");

        self.log.info("sending reload");
        self.channel.send_line("reload").await?;
        match self.channel.expect(&p.reload_set(), timeout).await? {
            ExpectOutcome::Matched { index: 0, .. } => {
                // Asked whether to save the modified config first.
                self.log
                    .debug("asked to save the configuration, answering no");
                self.exchange("no", &p.confirm, "the reload confirmation").await?;
                self.channel.send_return().await?;
            }
            ExpectOutcome::Matched { index: 1, .. } => {
                self.log.debug("confirming the reload, sending return");
                self.channel.send_return().await?;
            }
            ExpectOutcome::Matched { index, .. } => {
                return Err(Abort::Protocol(format!(
                    "unmapped pattern index {index} during reload"
                )));
            }
            ExpectOutcome::TimedOut { .. } => {
                return Err(Abort::Stream(
                    "timed out waiting for the reload confirmation".into(),
                ));
            }
        }

        self.await_pattern(&p.reload_ack, "the reload acknowledgement")
            .await?;
        self.log.info("reload request submitted");
        Ok(())
    }

    async fn capture_dialog(
        &mut self,
        command: &str,
        mode: &CaptureMode,
    ) -> std::result::Result<String, Abort> {
        let p = self.prompts;

        self.log.info(format!("sending command {command:?}"));
        self.channel.send_line(command).await?;

        match mode {
            CaptureMode::Fast => {
                self.log
                    .debug("fast capture, output may be truncated at the first prompt");
                self.await_pattern(&p.privileged, "the privileged prompt after the command")
                    .await
            }
            CaptureMode::Accurate { interval } => {
                let mut output = String::new();
                loop {
                    match self.channel.expect(&[&p.privileged], *interval).await? {
                        ExpectOutcome::Matched { before, .. } => {
                            output.push_str(&before);
                            self.log.debug("command finished, privileged prompt is back");
                            return Ok(output);
                        }
                        ExpectOutcome::TimedOut { before } => {
                            if before.is_empty() {
                                return Err(Abort::Stream(
                                    "device went idle without returning a prompt".into(),
                                ));
                            }
                            // Output still flowing; keep collecting.
                            output.push_str(&before);
                        }
                    }
                }
            }
        }
    }

    async fn push_dialog(&mut self, lines: &[String]) -> std::result::Result<(), Abort> {
        let p = self.prompts;
        let timeout = self.channel.default_timeout();
        let set = p.push_set();

        self.log.debug("entering global configuration mode");
        self.exchange(
            "configure terminal",
            &p.config_mode,
            "the configuration mode prompt",
        )
        .await?;

        for (sent, line) in lines.iter().enumerate() {
            self.channel.send_line(line).await?;
            let outcome = decode(
                self.channel.expect(&set, timeout).await?,
                PushOutcome::from_index,
                PushOutcome::TimedOut,
                "configuration push",
            )?;
            match outcome {
                PushOutcome::ConfigMode => {}
                PushOutcome::Privileged => {
                    // Some configuration lines exit config mode on their
                    // own; that ends the push, it does not fail it.
                    self.log.warn(format!(
                        "device left configuration mode after {} of {} lines",
                        sent + 1,
                        lines.len()
                    ));
                    return Ok(());
                }
                PushOutcome::TimedOut => {
                    return Err(Abort::Stream(format!(
                        "no prompt after configuration line {line:?}"
                    )));
                }
            }
        }

        self.log
            .debug("all configuration lines pushed, leaving configuration mode");
        self.exchange("end", &p.privileged, "the privileged prompt after end")
            .await?;
        Ok(())
    }

    // --- step helpers ----------------------------------------------------

    /// Wait for a single pattern; a timeout aborts with a description of
    /// what was being waited for.
    async fn await_pattern(
        &mut self,
        pattern: &regex::bytes::Regex,
        what: &str,
    ) -> std::result::Result<String, Abort> {
        let timeout = self.channel.default_timeout();
        match self.channel.expect_single(pattern, timeout).await? {
            Some(before) => Ok(before),
            None => Err(Abort::Stream(format!("timed out waiting for {what}"))),
        }
    }

    /// Send a line and wait for a single pattern.
    async fn exchange(
        &mut self,
        line: &str,
        pattern: &regex::bytes::Regex,
        what: &str,
    ) -> std::result::Result<String, Abort> {
        self.channel.send_line(line).await?;
        self.await_pattern(pattern, what).await
    }

    /// Normalize an abort into the stage's typed error and log where the
    /// transcript lives.
    fn fail(&self, stage: Stage, abort: Abort) -> Error {
        match abort {
            Abort::Protocol(context) => {
                self.log.error(format!("protocol violation: {context}"));
                SessionError::UnexpectedStream { context }.into()
            }
            Abort::Stream(reason) => {
                self.log.error(format!(
                    "{} failed: {reason}, refer to {}.stdout for the full transcript",
                    stage.describe(),
                    self.device
                ));
                let device = self.device.clone();
                match stage {
                    Stage::Login => SessionError::LoginFailed { device, reason },
                    Stage::Enable => SessionError::EnableFailed { device, reason },
                    Stage::Reset => SessionError::ResetFailed { device, reason },
                    Stage::Command(command) => SessionError::CommandFailed {
                        device,
                        command,
                        reason,
                    },
                    Stage::Push => SessionError::ConfigPushFailed { device, reason },
                    Stage::Save => SessionError::SaveConfigFailed { device, reason },
                }
                .into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_lines_drops_comments_and_blanks() {
        let text = "!\n! interface config\nhostname r1   \n\n  \ninterface Gi0/1\n  ! indented comment\n no shutdown\n";
        let lines = config_lines(text);
        assert_eq!(lines, vec!["hostname r1", "interface Gi0/1", " no shutdown"]);
    }

    #[test]
    fn test_config_lines_comments_only_is_empty() {
        let text = "! saved by admin\n!\n\n   !\n";
        assert!(config_lines(text).is_empty());
    }

    #[test]
    fn test_decode_maps_timeout_and_indices() {
        let timed_out = ExpectOutcome::TimedOut {
            before: String::new(),
        };
        let outcome = decode(
            timed_out,
            LoginOutcome::from_index,
            LoginOutcome::TimedOut,
            "test",
        )
        .unwrap();
        assert_eq!(outcome, LoginOutcome::TimedOut);

        let matched = ExpectOutcome::Matched {
            index: 1,
            before: String::new(),
            matched: String::new(),
        };
        let outcome = decode(
            matched,
            LoginOutcome::from_index,
            LoginOutcome::TimedOut,
            "test",
        )
        .unwrap();
        assert_eq!(outcome, LoginOutcome::Privileged);
    }

    #[test]
    fn test_decode_rejects_unmapped_index() {
        let matched = ExpectOutcome::Matched {
            index: 9,
            before: String::new(),
            matched: String::new(),
        };
        let err = decode(
            matched,
            LoginOutcome::from_index,
            LoginOutcome::TimedOut,
            "test",
        );
        assert!(matches!(err, Err(Abort::Protocol(_))));
    }
}
