//! Pure retry state machines for the login and enable dialogs.
//!
//! The session decodes every `expect` result into one of the outcome
//! enums below, feeds it to a machine, and performs the returned action.
//! The machines own the attempt bookkeeping and the enable-password
//! fallback policy; they never touch a stream, which keeps every
//! transition unit-testable.

/// Classified prompt state during the login loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Unprivileged,
    Privileged,
    ConfigMode,
    InitialDialog,
    Autoinstall,
    TimedOut,
}

impl LoginOutcome {
    /// Decode a match index from the login pattern list.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Unprivileged),
            1 => Some(Self::Privileged),
            2 => Some(Self::ConfigMode),
            3 => Some(Self::InitialDialog),
            4 => Some(Self::Autoinstall),
            _ => None,
        }
    }
}

/// Classified prompt state after declining the setup wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    Unprivileged,
    Autoinstall,
    TimedOut,
}

impl WizardOutcome {
    /// Decode a match index from the wizard pattern list.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Unprivileged),
            1 => Some(Self::Autoinstall),
            _ => None,
        }
    }
}

/// What the session should do next during login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAction {
    /// A usable prompt was reached.
    Succeed { privileged: bool },
    /// Send `end` and await the privileged prompt; success follows.
    ExitConfigMode,
    /// Send `no` to decline the setup wizard, then classify again.
    DeclineWizard,
    /// Send `yes` to terminate autoinstall; retries without consuming
    /// an attempt.
    ConfirmAutoinstall,
    /// Send a bare return and classify again; one attempt consumed.
    Nudge,
    /// Attempts exhausted.
    GiveUp,
}

/// What the session should do next inside the wizard sub-dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    /// The wizard dropped us at the unprivileged prompt.
    Accept,
    /// Send `yes` to terminate autoinstall; no attempt consumed.
    ConfirmAutoinstall,
    /// Send a bare return and re-enter the outer loop; one attempt
    /// consumed.
    Nudge,
    /// Attempts exhausted.
    GiveUp,
}

/// Attempt bookkeeping for the login classification loop.
#[derive(Debug)]
pub struct LoginMachine {
    attempts_left: u32,
}

impl LoginMachine {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts_left: attempts,
        }
    }

    /// Remaining attempts before the machine gives up.
    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    /// Transition on an outer-loop prompt classification.
    pub fn on_prompt(&mut self, outcome: LoginOutcome) -> LoginAction {
        match outcome {
            LoginOutcome::Unprivileged => LoginAction::Succeed { privileged: false },
            LoginOutcome::Privileged => LoginAction::Succeed { privileged: true },
            LoginOutcome::ConfigMode => LoginAction::ExitConfigMode,
            LoginOutcome::InitialDialog => LoginAction::DeclineWizard,
            LoginOutcome::Autoinstall => LoginAction::ConfirmAutoinstall,
            LoginOutcome::TimedOut => {
                if self.consume_attempt() {
                    LoginAction::Nudge
                } else {
                    LoginAction::GiveUp
                }
            }
        }
    }

    /// Transition on the classification that follows declining the
    /// setup wizard.
    pub fn on_wizard(&mut self, outcome: WizardOutcome) -> WizardAction {
        match outcome {
            WizardOutcome::Unprivileged => WizardAction::Accept,
            WizardOutcome::Autoinstall => WizardAction::ConfirmAutoinstall,
            WizardOutcome::TimedOut => {
                if self.consume_attempt() {
                    WizardAction::Nudge
                } else {
                    WizardAction::GiveUp
                }
            }
        }
    }

    /// Returns false once attempts are exhausted.
    fn consume_attempt(&mut self) -> bool {
        self.attempts_left = self.attempts_left.saturating_sub(1);
        self.attempts_left > 0
    }
}

/// Classified prompt state during the enable loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    Unprivileged,
    PasswordPrompt,
    Privileged,
    ConfigMode,
    TimedOut,
}

impl EnableOutcome {
    /// Decode a match index from the enable pattern list.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Unprivileged),
            1 => Some(Self::PasswordPrompt),
            2 => Some(Self::Privileged),
            3 => Some(Self::ConfigMode),
            _ => None,
        }
    }
}

/// What the session should do next during enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableAction {
    /// Send `enable`, pause briefly, classify again. No attempt consumed.
    SendEnable,
    /// Send the candidate password at `index`. With `terminal`, the
    /// candidates are spent: send it and give up without waiting for the
    /// device's verdict.
    SendPassword { index: usize, terminal: bool },
    /// The privileged prompt was reached.
    Succeed,
    /// Send `end` to leave configuration mode, classify again.
    ExitConfigMode,
    /// Send a bare return and classify again; one attempt consumed.
    Nudge,
    /// Attempts exhausted.
    GiveUp,
}

/// Attempt and password-fallback bookkeeping for the enable loop.
///
/// The fallback policy is deliberately narrow: the candidate index is the
/// number of passwords already sent, capped at 1, and the third send is
/// terminal. Only the first two candidates are ever used, however long
/// the list.
#[derive(Debug)]
pub struct EnableMachine {
    attempts_left: u32,
    passwords_sent: usize,
}

impl EnableMachine {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts_left: attempts,
            passwords_sent: 0,
        }
    }

    /// Transition on an enable-loop prompt classification.
    pub fn on_prompt(&mut self, outcome: EnableOutcome) -> EnableAction {
        match outcome {
            EnableOutcome::Unprivileged => EnableAction::SendEnable,
            EnableOutcome::PasswordPrompt => {
                let index = self.passwords_sent.min(1);
                self.passwords_sent += 1;
                EnableAction::SendPassword {
                    index,
                    terminal: self.passwords_sent > index + 1,
                }
            }
            EnableOutcome::Privileged => EnableAction::Succeed,
            EnableOutcome::ConfigMode => EnableAction::ExitConfigMode,
            EnableOutcome::TimedOut => {
                self.attempts_left = self.attempts_left.saturating_sub(1);
                if self.attempts_left > 0 {
                    EnableAction::Nudge
                } else {
                    EnableAction::GiveUp
                }
            }
        }
    }
}

/// Classified prompt state after sending one configuration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Still in configuration mode; send the next line.
    ConfigMode,
    /// The device fell back to the privileged prompt early.
    Privileged,
    TimedOut,
}

impl PushOutcome {
    /// Decode a match index from the push pattern list.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::ConfigMode),
            1 => Some(Self::Privileged),
            _ => None,
        }
    }
}
