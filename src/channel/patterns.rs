//! The fixed prompt recognizer set for the device dialog.
//!
//! Every pattern the session state machine dispatches on lives here,
//! compiled once for the whole process and handed out by reference.
//! Recognizers run over the tail window of the output buffer; none of
//! them is anchored, because device banners and command echo precede the
//! prompt in the same window.

use std::sync::LazyLock;

use regex::bytes::Regex;

static PROMPTS: LazyLock<PromptSet> = LazyLock::new(PromptSet::compile);

/// Compiled recognizers for every prompt and dialog state the session
/// state machine can encounter.
#[derive(Debug)]
pub struct PromptSet {
    /// Plain user-mode prompt, e.g. `router>`.
    pub unprivileged: Regex,

    /// Privileged-mode prompt, e.g. `router#`.
    pub privileged: Regex,

    /// Configuration-mode prompt, e.g. `router(config-if)#`.
    pub config_mode: Regex,

    /// First-boot setup wizard offer.
    pub initial_dialog: Regex,

    /// "Would you like to terminate autoinstall?" question.
    pub autoinstall: Regex,

    /// Relay login username prompt.
    pub username: Regex,

    /// Login or enable password prompt.
    pub password: Regex,

    /// `[yes/no]` question.
    pub yes_no: Regex,

    /// `[confirm]` question.
    pub confirm: Regex,

    /// Filename check when deleting the VLAN database file.
    pub vlan_file_check: Regex,

    /// Acknowledgement text confirming a reload was accepted.
    pub reload_ack: Regex,
}

impl PromptSet {
    fn compile() -> Self {
        Self {
            unprivileged: pattern(r"[\w-]+>"),
            privileged: pattern(r"[\w-]+#"),
            config_mode: pattern(r"\(config[^)]*\)"),
            initial_dialog: pattern(r"initial\s+configuration\s+dialog"),
            autoinstall: pattern(r"terminate\sautoinstall"),
            // Case-tolerant stems: relays vary between `Username:` and
            // `username:`.
            username: pattern(r"sername"),
            password: pattern(r"assword"),
            yes_no: pattern(r"\[yes/no\]"),
            confirm: pattern(r"\[confirm\]"),
            vlan_file_check: pattern(r"\[vlan\.dat\]"),
            reload_ack: pattern(r"Reload\s+requested"),
        }
    }

    /// The shared, process-wide compiled set.
    pub fn shared() -> &'static PromptSet {
        &PROMPTS
    }

    /// Pattern list for the login classification loop. Order is
    /// dispatch priority.
    pub fn login_set(&self) -> [&Regex; 5] {
        [
            &self.unprivileged,
            &self.privileged,
            &self.config_mode,
            &self.initial_dialog,
            &self.autoinstall,
        ]
    }

    /// Pattern list for the post-wizard classification.
    pub fn wizard_set(&self) -> [&Regex; 2] {
        [&self.unprivileged, &self.autoinstall]
    }

    /// Pattern list for the enable classification loop.
    pub fn enable_set(&self) -> [&Regex; 4] {
        [
            &self.unprivileged,
            &self.password,
            &self.privileged,
            &self.config_mode,
        ]
    }

    /// Pattern list for per-line configuration push classification.
    pub fn push_set(&self) -> [&Regex; 2] {
        [&self.config_mode, &self.privileged]
    }

    /// Pattern list for the reload confirmation branch.
    pub fn reload_set(&self) -> [&Regex; 2] {
        [&self.yes_no, &self.confirm]
    }
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("static prompt pattern")
}
