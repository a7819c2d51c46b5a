//! The uniform result contract every command returns.

/// Side-effect directive a command can attach to its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    /// Clear the scrollback log.
    ClearLog,
    /// Start the modal site-selection flow over `data`.
    SelectSite,
}

/// Outcome of one command invocation.
///
/// `data` is populated if and only if `action` is
/// [`CommandAction::SelectSite`]; the constructors enforce this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Success flag; drives how `message` is styled.
    pub ok: bool,
    /// User-facing text, possibly empty.
    pub message: String,
    /// Optional directive for the dispatcher.
    pub action: Option<CommandAction>,
    /// Candidate site names when `action` is `SelectSite`.
    pub data: Vec<String>,
}

impl CommandResult {
    /// Successful result with a message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            action: None,
            data: Vec::new(),
        }
    }

    /// Failed result with a message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            action: None,
            data: Vec::new(),
        }
    }

    /// Request that the log be cleared. Carries no message.
    pub fn clear_log() -> Self {
        Self {
            ok: true,
            message: String::new(),
            action: Some(CommandAction::ClearLog),
            data: Vec::new(),
        }
    }

    /// Request the modal site-selection flow over `sites`.
    pub fn select_site(sites: Vec<String>) -> Self {
        Self {
            ok: true,
            message: String::new(),
            action: Some(CommandAction::SelectSite),
            data: sites,
        }
    }
}
