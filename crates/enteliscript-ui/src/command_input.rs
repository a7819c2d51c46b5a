//! CommandInput widget state: editable line, busy lock, history navigation.

/// Spinner animation frames cycled while a blocking command is in flight.
pub const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Lock state of the input surface.
///
/// `Draining` sits between busy and editable: the command has completed,
/// but input events queued while it ran still have to be flushed (and
/// discarded) before the field is handed back to the user. Without this
/// step a keystroke typed during the busy window would leak into the
/// freshly cleared line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Accepting edits and submissions.
    Unlocked,
    /// A blocking command is in flight; edits are suppressed.
    Locked,
    /// Command finished; suppressing queued events until the next flush.
    Draining,
}

/// Single-line command input with a busy lock and history recall.
///
/// History entries live in the dispatcher; navigation methods borrow them
/// per call. The in-progress line is preserved as a draft when navigation
/// starts and restored when the user steps past the newest entry.
#[derive(Debug)]
pub struct CommandInput {
    /// Current line content.
    pub text: String,
    lock: LockState,
    lock_label: String,
    spinner: usize,
    /// Index into the history slice while navigating.
    cursor: Option<usize>,
    draft: String,
}

impl CommandInput {
    /// Create an empty, unlocked input.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            lock: LockState::Unlocked,
            lock_label: String::new(),
            spinner: 0,
            cursor: None,
            draft: String::new(),
        }
    }

    // -- Editing --

    /// Append a character; ignored while the input is locked.
    pub fn insert(&mut self, ch: char) {
        if self.lock != LockState::Unlocked {
            return;
        }
        self.text.push(ch);
        self.cursor = None;
    }

    /// Remove the last character; ignored while the input is locked.
    pub fn backspace(&mut self) {
        if self.lock != LockState::Unlocked {
            return;
        }
        self.text.pop();
        self.cursor = None;
    }

    /// Escape gesture: clear the line and abandon history navigation.
    pub fn escape(&mut self) {
        if self.lock != LockState::Unlocked {
            return;
        }
        self.text.clear();
        self.cursor = None;
        self.draft.clear();
    }

    /// Take the current line for submission, leaving the field empty.
    pub fn take_line(&mut self) -> String {
        self.cursor = None;
        self.draft.clear();
        std::mem::take(&mut self.text)
    }

    // -- History navigation --

    /// Step to the previous (older) history entry, clamping at the oldest.
    /// The first step preserves the in-progress line as a draft.
    pub fn history_prev(&mut self, history: &[String]) {
        if self.lock != LockState::Unlocked || history.is_empty() {
            return;
        }
        match self.cursor {
            None => {
                self.draft = std::mem::take(&mut self.text);
                self.cursor = Some(history.len() - 1);
            },
            Some(i) if i > 0 => self.cursor = Some(i - 1),
            Some(_) => {},
        }
        if let Some(i) = self.cursor {
            self.text = history[i].clone();
        }
    }

    /// Step toward the newest entry; stepping past it restores the draft.
    pub fn history_next(&mut self, history: &[String]) {
        if self.lock != LockState::Unlocked {
            return;
        }
        match self.cursor {
            Some(i) if i + 1 < history.len() => {
                self.cursor = Some(i + 1);
                self.text = history[i + 1].clone();
            },
            Some(_) => {
                self.cursor = None;
                self.text = std::mem::take(&mut self.draft);
            },
            None => {},
        }
    }

    // -- Busy lock --

    /// Lock the input for a blocking command, showing `label`.
    pub fn lock(&mut self, label: &str) {
        log::debug!("input locked: {label}");
        self.lock = LockState::Locked;
        self.lock_label = label.to_string();
        self.spinner = 0;
    }

    /// Begin releasing the lock. The field stays suppressed until
    /// [`CommandInput::finish_unlock`], so events queued during the busy
    /// window cannot edit the line.
    pub fn request_unlock(&mut self) {
        if self.lock == LockState::Locked {
            self.lock = LockState::Draining;
        }
    }

    /// Complete the release after queued events have been flushed.
    pub fn finish_unlock(&mut self) {
        if self.lock == LockState::Draining {
            log::debug!("input unlocked");
            self.lock = LockState::Unlocked;
            self.lock_label.clear();
            self.text.clear();
            self.cursor = None;
            self.draft.clear();
        }
    }

    /// True while edits and submissions are suppressed.
    pub fn is_locked(&self) -> bool {
        self.lock != LockState::Unlocked
    }

    /// The current lock state.
    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    /// Advance the spinner one frame; no-op unless locked.
    pub fn tick(&mut self) {
        if self.lock == LockState::Locked {
            self.spinner = (self.spinner + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Busy indicator line, e.g. `"/ Fetching sites ..."`, while locked.
    pub fn busy_line(&self) -> Option<String> {
        if self.lock == LockState::Locked {
            Some(format!("{} {}", SPINNER_FRAMES[self.spinner], self.lock_label))
        } else {
            None
        }
    }
}

impl Default for CommandInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_defaults() {
        let input = CommandInput::new();
        assert!(input.text.is_empty());
        assert!(!input.is_locked());
        assert!(input.busy_line().is_none());
    }

    #[test]
    fn insert_and_backspace() {
        let mut input = CommandInput::new();
        input.insert('h');
        input.insert('i');
        input.backspace();
        assert_eq!(input.text, "h");
    }

    #[test]
    fn take_line_clears_the_field() {
        let mut input = CommandInput::new();
        input.insert('x');
        assert_eq!(input.take_line(), "x");
        assert!(input.text.is_empty());
    }

    #[test]
    fn escape_clears_line_and_navigation() {
        let mut input = CommandInput::new();
        let h = history(&["a"]);
        input.insert('d');
        input.history_prev(&h);
        input.escape();
        assert!(input.text.is_empty());
        input.history_next(&h);
        assert!(input.text.is_empty(), "navigation was abandoned");
    }

    // -- History --

    #[test]
    fn prev_clamps_at_oldest() {
        let mut input = CommandInput::new();
        let h = history(&["a"]);
        input.history_prev(&h);
        assert_eq!(input.text, "a");
        input.history_prev(&h);
        assert_eq!(input.text, "a");
    }

    #[test]
    fn next_restores_the_draft() {
        let mut input = CommandInput::new();
        let h = history(&["a", "b"]);
        input.insert('d');
        input.insert('r');
        input.history_prev(&h);
        assert_eq!(input.text, "b");
        input.history_prev(&h);
        assert_eq!(input.text, "a");
        input.history_next(&h);
        assert_eq!(input.text, "b");
        input.history_next(&h);
        assert_eq!(input.text, "dr", "stepping past newest restores draft");
    }

    #[test]
    fn next_without_navigation_is_noop() {
        let mut input = CommandInput::new();
        input.insert('x');
        input.history_next(&history(&["a"]));
        assert_eq!(input.text, "x");
    }

    #[test]
    fn prev_with_empty_history_is_noop() {
        let mut input = CommandInput::new();
        input.insert('x');
        input.history_prev(&[]);
        assert_eq!(input.text, "x");
    }

    #[test]
    fn editing_resets_navigation() {
        let mut input = CommandInput::new();
        let h = history(&["a", "b"]);
        input.history_prev(&h);
        input.insert('!');
        assert_eq!(input.text, "b!");
        // A fresh prev starts again from the newest entry.
        input.history_prev(&h);
        assert_eq!(input.text, "b");
    }

    // -- Lock --

    #[test]
    fn edits_suppressed_while_locked() {
        let mut input = CommandInput::new();
        input.lock("Working ...");
        input.insert('x');
        input.backspace();
        input.history_prev(&history(&["a"]));
        assert!(input.text.is_empty());
        assert!(input.is_locked());
    }

    #[test]
    fn busy_line_shows_label_and_spinner() {
        let mut input = CommandInput::new();
        input.lock("Fetching sites ...");
        assert_eq!(input.busy_line().unwrap(), "| Fetching sites ...");
        input.tick();
        assert_eq!(input.busy_line().unwrap(), "/ Fetching sites ...");
    }

    #[test]
    fn spinner_wraps() {
        let mut input = CommandInput::new();
        input.lock("w");
        for _ in 0..SPINNER_FRAMES.len() {
            input.tick();
        }
        assert_eq!(input.busy_line().unwrap(), "| w");
    }

    #[test]
    fn unlock_is_deferred_until_flush() {
        let mut input = CommandInput::new();
        input.lock("w");
        input.request_unlock();
        assert_eq!(input.lock_state(), LockState::Draining);
        // A keystroke queued during the busy window arrives here.
        input.insert('q');
        input.finish_unlock();
        assert_eq!(input.lock_state(), LockState::Unlocked);
        assert!(input.text.is_empty(), "leaked keystroke was discarded");
    }

    #[test]
    fn finish_unlock_without_request_is_noop() {
        let mut input = CommandInput::new();
        input.lock("w");
        input.finish_unlock();
        assert!(input.is_locked());
    }

    #[test]
    fn tick_only_animates_while_locked() {
        let mut input = CommandInput::new();
        input.tick();
        assert!(input.busy_line().is_none());
        input.lock("w");
        input.request_unlock();
        input.tick();
        assert!(input.busy_line().is_none(), "draining shows no spinner");
    }
}
