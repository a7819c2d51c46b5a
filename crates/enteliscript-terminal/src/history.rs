//! Bounded command history.

/// Maximum number of history entries to retain.
pub const MAX_HISTORY: usize = 100;

/// Append-only history buffer with consecutive-duplicate collapsing.
///
/// Entries are recorded before execution, so history captures what was
/// typed regardless of whether the command succeeded.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line. A line equal to the most recent entry is dropped;
    /// the oldest entry is evicted past [`MAX_HISTORY`].
    pub fn push(&mut self, line: &str) {
        if self.entries.last().is_none_or(|last| last != line) {
            self.entries.push(line.to_string());
            if self.entries.len() > MAX_HISTORY {
                self.entries.remove(0);
            }
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
