//! Output sink trait implemented by the presentation layer.

/// Styling hint for a line appended to the scrollback log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Echo of what the user typed.
    Echo,
    /// Neutral informational text.
    Info,
    /// Successful command output.
    Success,
    /// Failed command output.
    Error,
}

/// Append-only styled text log with a clear operation.
///
/// The dispatcher renders every command result through this trait; the
/// concrete implementation decides how styles map to the screen.
pub trait OutputSink {
    /// Append one block of text (may contain newlines) with a style.
    fn append(&mut self, text: &str, style: TextStyle);

    /// Discard all content.
    fn clear(&mut self);
}

/// In-memory sink recording every call, for tests and headless use.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Appended entries in order, paired with their style.
    pub entries: Vec<(String, TextStyle)>,
    /// Number of times `clear` was called.
    pub clears: usize,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|(text, _)| text.contains(needle))
    }

    /// The styles recorded so far, in order.
    pub fn styles(&self) -> Vec<TextStyle> {
        self.entries.iter().map(|(_, s)| *s).collect()
    }
}

impl OutputSink for RecordingSink {
    fn append(&mut self, text: &str, style: TextStyle) {
        self.entries.push((text.to_string(), style));
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.clears += 1;
    }
}
