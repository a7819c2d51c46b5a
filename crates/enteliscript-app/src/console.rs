//! ANSI console output sink.

use std::io::{self, Write};

use enteliscript_types::{OutputSink, TextStyle};

const RESET: &str = "\x1b[0m";

/// Renders the styled log directly to stdout with ANSI colors.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn code(style: TextStyle) -> &'static str {
        match style {
            TextStyle::Echo => "\x1b[2m",
            TextStyle::Info => "",
            TextStyle::Success => "\x1b[32m",
            TextStyle::Error => "\x1b[31m",
        }
    }
}

impl OutputSink for ConsoleSink {
    fn append(&mut self, text: &str, style: TextStyle) {
        let code = Self::code(style);
        if code.is_empty() {
            println!("{text}");
        } else {
            println!("{code}{text}{RESET}");
        }
        let _ = io::stdout().flush();
    }

    fn clear(&mut self) {
        // Clear screen and home the cursor.
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }
}
