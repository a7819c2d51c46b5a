//! Error types for enteliscript.

use std::io;

/// Errors produced by the enteliscript crates.
#[derive(Debug, thiserror::Error)]
pub enum EnteliError {
    #[error("command error: {0}")]
    Command(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnteliError {
    /// Short tag naming the error kind, used when a command failure is
    /// reported back to the interactive surface.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::Usage(_) => "usage",
            Self::Config(_) => "config",
            Self::Remote(_) => "remote",
            Self::Csv(_) => "csv",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, EnteliError>;
