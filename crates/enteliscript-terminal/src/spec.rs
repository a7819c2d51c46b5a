//! Immutable command metadata and typed-argument coercion.

use enteliscript_types::error::{EnteliError, Result};

/// Label shown for a blocking command that did not declare its own.
pub const DEFAULT_BLOCKING_MSG: &str = "Working ...";

/// Expected type of one positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Passed through as typed.
    Str,
    /// Parsed as a signed integer.
    Int,
    /// Parsed as a float.
    Float,
}

/// A coerced argument value handed to a command handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl ArgValue {
    /// The string payload, if this is a string argument.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer argument.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The float payload; integer arguments widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// Immutable metadata registered alongside a command implementation.
///
/// Names and aliases are lowercase-normalized at construction so lookup is
/// case-insensitive. `usage` defaults to the bare name.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    /// Canonical identifier, lowercase, unique across the catalog.
    pub name: String,
    /// Additional lowercase identifiers resolving to the same handler.
    pub aliases: Vec<String>,
    /// Invocation template shown in help output.
    pub usage: String,
    /// One-line description.
    pub summary: String,
    /// True if invoking the command may perform network I/O.
    pub blocking: bool,
    /// Label presented while a blocking command is in flight.
    pub blocking_msg: String,
    /// Excluded from the bare `help` listing.
    pub hidden: bool,
    /// Expected positional argument types; extras pass through as strings.
    pub params: Vec<ParamType>,
}

impl CommandSpec {
    /// Create a spec with defaults: no aliases, usage equal to the name,
    /// non-blocking, visible, no declared parameters.
    pub fn new(name: &str, summary: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        debug_assert!(!name.is_empty(), "command name must be non-empty");
        Self {
            usage: name.clone(),
            name,
            aliases: Vec::new(),
            summary: summary.to_string(),
            blocking: false,
            blocking_msg: String::new(),
            hidden: false,
            params: Vec::new(),
        }
    }

    /// Override the usage template.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Add one alias (lowercase-normalized).
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.trim().to_ascii_lowercase());
        self
    }

    /// Mark the command blocking; an empty label falls back to
    /// [`DEFAULT_BLOCKING_MSG`].
    pub fn blocking(mut self, msg: &str) -> Self {
        self.blocking = true;
        self.blocking_msg = if msg.is_empty() {
            DEFAULT_BLOCKING_MSG.to_string()
        } else {
            msg.to_string()
        };
        self
    }

    /// Hide from the bare `help` listing.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Declare the expected positional argument types.
    pub fn params(mut self, params: &[ParamType]) -> Self {
        self.params = params.to_vec();
        self
    }

    /// Every token that resolves to this command: name first, then aliases.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Coerce raw argument tokens positionally against a spec's declared
/// parameter types. Tokens beyond the declared count pass through as raw
/// strings. A failed conversion aborts with an error naming the token and
/// position; the command is never invoked in that case.
pub fn coerce_args(spec: &CommandSpec, raw: &[String]) -> Result<Vec<ArgValue>> {
    let mut out = Vec::with_capacity(raw.len());
    for (i, token) in raw.iter().enumerate() {
        let value = match spec.params.get(i) {
            Some(ParamType::Int) => ArgValue::Int(token.parse().map_err(|_| {
                EnteliError::Command(format!(
                    "invalid integer '{token}' for argument {}",
                    i + 1
                ))
            })?),
            Some(ParamType::Float) => ArgValue::Float(token.parse().map_err(|_| {
                EnteliError::Command(format!("invalid number '{token}' for argument {}", i + 1))
            })?),
            Some(ParamType::Str) | None => ArgValue::Str(token.clone()),
        };
        out.push(value);
    }
    Ok(out)
}
