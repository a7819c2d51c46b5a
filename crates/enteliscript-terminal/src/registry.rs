//! Token-to-command lookup table, built once at startup.

use std::collections::HashMap;

use enteliscript_types::error::{EnteliError, Result};

use crate::result::CommandResult;
use crate::session::Session;
use crate::spec::{ArgValue, CommandSpec};

/// A command implementation: a pure function of session state and coerced
/// arguments.
pub type Handler = fn(&mut Session, &[ArgValue]) -> Result<CommandResult>;

/// Immutable mapping from every command name and alias to its handler and
/// spec.
///
/// Looking up any declared token of a command yields the identical spec
/// instance, so help text and blocking metadata are consistent regardless
/// of which alias was typed.
#[derive(Debug)]
pub struct Registry {
    commands: Vec<(CommandSpec, Handler)>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Build the registry from the full catalog.
    ///
    /// A name or alias declared by two commands is a startup configuration
    /// error naming the collision; the registry is never built with a
    /// silently-overwritten entry.
    pub fn build(catalog: Vec<(CommandSpec, Handler)>) -> Result<Self> {
        let mut index = HashMap::new();
        for (i, (spec, _)) in catalog.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(EnteliError::Config("empty command name".to_string()));
            }
            for token in spec.tokens() {
                if index.insert(token.to_string(), i).is_some() {
                    return Err(EnteliError::Config(format!(
                        "command token '{token}' is declared by more than one command"
                    )));
                }
            }
        }
        log::debug!("registry built with {} commands", catalog.len());
        Ok(Self {
            commands: catalog,
            index,
        })
    }

    /// Resolve a lowercase token to its spec and handler.
    pub fn lookup(&self, token: &str) -> Option<(&CommandSpec, Handler)> {
        self.index
            .get(token)
            .map(|&i| (&self.commands[i].0, self.commands[i].1))
    }

    /// All registered specs, in registration order.
    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter().map(|(spec, _)| spec)
    }

    /// Number of registered commands (not tokens).
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
