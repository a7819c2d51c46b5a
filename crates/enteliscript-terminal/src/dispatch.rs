//! Input pipeline: tokenize, look up, coerce, execute, interpret.

use enteliscript_types::error::{EnteliError, Result};
use enteliscript_types::{OutputSink, TextStyle};

use crate::help;
use crate::history::History;
use crate::registry::{Handler, Registry};
use crate::result::{CommandAction, CommandResult};
use crate::session::Session;
use crate::spec::{ArgValue, coerce_args};

/// What one line of input turned into.
#[derive(Debug)]
pub enum Dispatch {
    /// Blank input; nothing happened.
    Idle,
    /// The command completed in place (or failed before execution) and the
    /// result still needs interpreting.
    Done(CommandResult),
    /// A blocking command; the caller must lock the input surface and run
    /// the invocation off the interactive thread.
    Blocking(Invocation),
}

/// A fully-prepared command call: handler plus coerced arguments.
///
/// Produced for blocking commands so the caller controls where it runs.
/// `run` never lets an error escape; failures come back as an ordinary
/// failed [`CommandResult`].
pub struct Invocation {
    /// Label to show while the call is in flight.
    pub label: String,
    name: String,
    usage: String,
    handler: Handler,
    args: Vec<ArgValue>,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Invocation {
    /// Invoke the handler, folding every failure into a result.
    pub fn run(self, session: &mut Session) -> CommandResult {
        log::debug!("executing '{}'", self.name);
        match (self.handler)(session, &self.args) {
            Ok(result) => result,
            Err(EnteliError::Usage(msg)) => {
                CommandResult::fail(format!("{msg} (usage: {})", self.usage))
            },
            Err(e) => CommandResult::fail(format!("{} failed: {e}", self.name)),
        }
    }
}

/// What the caller must do after a result has been interpreted.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Rendering is complete; return to the prompt.
    Quiet,
    /// Run the modal site-selection flow over these names, then call
    /// [`Dispatcher::apply_site_selection`].
    SelectSite(Vec<String>),
}

/// The command dispatcher: registry, history, and the input pipeline.
pub struct Dispatcher {
    registry: Registry,
    history: History,
}

impl Dispatcher {
    /// Wrap a built registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            history: History::new(),
        }
    }

    /// The read-only registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Recorded history, oldest first.
    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// Feed one raw line of user input through the pipeline.
    ///
    /// Non-blocking commands execute in place; blocking ones come back as
    /// [`Dispatch::Blocking`] for the caller to run off the interactive
    /// thread. The returned [`CommandResult`] (directly, or from
    /// [`Invocation::run`]) must be passed to [`Dispatcher::interpret`].
    pub fn dispatch(
        &mut self,
        raw: &str,
        session: &mut Session,
        sink: &mut dyn OutputSink,
    ) -> Dispatch {
        let line = raw.trim();
        if line.is_empty() {
            return Dispatch::Idle;
        }

        // History records what was typed, before execution.
        self.history.push(line);

        sink.append(&format!("> {line}"), TextStyle::Echo);

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => return Dispatch::Done(CommandResult::fail(e.to_string())),
        };
        if tokens.is_empty() {
            return Dispatch::Idle;
        }

        // "name?" shorthand for "help name".
        if tokens.len() == 1 && tokens[0].len() > 1 && tokens[0].ends_with('?') {
            let name = tokens[0][..tokens[0].len() - 1].to_ascii_lowercase();
            return Dispatch::Done(help::help_for(&self.registry, Some(&name)));
        }

        let command_token = tokens[0].to_ascii_lowercase();
        let Some((spec, handler)) = self.registry.lookup(&command_token) else {
            return Dispatch::Done(CommandResult::fail(format!(
                "unknown command '{}' (try 'help')",
                tokens[0]
            )));
        };

        // `help` needs registry access, so the dispatcher intercepts it;
        // the registered handler is only a placeholder.
        if spec.name == "help" {
            let topic = tokens.get(1).map(|t| t.to_ascii_lowercase());
            return Dispatch::Done(help::help_for(&self.registry, topic.as_deref()));
        }

        let args = match coerce_args(spec, &tokens[1..]) {
            Ok(args) => args,
            Err(e) => return Dispatch::Done(CommandResult::fail(e.to_string())),
        };

        let invocation = Invocation {
            label: spec.blocking_msg.clone(),
            name: spec.name.clone(),
            usage: spec.usage.clone(),
            handler,
            args,
        };
        if spec.blocking {
            Dispatch::Blocking(invocation)
        } else {
            Dispatch::Done(invocation.run(session))
        }
    }

    /// Interpret a result's action directive and render its message.
    pub fn interpret(&self, result: CommandResult, sink: &mut dyn OutputSink) -> Outcome {
        match result.action {
            Some(CommandAction::ClearLog) => {
                sink.clear();
                if !result.message.is_empty() {
                    sink.append(&result.message, style_for(result.ok));
                }
                Outcome::Quiet
            },
            Some(CommandAction::SelectSite) => {
                if !result.message.is_empty() {
                    sink.append(&result.message, style_for(result.ok));
                }
                Outcome::SelectSite(result.data)
            },
            None => {
                if !result.message.is_empty() {
                    sink.append(&result.message, style_for(result.ok));
                }
                Outcome::Quiet
            },
        }
    }

    /// Complete the site-selection flow: commit a confirmed choice or
    /// report cancellation, leaving the site unchanged.
    pub fn apply_site_selection(
        session: &mut Session,
        choice: Option<String>,
        sink: &mut dyn OutputSink,
    ) {
        match choice {
            Some(name) => {
                log::info!("active site set to '{name}'");
                sink.append(&format!("Active site set to '{name}'."), TextStyle::Success);
                session.sitename = Some(name);
            },
            None => {
                sink.append("Site selection cancelled.", TextStyle::Info);
            },
        }
    }
}

fn style_for(ok: bool) -> TextStyle {
    if ok { TextStyle::Success } else { TextStyle::Error }
}

// ---------------------------------------------------------------------------
// Tokenizer: handles single quotes, double quotes, and backslash escapes.
// ---------------------------------------------------------------------------

/// Tokenize a command line respecting quotes and backslash escapes.
///
/// - Single-quoted strings preserve all characters literally.
/// - Double-quoted strings allow `\"` and `\\` escapes.
/// - Backslash escapes the next character outside of quotes.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            if ch == '"' {
                in_double = false;
            } else if ch == '\\' {
                if let Some(&next) = chars.peek()
                    && (next == '"' || next == '\\')
                {
                    current.push(next);
                    chars.next();
                } else {
                    current.push('\\');
                }
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '\'' => in_single = true,
                '"' => in_double = true,
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                },
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(EnteliError::Command("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(EnteliError::Command("unterminated double quote".to_string()));
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
