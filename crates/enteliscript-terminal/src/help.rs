//! Help rendering over the built registry.
//!
//! `help` needs to enumerate the registry, which handlers cannot see, so
//! the dispatcher routes it here instead of through its registered stub.

use crate::registry::Registry;
use crate::result::CommandResult;

/// Render help: the full listing with no topic, or detail for one command
/// resolved by name or alias.
pub fn help_for(registry: &Registry, topic: Option<&str>) -> CommandResult {
    match topic {
        Some(topic) => detail(registry, topic),
        None => listing(registry),
    }
}

fn listing(registry: &Registry) -> CommandResult {
    let mut rows: Vec<(String, &str)> = registry
        .specs()
        .filter(|spec| !spec.hidden)
        .map(|spec| {
            let left = if spec.aliases.is_empty() {
                spec.name.clone()
            } else {
                format!("{} ({})", spec.name, spec.aliases.join(", "))
            };
            (left, spec.summary.as_str())
        })
        .collect();
    rows.sort();

    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    let lines: Vec<String> = rows
        .iter()
        .map(|(left, summary)| format!("{left:width$}  {summary}"))
        .collect();
    CommandResult::ok(lines.join("\n"))
}

fn detail(registry: &Registry, topic: &str) -> CommandResult {
    let Some((spec, _)) = registry.lookup(topic) else {
        return CommandResult::fail(format!("unknown command '{topic}'"));
    };
    let mut lines = vec![format!("usage: {}", spec.usage), spec.summary.clone()];
    if !spec.aliases.is_empty() {
        lines.push(format!("aliases: {}", spec.aliases.join(", ")));
    }
    CommandResult::ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use enteliscript_types::Result;

    use crate::registry::Handler;
    use crate::result::CommandResult;
    use crate::session::Session;
    use crate::spec::{ArgValue, CommandSpec};

    fn noop(_: &mut Session, _: &[ArgValue]) -> Result<CommandResult> {
        Ok(CommandResult::ok(""))
    }

    fn registry() -> Registry {
        Registry::build(vec![
            (
                CommandSpec::new("setsite", "Select the active site").alias("ss"),
                noop as Handler,
            ),
            (CommandSpec::new("getsite", "Show the active site"), noop as Handler),
            (CommandSpec::new("clear", "Clear the log").hidden(), noop as Handler),
        ])
        .unwrap()
    }

    #[test]
    fn listing_is_alphabetized_and_skips_hidden() {
        let result = help_for(&registry(), None);
        assert!(result.ok);
        let lines: Vec<&str> = result.message.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("getsite"));
        assert!(lines[1].starts_with("setsite (ss)"));
        assert!(!result.message.contains("clear"));
    }

    #[test]
    fn listing_columns_are_aligned() {
        let result = help_for(&registry(), None);
        let summaries: Vec<usize> = result
            .message
            .lines()
            .map(|l| l.find("  ").unwrap() + 2)
            .collect();
        // Crude check: both summaries start past the widest left column.
        assert!(summaries.iter().all(|&col| col >= "setsite (ss)  ".len()));
    }

    #[test]
    fn detail_resolves_by_alias() {
        let result = help_for(&registry(), Some("ss"));
        assert!(result.ok);
        assert!(result.message.contains("usage: setsite"));
        assert!(result.message.contains("aliases: ss"));
    }

    #[test]
    fn detail_includes_hidden_commands() {
        let result = help_for(&registry(), Some("clear"));
        assert!(result.ok);
        assert!(result.message.contains("usage: clear"));
    }

    #[test]
    fn unknown_topic_fails() {
        let result = help_for(&registry(), Some("foo"));
        assert!(!result.ok);
        assert!(result.message.contains("'foo'"));
    }
}
