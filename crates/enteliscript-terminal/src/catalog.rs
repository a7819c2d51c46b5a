//! The command catalog: every handler plus its registration metadata.
//!
//! Handlers are pure functions of session state and coerced arguments.
//! Domain failures (no site, empty listings, remote refusals) come back as
//! failed results; errors are reserved for usage and store problems.

use std::path::Path;

use enteliscript_types::error::{EnteliError, Result};
use enteliscript_types::ObjectRef;

use crate::registry::Handler;
use crate::result::CommandResult;
use crate::session::Session;
use crate::spec::{ArgValue, CommandSpec};

/// The full, fixed command set in registration order.
pub fn catalog() -> Vec<(CommandSpec, Handler)> {
    vec![
        (
            CommandSpec::new("login", "Authenticate against the server").blocking("Logging in ..."),
            login as Handler,
        ),
        (
            CommandSpec::new("setlogin", "Store credentials for future logins")
                .usage("setlogin <username> <password>")
                .alias("sl"),
            setlogin,
        ),
        (
            CommandSpec::new("getlogin", "Show the stored username and masked password")
                .alias("gl"),
            getlogin,
        ),
        (
            CommandSpec::new("setsite", "Choose the active site from the server's list")
                .alias("ss")
                .blocking("Fetching sites ..."),
            setsite,
        ),
        (
            CommandSpec::new("getsite", "Show the active site").alias("gs"),
            getsite,
        ),
        (
            CommandSpec::new("getdevices", "List devices under the active site")
                .alias("gd")
                .blocking("Fetching devices ..."),
            getdevices,
        ),
        (
            CommandSpec::new("getobjects", "List objects exposed by a device")
                .usage("getobjects <device>")
                .alias("go")
                .blocking("Fetching objects ..."),
            getobjects,
        ),
        (
            CommandSpec::new("getproperties", "Show the properties of one object")
                .usage("getproperties <device> <object>")
                .alias("gp")
                .blocking("Fetching properties ..."),
            getproperties,
        ),
        (
            CommandSpec::new("writeproperty", "Write one property value")
                .usage("writeproperty <device> <object> <property> <value>")
                .alias("wp")
                .blocking("Writing property ..."),
            writeproperty,
        ),
        (
            CommandSpec::new("writecsv", "Batch-write properties from a CSV file")
                .usage("writecsv <path>")
                .alias("wc")
                .blocking("Writing from CSV ..."),
            writecsv,
        ),
        (
            CommandSpec::new("help", "List commands or show one command's usage")
                .usage("help [command]")
                .hidden(),
            help_stub,
        ),
        (
            CommandSpec::new("clear", "Clear the log").alias("cls").hidden(),
            clear,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn login(session: &mut Session, _args: &[ArgValue]) -> Result<CommandResult> {
    if !session.remote.has_credentials() {
        return Ok(CommandResult::fail(
            "no credentials set (use setlogin <username> <password>)",
        ));
    }
    if session.remote.login() {
        let user = session.remote.username().unwrap_or_default();
        log::info!("authenticated as '{user}'");
        Ok(CommandResult::ok(format!("Logged in as '{user}'.")))
    } else {
        Ok(CommandResult::fail(
            "login failed (check credentials and server address)",
        ))
    }
}

fn setlogin(session: &mut Session, args: &[ArgValue]) -> Result<CommandResult> {
    let user = str_arg(args, 0, "username")?;
    let pass = str_arg(args, 1, "password")?;
    session.store.set_credentials(user, pass)?;
    session.remote.set_username(user);
    session.remote.set_password(pass);
    Ok(CommandResult::ok(format!("Credentials stored for '{user}'.")))
}

fn getlogin(session: &mut Session, _args: &[ArgValue]) -> Result<CommandResult> {
    let (user, pass) = session.store.credentials();
    match (user, pass) {
        (Some(user), Some(pass)) => Ok(CommandResult::ok(format!(
            "username: {user}\npassword: {}",
            mask_password(&pass)
        ))),
        _ => Ok(CommandResult::fail(
            "no credentials stored (use setlogin <username> <password>)",
        )),
    }
}

fn setsite(session: &mut Session, _args: &[ArgValue]) -> Result<CommandResult> {
    let sites = session.remote.sites();
    if sites.is_empty() {
        Ok(CommandResult::fail("no sites found (are you logged in?)"))
    } else {
        Ok(CommandResult::select_site(sites))
    }
}

fn getsite(session: &mut Session, _args: &[ArgValue]) -> Result<CommandResult> {
    match &session.sitename {
        Some(site) => Ok(CommandResult::ok(format!("Active site: {site}"))),
        None => Ok(CommandResult::fail("no active site (log in and run setsite)")),
    }
}

fn getdevices(session: &mut Session, _args: &[ArgValue]) -> Result<CommandResult> {
    let Some(site) = session.sitename.clone() else {
        return Ok(no_site());
    };
    let devices = session.remote.devices(&site);
    if devices.is_empty() {
        Ok(CommandResult::fail(format!("no devices found for site '{site}'")))
    } else {
        Ok(CommandResult::ok(numbered(&devices)))
    }
}

fn getobjects(session: &mut Session, args: &[ArgValue]) -> Result<CommandResult> {
    let device = str_arg(args, 0, "device")?.to_string();
    let Some(site) = session.sitename.clone() else {
        return Ok(no_site());
    };
    let objects = session.remote.objects(&site, &device);
    if objects.is_empty() {
        Ok(CommandResult::fail(format!("no objects found on '{device}'")))
    } else {
        Ok(CommandResult::ok(numbered(&objects)))
    }
}

fn getproperties(session: &mut Session, args: &[ArgValue]) -> Result<CommandResult> {
    let device = str_arg(args, 0, "device")?.to_string();
    let object = match str_arg(args, 1, "object")?.parse::<ObjectRef>() {
        Ok(object) => object,
        Err(e) => return Ok(CommandResult::fail(e.to_string())),
    };
    let Some(site) = session.sitename.clone() else {
        return Ok(no_site());
    };
    let properties = session.remote.properties(&site, &device, &object);
    if properties.is_empty() {
        Ok(CommandResult::fail(format!(
            "no properties found for {object} on '{device}'"
        )))
    } else {
        let lines: Vec<String> = properties
            .iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect();
        Ok(CommandResult::ok(lines.join("\n")))
    }
}

fn writeproperty(session: &mut Session, args: &[ArgValue]) -> Result<CommandResult> {
    let device = str_arg(args, 0, "device")?.to_string();
    let object = match str_arg(args, 1, "object")?.parse::<ObjectRef>() {
        Ok(object) => object,
        Err(e) => return Ok(CommandResult::fail(e.to_string())),
    };
    let property = str_arg(args, 2, "property")?.to_string();
    let value = str_arg(args, 3, "value")?.to_string();
    let Some(site) = session.sitename.clone() else {
        return Ok(no_site());
    };
    if session
        .remote
        .write_property(&site, &device, &object, &property, &value)
    {
        Ok(CommandResult::ok(format!(
            "Wrote {site}/{device}/{object}/{property} = {value}."
        )))
    } else {
        Ok(CommandResult::fail(format!(
            "write to {site}/{device}/{object}/{property} failed"
        )))
    }
}

fn writecsv(session: &mut Session, args: &[ArgValue]) -> Result<CommandResult> {
    let path = str_arg(args, 0, "path")?.to_string();
    if !Path::new(&path).is_file() {
        return Ok(CommandResult::fail(format!("file not found: '{path}'")));
    }
    let mut succeeded = 0usize;
    let mut total = 0usize;
    let mut report = Vec::new();
    for (target, ok) in session.remote.write_properties_from_file(Path::new(&path)) {
        total += 1;
        if ok {
            succeeded += 1;
            report.push(format!("ok      {target}"));
        } else {
            report.push(format!("FAILED  {target}"));
        }
    }
    if total == 0 {
        return Ok(CommandResult::fail(format!("no rows processed from '{path}'")));
    }
    report.push(format!("{succeeded} of {total} writes succeeded"));
    let message = report.join("\n");
    if succeeded == total {
        Ok(CommandResult::ok(message))
    } else {
        Ok(CommandResult::fail(message))
    }
}

// Never invoked: the dispatcher routes `help` through the registry-aware
// renderer, since handlers cannot see the registry.
fn help_stub(_session: &mut Session, _args: &[ArgValue]) -> Result<CommandResult> {
    Ok(CommandResult::ok(""))
}

fn clear(_session: &mut Session, _args: &[ArgValue]) -> Result<CommandResult> {
    Ok(CommandResult::clear_log())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn no_site() -> CommandResult {
    CommandResult::fail("no active site (log in and run setsite)")
}

fn str_arg<'a>(args: &'a [ArgValue], index: usize, what: &str) -> Result<&'a str> {
    match args.get(index).and_then(ArgValue::as_str) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(EnteliError::Usage(format!("missing {what}"))),
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mask a password for display: first two and last two characters visible,
/// the rest replaced by `*`. Four characters or fewer masks everything.
fn mask_password(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}
