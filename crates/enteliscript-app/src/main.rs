//! enteliscript entry point.
//!
//! Line-oriented interactive client: reads one command per line, routes it
//! through the dispatcher, and runs blocking commands on a worker thread
//! while a spinner animates on the locked input surface. Exit with Ctrl-D.

mod console;
mod worker;

use std::io::{self, BufRead, Write};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Result;

use console::ConsoleSink;
use enteliscript_client::{CredentialStore, EnteliwebClient, JsonConfigStore};
use enteliscript_terminal::catalog::catalog;
use enteliscript_terminal::{CommandResult, Dispatch, Dispatcher, Outcome, Registry, Session};
use enteliscript_types::{OutputSink, TextStyle};
use enteliscript_ui::{CommandInput, SiteSelector};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 80;

/// How often the spinner advances while a blocking command is in flight.
const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = JsonConfigStore::open_default()?;
    let host = store
        .value("host")
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = store
        .value("port")
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let (username, password) = store.credentials();
    log::info!("enteliWEB server: {host}:{port}");

    let client = EnteliwebClient::with_credentials(&host, port, username, password);
    let session = Arc::new(Mutex::new(Session::new(Box::new(client), Box::new(store))));

    let mut dispatcher = Dispatcher::new(Registry::build(catalog())?);
    let mut sink = ConsoleSink::new();
    let mut input = CommandInput::new();

    sink.append(
        "enteliscript -- type 'help' for commands, Ctrl-D to exit",
        TextStyle::Info,
    );

    let stdin = io::stdin();
    loop {
        print!("enteliscript> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        for ch in line.trim_end_matches(['\r', '\n']).chars() {
            input.insert(ch);
        }
        let submitted = input.take_line();

        let dispatch = {
            let mut guard = lock(&session);
            dispatcher.dispatch(&submitted, &mut guard, &mut sink)
        };
        let result = match dispatch {
            Dispatch::Idle => continue,
            Dispatch::Done(result) => result,
            Dispatch::Blocking(invocation) => {
                input.lock(&invocation.label);
                let rx = worker::run_blocking(invocation, Arc::clone(&session));
                let result = loop {
                    match rx.recv_timeout(SPINNER_INTERVAL) {
                        Ok(result) => break result,
                        Err(RecvTimeoutError::Timeout) => {
                            input.tick();
                            if let Some(busy) = input.busy_line() {
                                print!("\r{busy}");
                                let _ = io::stdout().flush();
                            }
                        },
                        Err(RecvTimeoutError::Disconnected) => {
                            break CommandResult::fail("command crashed: worker vanished");
                        },
                    }
                };
                // End the spinner line before rendering the result.
                print!("\r\x1b[2K");
                let _ = io::stdout().flush();
                input.request_unlock();
                input.finish_unlock();
                result
            },
        };

        if let Outcome::SelectSite(sites) = dispatcher.interpret(result, &mut sink) {
            let choice = prompt_site(sites, &mut sink)?;
            let mut guard = lock(&session);
            Dispatcher::apply_site_selection(&mut guard, choice, &mut sink);
        }
    }

    log::info!("enteliscript exiting");
    Ok(())
}

fn lock(session: &Arc<Mutex<Session>>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}

/// Line-mode rendering of the modal site-selection flow: list the
/// candidates, read a number, anything else cancels.
fn prompt_site(sites: Vec<String>, sink: &mut dyn OutputSink) -> Result<Option<String>> {
    let Some(mut selector) = SiteSelector::open(sites) else {
        return Ok(None);
    };
    for (i, name) in selector.options().iter().enumerate() {
        sink.append(&format!("  {}. {name}", i + 1), TextStyle::Info);
    }
    print!("select a site by number (blank to cancel): ");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let Ok(n) = line.trim().parse::<usize>() else {
        return Ok(None);
    };
    if n == 0 || n > selector.options().len() {
        return Ok(None);
    }
    for _ in 1..n {
        selector.move_down();
    }
    Ok(Some(selector.confirm()))
}
