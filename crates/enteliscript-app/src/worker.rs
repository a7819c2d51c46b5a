//! Background execution of blocking commands.
//!
//! At most one invocation is in flight at a time; the interactive loop
//! locks the input surface before calling [`run_blocking`] and unlocks it
//! when the receiver yields. A completion message is always delivered,
//! even when the handler panics, so the unlock can never be skipped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use enteliscript_terminal::{CommandResult, Invocation, Session};

/// Run one blocking invocation on a worker thread, delivering its result
/// (or a crash report) on the returned channel.
pub fn run_blocking(
    invocation: Invocation,
    session: Arc<Mutex<Session>>,
) -> mpsc::Receiver<CommandResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
            invocation.run(&mut session)
        }))
        .unwrap_or_else(|payload| {
            let reason = panic_message(payload.as_ref());
            log::error!("blocking command panicked: {reason}");
            CommandResult::fail(format!("command crashed: {reason}"))
        });
        // The receiver may have gone away on shutdown.
        let _ = tx.send(result);
    });
    rx
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use enteliscript_terminal::testing::{MockRemote, MockStore, test_session};
    use enteliscript_terminal::{
        ArgValue, Dispatch, Dispatcher, Handler, Registry, CommandSpec,
    };
    use enteliscript_types::Result;
    use enteliscript_types::RecordingSink;
    use enteliscript_ui::CommandInput;

    fn blocking_dispatch(
        name: &str,
        handler: Handler,
        line: &str,
    ) -> (Invocation, Arc<Mutex<Session>>) {
        let registry = Registry::build(vec![(
            CommandSpec::new(name, "test command").blocking(""),
            handler,
        )])
        .unwrap();
        let mut dispatcher = Dispatcher::new(registry);
        let (session, _, _) = test_session(MockRemote::new(), MockStore::new());
        let session = Arc::new(Mutex::new(session));
        let mut sink = RecordingSink::new();
        let dispatch = {
            let mut guard = session.lock().unwrap();
            dispatcher.dispatch(line, &mut guard, &mut sink)
        };
        let Dispatch::Blocking(invocation) = dispatch else {
            panic!("expected a blocking dispatch");
        };
        (invocation, session)
    }

    #[test]
    fn delivers_handler_result() {
        fn fine(_: &mut Session, _: &[ArgValue]) -> Result<CommandResult> {
            Ok(CommandResult::ok("done"))
        }
        let (invocation, session) = blocking_dispatch("slow", fine, "slow");
        let rx = run_blocking(invocation, session);
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.ok);
        assert_eq!(result.message, "done");
    }

    #[test]
    fn handler_error_arrives_as_failed_result() {
        fn broken(_: &mut Session, _: &[ArgValue]) -> Result<CommandResult> {
            Err(enteliscript_types::EnteliError::Remote("timed out".to_string()))
        }
        let (invocation, session) = blocking_dispatch("slow", broken, "slow");
        let rx = run_blocking(invocation, session);
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!result.ok);
        assert!(result.message.contains("timed out"));
    }

    #[test]
    fn panicking_handler_still_delivers_and_unlocks() {
        fn explode(_: &mut Session, _: &[ArgValue]) -> Result<CommandResult> {
            panic!("handler blew up");
        }
        let (invocation, session) = blocking_dispatch("slow", explode, "slow");

        let mut input = CommandInput::new();
        input.lock(&invocation.label);
        assert!(input.is_locked());

        let rx = run_blocking(invocation, Arc::clone(&session));
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!result.ok);
        assert!(result.message.contains("command crashed"));
        assert!(result.message.contains("handler blew up"));

        input.request_unlock();
        input.finish_unlock();
        assert!(!input.is_locked());

        // The session survives the panic and is usable again.
        let guard = session.lock().unwrap_or_else(|e| e.into_inner());
        assert!(guard.sitename.is_none());
    }
}
