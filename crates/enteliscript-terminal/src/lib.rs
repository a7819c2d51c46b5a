//! Command dispatch and session-state engine for enteliscript.
//!
//! Raw input flows through [`Dispatcher::dispatch`]: tokenization with
//! shell-like quoting, registry lookup, positional argument coercion, then
//! either an in-place invocation or a [`Invocation`] handed to the caller
//! to run off the interactive thread. Every command returns a
//! [`CommandResult`] under one contract; the dispatcher interprets the
//! result's action directive and renders through an
//! [`enteliscript_types::OutputSink`].

pub mod catalog;
pub mod dispatch;
pub mod help;
pub mod history;
pub mod registry;
pub mod result;
pub mod session;
pub mod spec;
pub mod testing;

pub use dispatch::{Dispatch, Dispatcher, Invocation, Outcome, tokenize};
pub use history::History;
pub use registry::{Handler, Registry};
pub use result::{CommandAction, CommandResult};
pub use session::Session;
pub use spec::{ArgValue, CommandSpec, ParamType};
