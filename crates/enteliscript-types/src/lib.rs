//! Foundation types shared across the enteliscript crates.
//!
//! Holds the error enum, the BACnet object reference type, and the
//! output-sink trait the presentation layer implements.

pub mod error;
pub mod object;
pub mod sink;

pub use error::{EnteliError, Result};
pub use object::ObjectRef;
pub use sink::{OutputSink, RecordingSink, TextStyle};
