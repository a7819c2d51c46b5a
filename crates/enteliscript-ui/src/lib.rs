//! Presentation-state widgets for the enteliscript terminal.
//!
//! Pure state machines with no rendering: the binary (or any other front
//! end) drives them from its event loop and draws from their fields.

pub mod command_input;
pub mod site_selector;

pub use command_input::{CommandInput, LockState, SPINNER_FRAMES};
pub use site_selector::SiteSelector;
