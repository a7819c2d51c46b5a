//! enteliWEB API client and supporting utilities.
//!
//! Exposes the [`RemoteService`] capability the command catalog is written
//! against, a concrete [`EnteliwebClient`] speaking plain HTTP/1.1, the
//! [`CredentialStore`] capability with a JSON-file implementation, and the
//! CSV row stream used for batch property writes.

pub mod config;
pub mod csv;
pub mod enteliweb;
pub mod http;
pub mod remote;

pub use config::{CredentialStore, JsonConfigStore};
pub use csv::{CsvRow, CsvRows};
pub use enteliweb::EnteliwebClient;
pub use remote::RemoteService;
