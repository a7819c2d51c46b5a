//! Per-session mutable state threaded through every command invocation.

use enteliscript_client::{CredentialStore, RemoteService};

/// State owned by one interactive session.
///
/// Created once at application start with an unauthenticated remote and no
/// active site. `sitename` is set only by a successful site-selection flow
/// and is not persisted across runs; credentials alone persist, through
/// the store.
pub struct Session {
    /// Active site scoping remote queries, if one has been selected.
    pub sitename: Option<String>,
    /// Remote-service handle; owns its own authentication state.
    pub remote: Box<dyn RemoteService>,
    /// Credential persistence.
    pub store: Box<dyn CredentialStore>,
}

impl Session {
    /// Build a fresh session around the given capabilities.
    pub fn new(remote: Box<dyn RemoteService>, store: Box<dyn CredentialStore>) -> Self {
        Self {
            sitename: None,
            remote,
            store,
        }
    }
}
