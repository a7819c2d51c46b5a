//! Scriptable remote-service and credential-store doubles.
//!
//! Shared by the unit tests here and by downstream crates that need a
//! session without a live server, so this module is always compiled.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use enteliscript_client::{CredentialStore, RemoteService};
use enteliscript_types::error::{EnteliError, Result};
use enteliscript_types::ObjectRef;

use crate::session::Session;

/// Scripted answers and a call log for a [`MockRemote`].
#[derive(Debug, Default)]
pub struct MockState {
    pub login_ok: bool,
    pub authenticated: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sites: Vec<String>,
    pub devices: Vec<String>,
    pub objects: Vec<String>,
    pub properties: BTreeMap<String, String>,
    pub write_ok: bool,
    pub csv_rows: Vec<(String, bool)>,
    /// One entry per trait call, in order.
    pub calls: Vec<String>,
}

/// Remote-service double backed by shared scripted state.
///
/// Clones share the same state, so a test can keep a handle while the
/// session owns a boxed copy.
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    pub state: Arc<Mutex<MockState>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The call log so far.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

impl RemoteService for MockRemote {
    fn login(&mut self) -> bool {
        let mut state = self.lock();
        state.calls.push("login".to_string());
        let ok = state.login_ok;
        state.authenticated = ok;
        ok
    }

    fn sites(&mut self) -> Vec<String> {
        let mut state = self.lock();
        state.calls.push("sites".to_string());
        state.sites.clone()
    }

    fn devices(&mut self, site: &str) -> Vec<String> {
        let mut state = self.lock();
        state.calls.push(format!("devices {site}"));
        state.devices.clone()
    }

    fn objects(&mut self, site: &str, device: &str) -> Vec<String> {
        let mut state = self.lock();
        state.calls.push(format!("objects {site}/{device}"));
        state.objects.clone()
    }

    fn properties(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
    ) -> BTreeMap<String, String> {
        let mut state = self.lock();
        state.calls.push(format!("properties {site}/{device}/{object}"));
        state.properties.clone()
    }

    fn write_property(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
        property: &str,
        value: &str,
    ) -> bool {
        let mut state = self.lock();
        state
            .calls
            .push(format!("write_property {site}/{device}/{object}/{property}={value}"));
        state.write_ok
    }

    fn write_properties(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
        properties: &BTreeMap<String, String>,
    ) -> bool {
        let mut state = self.lock();
        state.calls.push(format!(
            "write_properties {site}/{device}/{object} ({} values)",
            properties.len()
        ));
        state.write_ok
    }

    fn write_properties_from_file<'a>(
        &'a mut self,
        path: &Path,
    ) -> Box<dyn Iterator<Item = (String, bool)> + 'a> {
        let mut state = self.lock();
        state
            .calls
            .push(format!("write_properties_from_file {}", path.display()));
        Box::new(state.csv_rows.clone().into_iter())
    }

    fn create_object(&mut self, site: &str, device: &str, object: &ObjectRef) -> bool {
        let mut state = self.lock();
        state.calls.push(format!("create_object {site}/{device}/{object}"));
        state.write_ok
    }

    fn delete_object(&mut self, site: &str, device: &str, object: &ObjectRef) -> bool {
        let mut state = self.lock();
        state.calls.push(format!("delete_object {site}/{device}/{object}"));
        state.write_ok
    }

    fn username(&self) -> Option<String> {
        self.lock().username.clone()
    }

    fn has_credentials(&self) -> bool {
        let state = self.lock();
        state.username.is_some() && state.password.is_some()
    }

    fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    fn set_username(&mut self, username: &str) {
        let mut state = self.lock();
        state.calls.push(format!("set_username {username}"));
        state.username = Some(username.to_string());
    }

    fn set_password(&mut self, password: &str) {
        let mut state = self.lock();
        state.calls.push("set_password".to_string());
        state.password = Some(password.to_string());
    }
}

/// Backing state for a [`MockStore`].
#[derive(Debug, Default)]
pub struct StoreState {
    pub username: Option<String>,
    pub password: Option<String>,
    pub values: BTreeMap<String, String>,
    /// When set, every write fails.
    pub fail_writes: bool,
}

/// In-memory credential store double; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MockStore {
    fn credentials(&self) -> (Option<String>, Option<String>) {
        let state = self.lock();
        (state.username.clone(), state.password.clone())
    }

    fn set_credentials(&mut self, username: &str, password: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(EnteliError::Config("store is read-only".to_string()));
        }
        state.username = Some(username.to_string());
        state.password = Some(password.to_string());
        Ok(())
    }

    fn value(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(EnteliError::Config("store is read-only".to_string()));
        }
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Build a session over the given doubles, handing back handles that share
/// their state for scripting and assertions.
pub fn test_session(remote: MockRemote, store: MockStore) -> (Session, MockRemote, MockStore) {
    let session = Session::new(Box::new(remote.clone()), Box::new(store.clone()));
    (session, remote, store)
}
