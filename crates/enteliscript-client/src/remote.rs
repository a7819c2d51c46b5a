//! The remote-service capability the command catalog is written against.

use std::collections::BTreeMap;
use std::path::Path;

use enteliscript_types::ObjectRef;

/// Session-based access to an enteliWEB server.
///
/// Implementations own their authentication state (credentials, session
/// token); the dispatcher and catalog treat that state as opaque. Transient
/// transport failures must be absorbed here and surfaced as `false` or an
/// empty collection, never as a panic, so commands degrade to ordinary
/// "no data found" failures.
pub trait RemoteService: Send {
    /// Authenticate with the stored credentials. Returns success.
    fn login(&mut self) -> bool;

    /// All site names visible to the session.
    fn sites(&mut self) -> Vec<String>;

    /// Device names under a site.
    fn devices(&mut self, site: &str) -> Vec<String>;

    /// Object names exposed by a device.
    fn objects(&mut self, site: &str, device: &str) -> Vec<String>;

    /// Property name/value pairs of one object.
    fn properties(&mut self, site: &str, device: &str, object: &ObjectRef)
    -> BTreeMap<String, String>;

    /// Write a single property value. Returns success.
    fn write_property(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
        property: &str,
        value: &str,
    ) -> bool;

    /// Write several properties of one object in a single call.
    fn write_properties(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
        properties: &BTreeMap<String, String>,
    ) -> bool;

    /// Stream the rows of a batch-write CSV file, attempting one property
    /// write per row and yielding `(property path, success)` pairs.
    ///
    /// The sequence is finite, consumed once, and safe to abandon early.
    fn write_properties_from_file<'a>(
        &'a mut self,
        path: &Path,
    ) -> Box<dyn Iterator<Item = (String, bool)> + 'a>;

    /// Create an object on a device. Returns success.
    fn create_object(&mut self, site: &str, device: &str, object: &ObjectRef) -> bool;

    /// Delete an object from a device. Returns success.
    fn delete_object(&mut self, site: &str, device: &str, object: &ObjectRef) -> bool;

    /// Username the client will authenticate as, if one is set.
    fn username(&self) -> Option<String>;

    /// True if both a username and a password are set.
    fn has_credentials(&self) -> bool;

    /// True if the session holds a server-issued token.
    fn is_authenticated(&self) -> bool;

    /// Replace the username used for future logins.
    fn set_username(&mut self, username: &str);

    /// Replace the password used for future logins.
    fn set_password(&mut self, password: &str);
}
