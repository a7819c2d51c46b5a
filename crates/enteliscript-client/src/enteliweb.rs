//! Concrete [`RemoteService`] speaking to an enteliWEB server.
//!
//! Endpoints follow the BACnet data hierarchy: `.bacnet` lists sites, then
//! one path segment each for site, device, object, and property. Responses
//! are JSON. Authentication is a session cookie obtained from the login
//! endpoint. Every transport failure is logged and degraded to `false` or
//! an empty collection so the interactive surface never sees an error
//! escape this boundary.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Value, json};

use enteliscript_types::ObjectRef;
use enteliscript_types::error::Result;

use crate::csv::CsvRows;
use crate::http::{self, HttpResponse};
use crate::remote::RemoteService;

/// Root of the enteliWEB REST API.
const API_BASE: &str = "/enteliweb/api";

/// Session-based enteliWEB API client.
#[derive(Debug)]
pub struct EnteliwebClient {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    session_cookie: Option<String>,
}

impl EnteliwebClient {
    /// Create an unauthenticated client for a server.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: None,
            password: None,
            session_cookie: None,
        }
    }

    /// Create a client with credentials already loaded.
    pub fn with_credentials(
        host: &str,
        port: u16,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        let mut client = Self::new(host, port);
        client.username = username;
        client.password = password;
        client
    }

    fn extra_headers(&self) -> Vec<(String, String)> {
        match &self.session_cookie {
            Some(cookie) => vec![("Cookie".to_string(), cookie.clone())],
            None => Vec::new(),
        }
    }

    fn call(&self, method: &str, path: &str, body: Option<&Value>) -> Result<HttpResponse> {
        let encoded = body.map(|v| v.to_string());
        http::request(
            method,
            &self.host,
            self.port,
            path,
            &self.extra_headers(),
            encoded.as_deref().map(str::as_bytes),
        )
    }

    /// GET a path and decode the JSON body, absorbing all failures.
    fn get_json(&self, path: &str) -> Option<Value> {
        match self.call("GET", path, None) {
            Ok(resp) if resp.is_success() => match serde_json::from_slice(&resp.body) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("GET {path}: bad JSON: {e}");
                    None
                },
            },
            Ok(resp) => {
                log::warn!("GET {path}: HTTP {}", resp.status);
                None
            },
            Err(e) => {
                log::warn!("GET {path}: {e}");
                None
            },
        }
    }

    /// Issue a write-style request and reduce it to a success flag.
    fn call_ok(&self, method: &str, path: &str, body: Option<&Value>) -> bool {
        match self.call(method, path, body) {
            Ok(resp) if resp.is_success() => true,
            Ok(resp) => {
                log::warn!("{method} {path}: HTTP {}", resp.status);
                false
            },
            Err(e) => {
                log::warn!("{method} {path}: {e}");
                false
            },
        }
    }

    fn site_path(site: &str) -> String {
        format!("{API_BASE}/.bacnet/{}", encode_segment(site))
    }

    fn device_path(site: &str, device: &str) -> String {
        format!("{}/{}", Self::site_path(site), encode_segment(device))
    }

    fn object_path(site: &str, device: &str, object: &ObjectRef) -> String {
        format!(
            "{}/{}",
            Self::device_path(site, device),
            encode_segment(&object.to_string())
        )
    }
}

impl RemoteService for EnteliwebClient {
    fn login(&mut self) -> bool {
        let (Some(username), Some(password)) = (self.username.clone(), self.password.clone())
        else {
            log::warn!("login attempted without stored credentials");
            return false;
        };
        let body = json!({ "username": username, "password": password });
        match self.call("POST", &format!("{API_BASE}/login"), Some(&body)) {
            Ok(resp) if resp.is_success() => {
                let cookie = resp
                    .header("set-cookie")
                    .and_then(|c| c.split(';').next())
                    .map(str::to_string);
                match cookie {
                    Some(cookie) => {
                        log::info!("logged in as {username}");
                        self.session_cookie = Some(cookie);
                        true
                    },
                    None => {
                        log::warn!("login succeeded but no session cookie was issued");
                        false
                    },
                }
            },
            Ok(resp) => {
                log::warn!("login failed: HTTP {}", resp.status);
                false
            },
            Err(e) => {
                log::warn!("login failed: {e}");
                false
            },
        }
    }

    fn sites(&mut self) -> Vec<String> {
        self.get_json(&format!("{API_BASE}/.bacnet"))
            .map(|v| names_from(&v))
            .unwrap_or_default()
    }

    fn devices(&mut self, site: &str) -> Vec<String> {
        self.get_json(&Self::site_path(site))
            .map(|v| names_from(&v))
            .unwrap_or_default()
    }

    fn objects(&mut self, site: &str, device: &str) -> Vec<String> {
        self.get_json(&Self::device_path(site, device))
            .map(|v| names_from(&v))
            .unwrap_or_default()
    }

    fn properties(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
    ) -> BTreeMap<String, String> {
        let Some(Value::Object(map)) = self.get_json(&Self::object_path(site, device, object))
        else {
            return BTreeMap::new();
        };
        map.iter()
            .filter(|(k, _)| !k.starts_with('$'))
            .map(|(k, v)| (k.clone(), render_value(v)))
            .collect()
    }

    fn write_property(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
        property: &str,
        value: &str,
    ) -> bool {
        let path = format!(
            "{}/{}",
            Self::object_path(site, device, object),
            encode_segment(property)
        );
        let body = json!({ "value": value });
        let ok = self.call_ok("PUT", &path, Some(&body));
        log::info!(
            "write {site}/{device}/{object}/{property} = '{value}': {}",
            if ok { "ok" } else { "failed" }
        );
        ok
    }

    fn write_properties(
        &mut self,
        site: &str,
        device: &str,
        object: &ObjectRef,
        properties: &BTreeMap<String, String>,
    ) -> bool {
        // Property names key the payload as strings.
        let body: Value = properties
            .iter()
            .map(|(name, value)| (name.clone(), json!({ "value": value })))
            .collect::<serde_json::Map<String, Value>>()
            .into();
        self.call_ok("PUT", &Self::object_path(site, device, object), Some(&body))
    }

    fn write_properties_from_file<'a>(
        &'a mut self,
        path: &Path,
    ) -> Box<dyn Iterator<Item = (String, bool)> + 'a> {
        let rows = match CsvRows::open(path) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("batch write from {}: {e}", path.display());
                return Box::new(std::iter::empty());
            },
        };
        Box::new(rows.map(move |row| match row {
            Ok(row) => {
                let ok = self.write_property(
                    &row.site,
                    &row.device,
                    &row.object,
                    &row.property,
                    &row.value,
                );
                (row.property_path(), ok)
            },
            Err(e) => (e.to_string(), false),
        }))
    }

    fn create_object(&mut self, site: &str, device: &str, object: &ObjectRef) -> bool {
        self.call_ok(
            "PUT",
            &Self::object_path(site, device, object),
            Some(&json!({})),
        )
    }

    fn delete_object(&mut self, site: &str, device: &str, object: &ObjectRef) -> bool {
        self.call_ok("DELETE", &Self::object_path(site, device, object), None)
    }

    fn username(&self) -> Option<String> {
        self.username.clone()
    }

    fn has_credentials(&self) -> bool {
        matches!((&self.username, &self.password), (Some(u), Some(p)) if !u.is_empty() && !p.is_empty())
    }

    fn is_authenticated(&self) -> bool {
        self.session_cookie.is_some()
    }

    fn set_username(&mut self, username: &str) {
        self.username = Some(username.to_string());
        // A credential change invalidates the current session.
        self.session_cookie = None;
    }

    fn set_password(&mut self, password: &str) {
        self.password = Some(password.to_string());
        self.session_cookie = None;
    }
}

/// Extract a list of names from either a JSON array (of strings or of
/// objects carrying `name`/`displayName`) or an object's keys.
fn names_from(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map
                    .get("name")
                    .or_else(|| map.get("displayName"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .keys()
            .filter(|k| !k.starts_with('$'))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Render a JSON property value as display text.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(map) => match map.get("value") {
            Some(inner) => render_value(inner),
            None => value.to_string(),
        },
        Value::Array(_) => value.to_string(),
    }
}

/// Percent-encode one path segment (RFC 3986 unreserved set kept as-is).
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            },
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_client_is_unauthenticated() {
        let client = EnteliwebClient::new("localhost", 80);
        assert!(!client.is_authenticated());
        assert!(!client.has_credentials());
        assert_eq!(client.username(), None);
    }

    #[test]
    fn has_credentials_requires_both_non_empty() {
        let mut client = EnteliwebClient::new("localhost", 80);
        client.set_username("alice");
        assert!(!client.has_credentials());
        client.set_password("hunter2");
        assert!(client.has_credentials());
        client.set_password("");
        assert!(!client.has_credentials());
    }

    #[test]
    fn credential_change_drops_session() {
        let mut client = EnteliwebClient::new("localhost", 80);
        client.session_cookie = Some("sid=abc".to_string());
        client.set_username("bob");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn login_without_credentials_makes_no_network_call() {
        // Port 1 would refuse; an attempt would at least take a syscall.
        // The early return makes this instant and false.
        let mut client = EnteliwebClient::new("127.0.0.1", 1);
        assert!(!client.login());
    }

    #[test]
    fn login_against_local_listener() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).unwrap();
            let resp = "HTTP/1.1 200 OK\r\nSet-Cookie: sessionid=xyz; Path=/\r\nContent-Length: 2\r\n\r\n{}";
            stream.write_all(resp.as_bytes()).unwrap();
        });

        let mut client =
            EnteliwebClient::with_credentials("127.0.0.1", port, Some("u".into()), Some("p".into()));
        assert!(client.login());
        assert!(client.is_authenticated());
        handle.join().unwrap();
    }

    #[test]
    fn unreachable_server_degrades_to_empty() {
        let mut client = EnteliwebClient::new("127.0.0.1", 1);
        assert!(client.sites().is_empty());
        assert!(client.devices("Main").is_empty());
        assert!(client.properties("Main", "dev1", &ObjectRef::new("AV", 1)).is_empty());
        assert!(!client.write_property("Main", "dev1", &ObjectRef::new("AV", 1), "p", "v"));
    }

    #[test]
    fn names_from_string_array() {
        let v = json!(["MainSite", "Annex"]);
        assert_eq!(names_from(&v), vec!["MainSite", "Annex"]);
    }

    #[test]
    fn names_from_object_array() {
        let v = json!([{ "name": "dev1" }, { "displayName": "dev2" }, 42]);
        assert_eq!(names_from(&v), vec!["dev1", "dev2"]);
    }

    #[test]
    fn names_from_object_keys_skip_meta() {
        let v = json!({ "$base": "x", "AV1": {}, "BV2": {} });
        assert_eq!(names_from(&v), vec!["AV1", "BV2"]);
    }

    #[test]
    fn render_value_unwraps_value_field() {
        assert_eq!(render_value(&json!({ "value": 72.5 })), "72.5");
        assert_eq!(render_value(&json!("on")), "on");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(null)), "");
    }

    #[test]
    fn encode_segment_escapes_reserved() {
        assert_eq!(encode_segment("Main Site"), "Main%20Site");
        assert_eq!(encode_segment("present-value"), "present-value");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn object_paths_compose() {
        let path = EnteliwebClient::object_path("Main", "dev1", &ObjectRef::new("AV", 3));
        assert_eq!(path, "/enteliweb/api/.bacnet/Main/dev1/AV3");
    }

    #[test]
    fn batch_write_from_missing_file_is_empty() {
        let mut client = EnteliwebClient::new("127.0.0.1", 1);
        let mut it = client.write_properties_from_file(Path::new("/no/such/file.csv"));
        assert!(it.next().is_none());
    }
}
