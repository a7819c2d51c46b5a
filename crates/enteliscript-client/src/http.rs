//! Minimal HTTP/1.1 client over `std::net::TcpStream`.
//!
//! Just enough protocol for the enteliWEB REST endpoints: one request per
//! connection (`Connection: close`), optional JSON body, chunked and
//! content-length bodies on the way back. No TLS; enteliWEB installs the
//! client targets speak plain HTTP on the local network.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use enteliscript_types::error::{EnteliError, Result};

/// Maximum response body size (4 MB).
const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP read timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// A parsed HTTP response.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code (e.g. 200, 404).
    pub status: u16,
    /// Response headers as (lowercased name, value) pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as lossily-decoded UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Perform one HTTP/1.1 request and read the full response.
///
/// `extra_headers` are sent verbatim after the standard set; `body`, when
/// present, is sent as `application/json` with a matching content length.
pub fn request(
    method: &str,
    host: &str,
    port: u16,
    path: &str,
    extra_headers: &[(String, String)],
    body: Option<&[u8]>,
) -> Result<HttpResponse> {
    let mut stream = tcp_connect(host, port)?;
    send_request(&mut stream, method, host, port, path, extra_headers, body)?;
    let raw = read_response(&mut stream)?;
    parse_response(&raw)
}

/// Open a TCP connection with a connect timeout.
fn tcp_connect(host: &str, port: u16) -> Result<TcpStream> {
    let addr = format!("{host}:{port}")
        .to_socket_addrs()
        .map_err(|e| EnteliError::Remote(format!("DNS resolution failed: {e}")))?
        .next()
        .ok_or_else(|| EnteliError::Remote(format!("no addresses for {host}:{port}")))?;

    let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
        .map_err(|e| EnteliError::Remote(format!("TCP connect failed: {e}")))?;

    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .map_err(|e| EnteliError::Remote(format!("set read timeout: {e}")))?;

    Ok(stream)
}

/// Assemble and send the request head plus optional body.
fn send_request(
    stream: &mut impl Write,
    method: &str,
    host: &str,
    port: u16,
    path: &str,
    extra_headers: &[(String, String)],
    body: Option<&[u8]>,
) -> Result<()> {
    let host_header = if port == 80 {
        host.to_string()
    } else {
        format!("{host}:{port}")
    };

    let mut head = format!(
        "{method} {path} HTTP/1.1\r\n\
         Host: {host_header}\r\n\
         User-Agent: enteliscript/0.1\r\n\
         Accept: application/json\r\n\
         Connection: close\r\n"
    );
    for (name, value) in extra_headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    if let Some(body) = body {
        head.push_str("Content-Type: application/json\r\n");
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("\r\n");

    stream
        .write_all(head.as_bytes())
        .map_err(|e| EnteliError::Remote(format!("send request: {e}")))?;
    if let Some(body) = body {
        stream
            .write_all(body)
            .map_err(|e| EnteliError::Remote(format!("send body: {e}")))?;
    }
    Ok(())
}

/// Read the entire response until EOF or until the read timeout fires.
fn read_response(stream: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > MAX_BODY_SIZE + 4096 {
                    return Err(EnteliError::Remote("response too large".to_string()));
                }
                buf.extend_from_slice(&chunk[..n]);
            },
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                break;
            },
            Err(e) => {
                return Err(EnteliError::Remote(format!("read response: {e}")));
            },
        }
    }
    Ok(buf)
}

/// Parse raw bytes into status code, headers, and body.
fn parse_response(data: &[u8]) -> Result<HttpResponse> {
    let header_end = find_subsequence(data, b"\r\n\r\n").ok_or_else(|| {
        EnteliError::Remote("malformed HTTP response: no header terminator".to_string())
    })?;

    let header_bytes = &data[..header_end];
    let body_start = header_end + 4;

    let header_str = std::str::from_utf8(header_bytes)
        .map_err(|_| EnteliError::Remote("non-UTF-8 headers".to_string()))?;

    let mut lines = header_str.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| EnteliError::Remote("empty response".to_string()))?;
    let status = parse_status_line(status_line)?;

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    let raw_body = &data[body_start..];
    let body = if find_header(&headers, "transfer-encoding").is_some_and(|v| v.contains("chunked"))
    {
        decode_chunked(raw_body)?
    } else if let Some(cl) = find_header(&headers, "content-length") {
        let len: usize = cl
            .parse()
            .map_err(|_| EnteliError::Remote("bad Content-Length".to_string()))?;
        if len > MAX_BODY_SIZE {
            return Err(EnteliError::Remote("response body too large".to_string()));
        }
        raw_body[..raw_body.len().min(len)].to_vec()
    } else {
        raw_body.to_vec()
    };

    if body.len() > MAX_BODY_SIZE {
        return Err(EnteliError::Remote("response body too large".to_string()));
    }

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

/// Parse the HTTP status code from the status line.
fn parse_status_line(line: &str) -> Result<u16> {
    // Expected: "HTTP/1.x NNN ..."
    let parts: Vec<&str> = line.splitn(3, ' ').collect();
    if parts.len() < 2 {
        return Err(EnteliError::Remote(format!("bad status line: {line}")));
    }
    parts[1]
        .parse()
        .map_err(|_| EnteliError::Remote(format!("bad status code in: {line}")))
}

/// Case-insensitive header lookup.
fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let name_lower = name.to_lowercase();
    headers
        .iter()
        .find(|(k, _)| k == &name_lower)
        .map(|(_, v)| v.as_str())
}

/// Decode a chunked transfer-encoded body.
fn decode_chunked(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut pos = 0;

    while let Some(i) = find_subsequence(&data[pos..], b"\r\n") {
        let line_end = pos + i;

        let size_str = std::str::from_utf8(&data[pos..line_end])
            .map_err(|_| EnteliError::Remote("bad chunk size".to_string()))?
            .trim();
        let size_str = size_str.split(';').next().unwrap_or("").trim();

        let chunk_size = usize::from_str_radix(size_str, 16)
            .map_err(|_| EnteliError::Remote("bad chunk size".to_string()))?;
        if chunk_size == 0 {
            break;
        }

        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + chunk_size;
        if chunk_end > data.len() {
            result.extend_from_slice(&data[chunk_start..]);
            break;
        }
        if result.len() + chunk_size > MAX_BODY_SIZE {
            return Err(EnteliError::Remote("chunked body too large".to_string()));
        }

        result.extend_from_slice(&data[chunk_start..chunk_end]);
        pos = chunk_end + 2;
    }

    Ok(result)
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_line_ok() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK").unwrap(), 200);
        assert_eq!(parse_status_line("HTTP/1.0 404 Not Found").unwrap(), 404);
    }

    #[test]
    fn parse_status_line_bad() {
        assert!(parse_status_line("garbage").is_err());
    }

    #[test]
    fn find_subsequence_works() {
        assert_eq!(find_subsequence(b"ab\r\n\r\ncd", b"\r\n\r\n"), Some(2));
        assert_eq!(find_subsequence(b"no boundary", b"\r\n\r\n"), None);
    }

    #[test]
    fn parse_response_with_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nSet-Cookie: sid=abc\r\n\r\nhellotrailing";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"hello");
        assert_eq!(resp.header("set-cookie"), Some("sid=abc"));
        assert!(resp.is_success());
    }

    #[test]
    fn parse_response_chunked() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.body, b"hello");
    }

    #[test]
    fn parse_response_without_terminator_fails() {
        assert!(parse_response(b"HTTP/1.1 200 OK\r\n").is_err());
    }

    #[test]
    fn request_against_local_listener() {
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            let req = String::from_utf8_lossy(&buf[..n]).into_owned();
            let resp = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
            stream.write_all(resp.as_bytes()).unwrap();
            stream.flush().unwrap();
            req
        });

        let resp = request(
            "POST",
            "127.0.0.1",
            port,
            "/api/login",
            &[("Cookie".to_string(), "sid=xyz".to_string())],
            Some(br#"{"username":"u"}"#),
        )
        .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.text(), "ok");

        let req = handle.join().unwrap();
        assert!(req.starts_with("POST /api/login HTTP/1.1\r\n"));
        assert!(req.contains("Cookie: sid=xyz"));
        assert!(req.contains("Content-Type: application/json"));
        assert!(req.contains(r#"{"username":"u"}"#));
    }

    #[test]
    fn connect_refused_is_remote_error() {
        // Port 1 on localhost is almost certainly closed.
        let err = request("GET", "127.0.0.1", 1, "/", &[], None).unwrap_err();
        assert_eq!(err.kind(), "remote");
    }
}
