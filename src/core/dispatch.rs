use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Version};
use std::fmt::Write as _;

/// Everything kept from one response: the status, a raw dump for the operator, and the body.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub status: StatusCode,
    pub raw: String,
    pub body: Vec<u8>,
}

impl CapturedResponse {
    pub fn new(status: StatusCode, version: Version, headers: &HeaderMap, body: Vec<u8>) -> Self {
        let raw = dump_response(status, version, headers, &body);
        Self { status, raw, body }
    }

    /// Status line as printed after each request, e.g. `200 OK`.
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }
}

/// Renders the response the way it came over the wire: status line, headers, blank line, body.
pub fn dump_response(
    status: StatusCode,
    version: Version,
    headers: &HeaderMap,
    body: &[u8],
) -> String {
    let mut raw = String::new();
    let reason = status.canonical_reason().unwrap_or("");
    let _ = write!(raw, "{:?} {} {}\r\n", version, status.as_u16(), reason);
    for (name, value) in headers {
        let _ = write!(
            raw,
            "{}: {}\r\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    raw.push_str("\r\n");
    raw.push_str(&String::from_utf8_lossy(body));
    raw
}
