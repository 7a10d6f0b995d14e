//! Parsing of a complete, buffered HTTP/1.x response.
//!
//! # Design
//! The status line is strict: a missing separator, fewer than two tokens, a
//! first token that is not an `HTTP/` version, or a non-numeric code all fail
//! with `MalformedResponse`. Header lines are lenient: a line without a colon
//! is skipped. Headers are stored through `HeaderStore::set`, so a repeated
//! name keeps only its last value.

use std::borrow::Cow;

use tracing::debug;

use crate::chunked;
use crate::error::HttpError;
use crate::headers::HeaderStore;

const SEPARATOR: &[u8] = b"\r\n\r\n";

/// A parsed response. Built once from the raw bytes and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    protocol: String,
    status: u16,
    headers: HeaderStore,
    body: Vec<u8>,
}

impl Response {
    /// Parse `raw` as status line, headers, blank line and body. A body sent
    /// with `Transfer-Encoding: chunked` is decoded before it is stored.
    ///
    /// The header block is read as UTF-8; invalid byte sequences in header
    /// names or values are replaced with U+FFFD. The body is kept as raw bytes.
    pub fn parse(raw: &[u8]) -> Result<Self, HttpError> {
        let split = raw
            .windows(SEPARATOR.len())
            .position(|w| w == SEPARATOR)
            .ok_or_else(|| HttpError::malformed("no blank line after headers"))?;
        let head = String::from_utf8_lossy(&raw[..split]);
        let body = &raw[split + SEPARATOR.len()..];

        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap_or_default();
        let (protocol, status) = parse_status_line(status_line)?;

        let mut headers = HeaderStore::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.set(name, value.trim_start());
            }
        }

        let body = if headers.get("Transfer-Encoding") == Some("chunked") {
            chunked::decode(body)
        } else {
            body.to_vec()
        };
        debug!(status, headers = headers.len(), body_len = body.len(), "parsed response");

        Ok(Response {
            protocol,
            status,
            headers,
            body,
        })
    }

    /// Protocol token from the status line, e.g. `HTTP/1.1`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

fn parse_status_line(line: &str) -> Result<(String, u16), HttpError> {
    let mut tokens = line.split_whitespace();
    let (Some(protocol), Some(code)) = (tokens.next(), tokens.next()) else {
        return Err(HttpError::malformed(format!("status line too short: {line:?}")));
    };
    if !protocol.starts_with("HTTP/") {
        return Err(HttpError::malformed(format!("not an HTTP status line: {line:?}")));
    }
    let status = code
        .parse::<u16>()
        .map_err(|_| HttpError::malformed(format!("invalid status code: {code:?}")))?;
    Ok((protocol.to_string(), status))
}
