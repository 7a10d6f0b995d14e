//! Target URL of a request.
//!
//! # Design
//! The `url` crate does the structural parse; afterwards the components are
//! kept as plain fields so the request can rebuild either an origin-form
//! (`/path?query`) or an absolute-form target. The query string is held as an
//! ordered list of already-encoded entries so callers can mix pre-encoded and
//! raw values without double encoding.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::HttpError;

/// Everything except RFC 3986 unreserved characters. Space becomes `%20`.
const RAW_URL_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode `value` the way a query-string component is encoded.
pub fn raw_url_encode(value: &str) -> String {
    utf8_percent_encode(value, RAW_URL_ENCODE).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub user: Option<String>,
    pub password: Option<String>,
    query: Vec<(String, Option<String>)>,
}

impl TargetUrl {
    pub fn parse(input: &str) -> Result<Self, HttpError> {
        let parsed = ::url::Url::parse(input).map_err(|e| HttpError::InvalidUrl(format!("{input}: {e}")))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| HttpError::InvalidUrl(format!("{input}: missing host")))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| HttpError::InvalidUrl(format!("{input}: unknown default port for {}", parsed.scheme())))?;

        let user = match parsed.username() {
            "" => None,
            name => Some(decode(name)),
        };
        let password = parsed.password().map(decode);

        let path = match parsed.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };

        let mut target = TargetUrl {
            scheme: parsed.scheme().to_string(),
            host,
            port,
            path,
            user,
            password,
            query: Vec::new(),
        };
        if let Some(query) = parsed.query() {
            target.add_raw_query_string(query, true);
        }
        Ok(target)
    }

    /// Encoded query string without the leading `?`; empty if there is none.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{name}={v}"),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Set one query parameter, overwriting an existing one in place.
    pub fn add_query_string(&mut self, name: &str, value: &str, preencoded: bool) {
        let value = if preencoded {
            value.to_string()
        } else {
            raw_url_encode(value)
        };
        match self.query.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = Some(value),
            None => self.query.push((name.to_string(), Some(value))),
        }
    }

    /// Replace the whole query string with `text` (`a=b&c=d`).
    pub fn add_raw_query_string(&mut self, text: &str, preencoded: bool) {
        self.query.clear();
        for part in text.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = match part.split_once('=') {
                Some((n, v)) if preencoded => (n, Some(v.to_string())),
                Some((n, v)) => (n, Some(raw_url_encode(v))),
                None => (part, None),
            };
            match self.query.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = value,
                None => self.query.push((name.to_string(), value)),
            }
        }
    }

    /// `scheme://host[:port]path[?query]`, with the port left out when it is 80.
    pub fn absolute_uri(&self) -> String {
        let port = if self.port != 80 {
            format!(":{}", self.port)
        } else {
            String::new()
        };
        format!("{}://{}{}{}", self.scheme, self.host, port, self.path_and_query())
    }

    /// Origin-form request target: the path plus `?query` when non-empty.
    pub fn path_and_query(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{query}", self.path)
        }
    }
}

fn decode(component: &str) -> String {
    percent_decode_str(component).decode_utf8_lossy().into_owned()
}
