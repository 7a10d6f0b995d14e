//! Request options and the closed method/version enums.
//!
//! # Design
//! Every recognized option has its own field. String-keyed input (a JSON
//! document or key/value pairs) goes through `set`, which matches each key
//! explicitly and rejects anything it does not know, so a typo like
//! `proxy_hots` fails loudly instead of being ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HttpError;

/// Proxy port used when a proxy host is configured without one.
pub const DEFAULT_PROXY_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Trace,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            other => Err(HttpError::Config(format!("unsupported method: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HttpVersion {
    #[serde(rename = "1.0")]
    Http10,
    #[default]
    #[serde(rename = "1.1")]
    Http11,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "1.0",
            HttpVersion::Http11 => "1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVersion {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(HttpVersion::Http10),
            "1.1" => Ok(HttpVersion::Http11),
            other => Err(HttpError::Config(format!("unsupported http version: {other}"))),
        }
    }
}

/// Options applied when a `Request` is created. Unset fields keep the
/// request defaults (GET over HTTP/1.1, no auth, no proxy, no timeout).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestConfig {
    pub method: Option<Method>,
    pub http: Option<HttpVersion>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_user: Option<String>,
    pub proxy_pass: Option<String>,
    /// Connect timeout in seconds.
    pub timeout: Option<u64>,
}

impl RequestConfig {
    /// Decode a JSON object such as `{"method": "POST", "timeout": 5}`.
    pub fn from_json(text: &str) -> Result<Self, HttpError> {
        serde_json::from_str(text).map_err(|e| HttpError::Config(e.to_string()))
    }

    /// Build from string pairs, applying each through `set`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, HttpError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = RequestConfig::default();
        for (key, value) in pairs {
            config.set(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }

    /// Apply one option by name. Unknown keys and unparsable values fail.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), HttpError> {
        match key {
            "method" => self.method = Some(value.parse()?),
            "http" => self.http = Some(value.parse()?),
            "user" => self.user = Some(value.to_string()),
            "pass" => self.pass = Some(value.to_string()),
            "proxy_host" => self.proxy_host = Some(value.to_string()),
            "proxy_port" => self.proxy_port = Some(parse_number(key, value)?),
            "proxy_user" => self.proxy_user = Some(value.to_string()),
            "proxy_pass" => self.proxy_pass = Some(value.to_string()),
            "timeout" => self.timeout = Some(parse_number(key, value)?),
            other => return Err(HttpError::Config(format!("unknown option: {other}"))),
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, HttpError> {
    value
        .parse()
        .map_err(|_| HttpError::Config(format!("{key}: expected a number, got {value:?}")))
}
