//! Request building, serialization and the single blocking round trip.
//!
//! # Design
//! A `Request` is configured, sent once, and then read. It owns its target
//! URL, its transport, and after a successful `send()` the parsed `Response`.
//! Default headers are installed at construction in a fixed order
//! (`User-Agent`, `Content-Type`, `Connection`, then `Authorization` and
//! `Host` when applicable) and callers may overwrite or remove any of them.
//!
//! The body is either absent, a list of form fields joined as
//! `name=value&...`, or a raw payload. Adding data of one kind discards the
//! other kind so a request never mixes encodings.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::config::{HttpVersion, Method, RequestConfig, DEFAULT_PROXY_PORT};
use crate::error::HttpError;
use crate::headers::HeaderStore;
use crate::response::Response;
use crate::transport::{TcpTransport, Transport};
use crate::url::TargetUrl;

pub const USER_AGENT: &str = concat!("http-request/", env!("CARGO_PKG_VERSION"));

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    /// Encoded `name`/`value` pairs in insertion order.
    Form(Vec<(String, String)>),
    Raw(Vec<u8>),
}

impl Body {
    /// Wire bytes of the payload; `None` when nothing would be sent.
    fn payload(&self) -> Option<Vec<u8>> {
        let bytes = match self {
            Body::Empty => return None,
            Body::Form(fields) => fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("&")
                .into_bytes(),
            Body::Raw(data) => data.clone(),
        };
        (!bytes.is_empty()).then_some(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
}

#[derive(Debug)]
pub struct Request<T: Transport = TcpTransport> {
    url: TargetUrl,
    method: Method,
    http: HttpVersion,
    headers: HeaderStore,
    body: Body,
    user: Option<String>,
    pass: Option<String>,
    proxy: Option<Proxy>,
    timeout: Option<Duration>,
    transport: T,
    sent: bool,
    response: Option<Response>,
}

impl Request<TcpTransport> {
    /// GET over HTTP/1.1 with the default headers.
    pub fn new(url: &str) -> Result<Self, HttpError> {
        Self::with_config(url, RequestConfig::default())
    }

    pub fn with_config(url: &str, config: RequestConfig) -> Result<Self, HttpError> {
        Self::with_transport(url, config, TcpTransport::new())
    }
}

impl<T: Transport> Request<T> {
    pub fn with_transport(url: &str, config: RequestConfig, transport: T) -> Result<Self, HttpError> {
        let url = TargetUrl::parse(url)?;
        if config.proxy_host.is_none()
            && (config.proxy_port.is_some() || config.proxy_user.is_some() || config.proxy_pass.is_some())
        {
            return Err(HttpError::Config("proxy options require proxy_host".to_string()));
        }

        let mut request = Request {
            method: config.method.unwrap_or_default(),
            http: config.http.unwrap_or_default(),
            headers: HeaderStore::new(),
            body: Body::Empty,
            user: None,
            pass: None,
            proxy: None,
            timeout: config.timeout.map(Duration::from_secs),
            transport,
            sent: false,
            response: None,
            url,
        };

        request.headers.set("User-Agent", USER_AGENT);
        request.headers.set("Content-Type", "application/x-www-form-urlencoded");
        request.headers.set("Connection", "close");

        let (user, pass) = match config.user {
            Some(user) => (Some(user), config.pass),
            None => (request.url.user.clone(), request.url.password.clone()),
        };
        if let Some(user) = user {
            request.set_basic_auth(&user, pass.as_deref().unwrap_or_default());
        }

        if request.http == HttpVersion::Http11 {
            request.headers.set("Host", request.url.host.clone());
        }

        if let Some(host) = config.proxy_host {
            request.set_proxy(
                &host,
                config.proxy_port.unwrap_or(DEFAULT_PROXY_PORT),
                config.proxy_user.as_deref(),
                config.proxy_pass.as_deref(),
            );
        }
        Ok(request)
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// Switching to HTTP/1.1 installs a `Host` header if there is none.
    pub fn set_http_version(&mut self, http: HttpVersion) {
        self.http = http;
        if http == HttpVersion::Http11 && !self.headers.contains("Host") {
            self.headers.set("Host", self.url.host.clone());
        }
    }

    /// Set credentials and the matching `Authorization` header.
    ///
    /// An empty `user` makes the call a no-op: no credentials are stored, no
    /// header is installed, and any existing `Authorization` header is kept.
    pub fn set_basic_auth(&mut self, user: &str, pass: &str) {
        if user.is_empty() {
            return;
        }
        self.user = Some(user.to_string());
        self.pass = Some(pass.to_string());
        self.headers.set("Authorization", basic_credentials(user, pass));
    }

    /// Route the request through an HTTP proxy. With a non-empty `user` a
    /// `Proxy-Authorization` header is installed as well.
    pub fn set_proxy(&mut self, host: &str, port: u16, user: Option<&str>, pass: Option<&str>) {
        let user = user.filter(|u| !u.is_empty());
        if let Some(user) = user {
            self.headers
                .set("Proxy-Authorization", basic_credentials(user, pass.unwrap_or_default()));
        }
        self.proxy = Some(Proxy {
            host: host.to_string(),
            port,
            user: user.map(str::to_string),
            pass: pass.map(str::to_string),
        });
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    pub fn add_query_string(&mut self, name: &str, value: &str, preencoded: bool) {
        self.url.add_query_string(name, value, preencoded);
    }

    pub fn add_raw_query_string(&mut self, query: &str, preencoded: bool) {
        self.url.add_raw_query_string(query, preencoded);
    }

    /// Add one form field. Values that are not pre-encoded are
    /// form-url-encoded (space becomes `+`). Replaces a raw body.
    pub fn add_post_data(&mut self, name: &str, value: &str, preencoded: bool) {
        let value = if preencoded {
            value.to_string()
        } else {
            form_encode(value.as_bytes())
        };
        if !matches!(self.body, Body::Form(_)) {
            self.body = Body::Form(Vec::new());
        }
        if let Body::Form(fields) = &mut self.body {
            match fields.iter_mut().find(|(n, _)| n == name) {
                Some(field) => field.1 = value,
                None => fields.push((name.to_string(), value)),
            }
        }
    }

    /// Use `data` as the whole body, replacing any form fields.
    pub fn add_raw_post_data(&mut self, data: impl AsRef<[u8]>, preencoded: bool) {
        let data = data.as_ref();
        self.body = if preencoded {
            Body::Raw(data.to_vec())
        } else {
            Body::Raw(form_encode(data).into_bytes())
        };
    }

    pub fn clear_post_data(&mut self) {
        self.body = Body::Empty;
    }

    pub fn url(&self) -> &TargetUrl {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn http_version(&self) -> HttpVersion {
        self.http
    }

    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        let user = self.user.as_deref()?;
        Some((user, self.pass.as_deref().unwrap_or_default()))
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The request-line target: origin-form, or absolute-form through a proxy.
    pub fn request_target(&self) -> String {
        match self.proxy {
            Some(_) => self.url.absolute_uri(),
            None => self.url.path_and_query(),
        }
    }

    /// Render the complete request message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut head = format!("{} {} HTTP/{}\r\n", self.method, self.request_target(), self.http);
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }

        match self.body.payload() {
            Some(payload) => {
                head.push_str(&format!("Content-Length: {}\r\n\r\n", payload.len()));
                let mut out = head.into_bytes();
                out.extend_from_slice(&payload);
                out
            }
            None => {
                head.push_str("\r\n");
                head.into_bytes()
            }
        }
    }

    /// Host and port the transport connects to.
    pub fn connect_target(&self) -> (&str, u16) {
        match &self.proxy {
            Some(proxy) => (&proxy.host, proxy.port),
            None => (&self.url.host, self.url.port),
        }
    }

    /// Connect, write the request, read the full response and parse it.
    /// A request is single-use: a second call fails with `AlreadySent`.
    pub fn send(&mut self) -> Result<&Response, HttpError> {
        if self.sent {
            return Err(HttpError::AlreadySent);
        }
        self.sent = true;

        let message = self.serialize();
        let (host, port) = self.connect_target();
        let host = host.to_string();
        debug!(
            method = %self.method,
            host = %host,
            port,
            bytes = message.len(),
            "sending request"
        );

        self.transport.connect(&host, port, self.timeout)?;
        self.transport.write(&message)?;
        let raw = self.transport.read_all()?;
        debug!(bytes = raw.len(), "response received");

        let response = Response::parse(&raw)?;
        Ok(self.response.insert(response))
    }

    /// The parsed response; `NotSent` until `send()` has succeeded.
    pub fn response(&self) -> Result<&Response, HttpError> {
        self.response.as_ref().ok_or(HttpError::NotSent)
    }

    pub fn response_code(&self) -> Result<u16, HttpError> {
        Ok(self.response()?.status_code())
    }

    pub fn response_header(&self, name: &str) -> Result<Option<&str>, HttpError> {
        Ok(self.response()?.header(name))
    }

    pub fn response_headers(&self) -> Result<&HeaderStore, HttpError> {
        Ok(self.response()?.headers())
    }

    pub fn response_body(&self) -> Result<&[u8], HttpError> {
        Ok(self.response()?.body())
    }
}

fn basic_credentials(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}

fn form_encode(data: &[u8]) -> String {
    ::url::form_urlencoded::byte_serialize(data).collect()
}
