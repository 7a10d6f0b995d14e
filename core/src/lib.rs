//! Minimal blocking HTTP/1.x client core.
//!
//! # Overview
//! Builds a request message from a method, target URL, headers and optional
//! body, sends it over a `Transport`, and parses the raw reply into a status
//! code, an ordered header set and a body, decoding chunked transfer-encoding
//! when the response declares it.
//!
//! # Design
//! - `Request` is single-use: configure, `send()` once, then read the response.
//! - Socket work sits behind the `Transport` trait; `TcpTransport` is the
//!   default and tests plug in an in-memory peer.
//! - Header names are matched case-sensitively and each name holds one value.
//! - No redirects, retries, keep-alive, TLS or streaming bodies.

pub mod chunked;
pub mod config;
pub mod error;
pub mod headers;
pub mod request;
pub mod response;
pub mod transport;
pub mod url;

pub use config::{HttpVersion, Method, RequestConfig};
pub use error::{HttpError, Stage};
pub use headers::HeaderStore;
pub use request::{Body, Proxy, Request};
pub use response::Response;
pub use transport::{TcpTransport, Transport};
pub use crate::url::TargetUrl;
