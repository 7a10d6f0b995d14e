//! Byte transport between a request and its peer.
//!
//! # Design
//! `Request` only needs three blocking steps: connect, write everything, and
//! read until the peer closes. Keeping them behind a trait lets tests swap in
//! an in-memory peer and keeps the protocol code free of socket handling.
//! The optional timeout bounds connection establishment only; reads block
//! until EOF.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{HttpError, Stage};

pub trait Transport {
    fn connect(&mut self, host: &str, port: u16, timeout: Option<Duration>) -> Result<(), HttpError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), HttpError>;

    /// Read the complete response, up to the peer closing the connection.
    fn read_all(&mut self) -> Result<Vec<u8>, HttpError>;
}

/// Blocking TCP transport over `std::net::TcpStream`.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self, stage: Stage) -> Result<&mut TcpStream, HttpError> {
        self.stream
            .as_mut()
            .ok_or_else(|| HttpError::connection(stage, io::Error::from(io::ErrorKind::NotConnected)))
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, host: &str, port: u16, timeout: Option<Duration>) -> Result<(), HttpError> {
        // url hosts keep the brackets around IPv6 literals
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| HttpError::connection(Stage::Connect, e))?;

        let mut last_err = io::Error::new(io::ErrorKind::NotFound, format!("{host} resolved to no addresses"));
        for addr in addrs {
            let attempt = match timeout {
                Some(limit) => TcpStream::connect_timeout(&addr, limit),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_err = e;
                }
            }
        }
        Err(HttpError::connection(Stage::Connect, last_err))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        let stream = self.stream(Stage::Write)?;
        stream
            .write_all(bytes)
            .and_then(|()| stream.flush())
            .map_err(|e| HttpError::connection(Stage::Write, e))
    }

    fn read_all(&mut self) -> Result<Vec<u8>, HttpError> {
        let stream = self.stream(Stage::Read)?;
        let mut buf = Vec::new();
        stream
            .read_to_end(&mut buf)
            .map_err(|e| HttpError::connection(Stage::Read, e))?;
        Ok(buf)
    }
}
