//! Error types for the HTTP request core.
//!
//! # Design
//! Transport failures carry the stage they happened at so callers can tell a
//! refused connection from a peer that hung up mid-response. Parse failures
//! only cover the structural parts of a response (separator and status line);
//! header lines without a colon and bad chunk-size lines are tolerated and
//! never reach this type.

use std::fmt;
use std::io;

use thiserror::Error;

/// The transport step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Write,
    Read,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Connect => write!(f, "connect"),
            Stage::Write => write!(f, "write"),
            Stage::Read => write!(f, "read"),
        }
    }
}

/// Errors returned by `Request` and its collaborators.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The transport failed to connect, write, or read.
    #[error("connection error during {stage}: {source}")]
    Connection {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// No blank-line separator, or the status line could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The target URL could not be parsed or has no host.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Unknown configuration key or an unparsable option value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A response accessor was used before a successful `send()`.
    #[error("no response available: request has not completed")]
    NotSent,

    /// `send()` was called on a request that already ran its round trip.
    #[error("request has already been sent")]
    AlreadySent,
}

impl HttpError {
    pub(crate) fn connection(stage: Stage, source: io::Error) -> Self {
        HttpError::Connection { stage, source }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        HttpError::MalformedResponse(msg.into())
    }
}
