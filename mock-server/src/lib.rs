use std::{collections::BTreeMap, convert::Infallible};

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use futures_util::stream;
use serde::{Deserialize, Serialize};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// `Authorization` value accepted by `/protected` (`user:pass`).
pub const BASIC_CREDENTIALS: &str = "Basic dXNlcjpwYXNz";

/// Pieces streamed by `/chunked`, one chunk each.
pub const CHUNKS: [&str; 3] = ["Wiki", "pedia", " in chunks"];

/// Everything `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub uri: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/chunked", get(chunked))
        .route("/protected", get(protected))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Chunk-encoded reply carrying `CHUNKS`, with the framing header name
/// spelled exactly as `transfer_encoding`. hyper always writes lowercase
/// header names, so exact-case framing needs a hand-written reply.
pub fn chunked_reply(transfer_encoding: &str) -> Vec<u8> {
    let mut reply = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n{transfer_encoding}: chunked\r\n\r\n"
    );
    for chunk in CHUNKS {
        reply.push_str(&format!("{:X}\r\n{chunk}\r\n", chunk.len()));
    }
    reply.push_str("0\r\n\r\n");
    reply.into_bytes()
}

/// Answer every connection with `reply` byte for byte, then close it.
pub async fn serve_canned(listener: TcpListener, reply: Vec<u8>) -> Result<(), std::io::Error> {
    loop {
        let (mut socket, peer) = listener.accept().await?;
        let reply = reply.clone();
        tokio::spawn(async move {
            if let Err(e) = answer(&mut socket, &reply).await {
                tracing::debug!(%peer, error = %e, "canned reply failed");
            }
        });
    }
}

/// Read the request head, write the reply, shut down the write side.
async fn answer(socket: &mut TcpStream, reply: &[u8]) -> Result<(), std::io::Error> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    socket.write_all(reply).await?;
    socket.shutdown().await
}

async fn hello() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "hello")
}

async fn chunked() -> Response {
    let pieces = stream::iter(CHUNKS.map(Ok::<_, Infallible>));
    ([(header::CONTENT_TYPE, "text/plain")], Body::from_stream(pieces)).into_response()
}

async fn protected(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == BASIC_CREDENTIALS);
    if authorized {
        return "welcome".into_response();
    }
    tracing::debug!("rejecting request without valid basic credentials");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"mock\"")],
        "unauthorized",
    )
        .into_response()
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        uri: uri.to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
