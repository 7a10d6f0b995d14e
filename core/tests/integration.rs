//! Requests against the live mock server over real TCP.
//!
//! # Design
//! Each test starts the mock server on a random port in a background runtime
//! and drives `Request` through the default `TcpTransport`, so serialization,
//! the socket round trip and response parsing are exercised together. Chunked
//! framing is served from a canned reply because hyper lowercases header names.

use std::net::SocketAddr;
use std::time::Duration;

use http_request::{HttpError, HttpVersion, Method, Request, RequestConfig, Stage};
use mock_server::{chunked_reply, Echo, CHUNKS};

/// Start the mock server on an ephemeral port and return its address.
fn start_server() -> SocketAddr {
    spawn_listener(mock_server::run)
}

/// Start a server that answers every request with `reply` verbatim.
fn start_canned(reply: Vec<u8>) -> SocketAddr {
    spawn_listener(move |listener| mock_server::serve_canned(listener, reply))
}

fn spawn_listener<F, Fut>(serve: F) -> SocketAddr
where
    F: FnOnce(tokio::net::TcpListener) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<(), std::io::Error>>,
{
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            serve(listener).await
        })
        .unwrap();
    });
    addr
}

fn echo_of(request: &Request) -> Echo {
    serde_json::from_slice(request.response_body().unwrap()).unwrap()
}

#[test]
fn get_plain_text() {
    let addr = start_server();
    let mut req = Request::new(&format!("http://{addr}/hello")).unwrap();

    let resp = req.send().unwrap();
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.header("content-type"), Some("text/plain"));
    assert_eq!(resp.body(), b"hello");
}

#[test]
fn chunked_response_is_reassembled() {
    let addr = start_canned(chunked_reply("Transfer-Encoding"));
    let mut req = Request::new(&format!("http://{addr}/chunked")).unwrap();

    let resp = req.send().unwrap();
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.header("Transfer-Encoding"), Some("chunked"));
    assert_eq!(resp.text(), CHUNKS.concat());
}

#[test]
fn lowercase_transfer_encoding_leaves_body_raw() {
    let reply = chunked_reply("transfer-encoding");
    let raw_body = reply[reply.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4..].to_vec();
    let addr = start_canned(reply);
    let mut req = Request::new(&format!("http://{addr}/chunked")).unwrap();

    let resp = req.send().unwrap();
    assert_eq!(resp.header("transfer-encoding"), Some("chunked"));
    assert_eq!(resp.header("Transfer-Encoding"), None);
    assert_eq!(resp.body(), raw_body.as_slice());
}

#[test]
fn chunked_body_matches_reference_client() {
    let addr = start_canned(chunked_reply("Transfer-Encoding"));
    let url = format!("http://{addr}/chunked");

    let mut reference = ureq::get(&url).call().unwrap();
    let expected = reference.body_mut().read_to_string().unwrap();

    let mut req = Request::new(&url).unwrap();
    req.send().unwrap();
    assert_eq!(req.response_body().unwrap(), expected.as_bytes());
}

#[test]
fn http10_request_reads_until_close() {
    let addr = start_server();
    let config = RequestConfig {
        http: Some(HttpVersion::Http10),
        ..Default::default()
    };
    let mut req = Request::with_config(&format!("http://{addr}/chunked"), config).unwrap();
    assert!(req.headers().get("Host").is_none());

    req.send().unwrap();
    assert_eq!(req.response_code().unwrap(), 200);
    assert_eq!(req.response_body().unwrap(), CHUNKS.concat().as_bytes());
}

#[test]
fn protected_rejects_missing_credentials() {
    let addr = start_server();
    let mut req = Request::new(&format!("http://{addr}/protected")).unwrap();

    req.send().unwrap();
    assert_eq!(req.response_code().unwrap(), 401);
    assert!(req.response_header("www-authenticate").unwrap().is_some());
}

#[test]
fn protected_accepts_configured_credentials() {
    let addr = start_server();
    let config = RequestConfig::from_pairs([("user", "user"), ("pass", "pass")]).unwrap();
    let mut req = Request::with_config(&format!("http://{addr}/protected"), config).unwrap();

    req.send().unwrap();
    assert_eq!(req.response_code().unwrap(), 200);
    assert_eq!(req.response_body().unwrap(), b"welcome");
}

#[test]
fn protected_accepts_url_credentials() {
    let addr = start_server();
    let mut req = Request::new(&format!("http://user:pass@{addr}/protected")).unwrap();

    req.send().unwrap();
    assert_eq!(req.response_code().unwrap(), 200);
}

#[test]
fn form_post_is_received_intact() {
    let addr = start_server();
    let config = RequestConfig::from_json(r#"{"method": "POST", "timeout": 5}"#).unwrap();
    let mut req = Request::with_config(&format!("http://{addr}/echo"), config).unwrap();
    req.add_post_data("a", "1", true);
    req.add_post_data("b", "x y", false);

    req.send().unwrap();
    let echo = echo_of(&req);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, "a=1&b=x+y");
    assert_eq!(echo.headers["content-length"], "9");
    assert_eq!(echo.headers["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(echo.headers["connection"], "close");
}

#[test]
fn raw_put_with_custom_headers() {
    let addr = start_server();
    let mut req = Request::new(&format!("http://{addr}/echo")).unwrap();
    req.set_method(Method::Put);
    req.add_header("Content-Type", "application/json");
    req.add_header("X-Trace", "abc123");
    req.add_raw_post_data(r#"{"k":"v"}"#, true);

    req.send().unwrap();
    let echo = echo_of(&req);
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.body, r#"{"k":"v"}"#);
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.headers["x-trace"], "abc123");
}

#[test]
fn query_string_reaches_server() {
    let addr = start_server();
    let mut req = Request::new(&format!("http://{addr}/echo?page=1")).unwrap();
    req.add_query_string("q", "rust lang", false);

    req.send().unwrap();
    assert_eq!(echo_of(&req).query.as_deref(), Some("page=1&q=rust%20lang"));
}

#[test]
fn head_request_has_empty_body() {
    let addr = start_server();
    let mut req = Request::new(&format!("http://{addr}/echo")).unwrap();
    req.set_method(Method::Head);

    req.send().unwrap();
    assert_eq!(req.response_code().unwrap(), 200);
    assert!(req.response_body().unwrap().is_empty());
}

#[test]
fn proxy_receives_absolute_uri() {
    let addr = start_server();
    let config = RequestConfig {
        proxy_host: Some(addr.ip().to_string()),
        proxy_port: Some(addr.port()),
        proxy_user: Some("user".to_string()),
        proxy_pass: Some("pass".to_string()),
        ..Default::default()
    };
    let mut req = Request::with_config("http://origin.example/echo?q=1", config).unwrap();

    req.send().unwrap();
    let echo = echo_of(&req);
    assert_eq!(echo.uri, "http://origin.example/echo?q=1");
    assert_eq!(echo.headers["host"], "origin.example");
    assert_eq!(echo.headers["proxy-authorization"], "Basic dXNlcjpwYXNz");
}

#[test]
fn refused_connection_is_reported() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut req = Request::new(&format!("http://{addr}/hello")).unwrap();
    req.set_timeout(Some(Duration::from_secs(2)));
    let err = req.send().unwrap_err();
    assert!(matches!(err, HttpError::Connection { stage: Stage::Connect, .. }));
    assert!(matches!(req.response_code(), Err(HttpError::NotSent)));
}
