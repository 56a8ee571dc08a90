//! Integration tests for the `tiny_http` hosting adapter
//!
//! Each test binds port 0, talks raw HTTP/1.1 over a `TcpStream` and stops the server
//! afterwards.

use gyr::server::{HttpServer, ServerHandle};
use gyr::{Context, Router};
use http::StatusCode;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

fn start(router: Router, max_body_bytes: usize) -> ServerHandle {
    let handle = HttpServer::new(router.into_dispatcher())
        .with_max_body_bytes(max_body_bytes)
        .start("127.0.0.1:0")
        .unwrap();
    handle.wait_ready().unwrap();
    handle
}

fn send_raw(handle: &ServerHandle, raw: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(handle.addr()).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(raw.as_bytes()).unwrap();
    let mut buf = Vec::new();
    // A reset after the response was written still leaves the bytes read so far in `buf`.
    let _ = stream.read_to_end(&mut buf);
    let text = String::from_utf8_lossy(&buf).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((&text, ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    (status, head.to_ascii_lowercase(), body.to_owned())
}

fn get(handle: &ServerHandle, path: &str) -> (u16, String, String) {
    send_raw(
        handle,
        &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
    )
}

fn demo() -> Router {
    let mut router = Router::new();
    router.path("/hello/:name").get(|ctx: &mut Context| {
        let name = ctx.str_variable("name").unwrap_or("stranger").to_owned();
        ctx.response().header("x-greeting", "1").text(&format!("hello {name}"));
    });
    router.path("/echo").post(|ctx: &mut Context| {
        let body = ctx.body().to_vec();
        ctx.response().append_body(&body, Some("application/octet-stream"));
    });
    router.path("/query").get(|ctx: &mut Context| {
        let query = ctx.query().unwrap_or_default().to_owned();
        ctx.response().text(&query);
    });
    router.path("/boom").get(|ctx: &mut Context| {
        if ctx.path() == "/boom" {
            panic!("handler exploded");
        }
    });
    router
}

#[test]
fn test_serves_routed_request() {
    let handle = start(demo(), 1024);

    let (status, head, body) = get(&handle, "/hello/world");
    assert_eq!(status, 200);
    assert_eq!(body, "hello world");
    assert!(head.contains("x-greeting: 1"));
    assert!(head.contains("x-request-id:"));
    assert!(head.contains("content-type: text/plain"));

    handle.stop();
}

#[test]
fn test_not_found_and_method_not_allowed() {
    let handle = start(demo(), 1024);

    let (status, _, body) = get(&handle, "/nope");
    assert_eq!(status, 404);
    assert_eq!(body, "404 - Not Found");

    let (status, _, body) = get(&handle, "/echo");
    assert_eq!(status, 405);
    assert_eq!(body, "405 - Method Not Allowed");

    handle.stop();
}

#[test]
fn test_query_string_is_not_part_of_path() {
    let handle = start(demo(), 1024);
    let (status, _, body) = get(&handle, "/query?limit=10&offset=2");
    assert_eq!(status, 200);
    assert_eq!(body, "limit=10&offset=2");
    handle.stop();
}

#[test]
fn test_body_is_forwarded() {
    let handle = start(demo(), 1024);
    let (status, _, body) = send_raw(
        &handle,
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: 5\r\n\r\nabcde",
    );
    assert_eq!(status, 200);
    assert_eq!(body, "abcde");
    handle.stop();
}

#[test]
fn test_oversized_body_is_413() {
    let handle = start(demo(), 8);
    let payload = "x".repeat(64);
    let (status, _, body) = send_raw(
        &handle,
        &format!(
            "POST /echo HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{payload}",
            payload.len()
        ),
    );
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE.as_u16());
    assert_eq!(body, "413 - Payload Too Large");
    handle.stop();
}

#[test]
fn test_panicking_handler_is_500_and_server_survives() {
    let handle = start(demo(), 1024);

    let (status, _, body) = get(&handle, "/boom");
    assert_eq!(status, 500);
    assert_eq!(body, "500 - Internal Server Error");

    let (status, _, _) = get(&handle, "/hello/again");
    assert_eq!(status, 200);

    handle.stop();
}
