//! End-to-end tests over a real socket: `may_minihttp` server, raw TCP requests and
//! the blocking [`Res`] client.

use docroute::api::Api;
use docroute::client::{Res, ResError};
use docroute::handler::{handler, Call};
use docroute::hello::hello_api;
use docroute::server::{AppService, HttpResponse, HttpServer, ServerHandle};
use serde_json::{json, Value};
use std::net::SocketAddr;

mod common;
use common::{parse_parts, send_request, setup_may_runtime, test_service};

/// Running server, stopped on drop.
struct TestServer {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
}

impl TestServer {
    fn start(service: AppService) -> Self {
        setup_may_runtime();
        let handle = HttpServer(service).start("127.0.0.1:0").unwrap();
        handle.wait_ready().unwrap();
        let addr = handle.addr();
        Self {
            handle: Some(handle),
            addr,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[test]
fn test_form_post_over_tcp() {
    let server = TestServer::start(test_service());
    let body = "name=kk";
    let req = format!(
        "POST /resource/action HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let resp = send_request(&server.addr, &req);
    let (status, content_type, body) = parse_parts(&resp);
    assert_eq!(status, 200);
    assert!(content_type.starts_with("application/json"));
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed, json!({"message": "kk"}));
}

#[test]
fn test_documents_over_tcp() {
    let server = TestServer::start(test_service());

    let resp = send_request(&server.addr, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, content_type, body) = parse_parts(&resp);
    assert_eq!(status, 200);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("Test API"));

    let resp = send_request(
        &server.addr,
        "GET / HTTP/1.1\r\nHost: localhost\r\nAccept: application/json\r\n\r\n",
    );
    let (status, content_type, _) = parse_parts(&resp);
    assert_eq!(status, 200);
    assert!(content_type.starts_with("application/json"));

    let resp = send_request(&server.addr, "GET /nowhere HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, _, _) = parse_parts(&resp);
    assert_eq!(status, 404);
}

#[test]
fn test_client_round_trip() {
    let server = TestServer::start(hello_api().unwrap().into_service());
    let res = Res::new(server.url()).unwrap();

    let reply = res
        .post("/resource/action", Some(&json!({"name": "kk"})))
        .unwrap();
    assert_eq!(reply, json!({"hello": "kk"}));

    let reply = res.post("/resource/action", Some(&json!({}))).unwrap();
    assert_eq!(reply, json!({"hello": "world"}));

    let reply = res
        .post("/math/sum", Some(&json!({"numbers": [1, 2, 3]})))
        .unwrap();
    assert_eq!(reply, json!({"total": 6}));
}

#[test]
fn test_client_reports_abort_message() {
    let server = TestServer::start(hello_api().unwrap().into_service());
    let res = Res::new(server.url()).unwrap();

    let err = res
        .post("/math/sum", Some(&json!({"numbers": []})))
        .unwrap_err();
    match &err {
        ResError::Status { status, .. } => assert_eq!(*status, 400),
        other => panic!("expected a status error, got {other:?}"),
    }
    assert!(err.message().is_some());

    let err = res.post("/math/nothing", None).unwrap_err();
    assert!(matches!(err, ResError::Status { status: 404, .. }));
}

#[test]
fn test_raw_response_headers_over_tcp() {
    let mut api = Api::builder().build().unwrap();
    api.res("link")
        .action(
            "follow",
            "Redirect",
            handler(|_call: Call| {
                Ok(HttpResponse::text(302, "").with_header("Location", "/resource/action"))
            }),
        )
        .unwrap();
    let server = TestServer::start(api.into_service());

    let resp = send_request(
        &server.addr,
        "POST /link/follow HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n",
    );
    assert!(resp.starts_with("HTTP/1.1 302 Found"), "{resp}");
    assert!(resp.contains("Location: /resource/action"), "{resp}");
}
