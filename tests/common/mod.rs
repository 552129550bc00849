#![allow(dead_code)]

use docroute::api::Api;
use docroute::handler::{handler, typed, Call, Handler};
use docroute::server::{AppService, HttpResponse, ParsedRequest};
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Once;
use std::time::Duration;

pub const API_DOC: &str = "
Test API

@message:
    message?str: Message
";

pub const ACTION_DOC: &str = "
Test action

$input:
    name?str: Name
$output: @message
";

#[derive(Deserialize)]
struct Name {
    name: String,
}

pub fn echo_name() -> Handler {
    typed(|args: Name| Ok(json!({ "message": args.name })))
}

pub fn noop() -> Handler {
    handler(|_call: Call| Ok(Value::Null))
}

/// `/resource/action` echoing `name` back as `message`.
pub fn test_api() -> Api {
    let mut api = Api::builder().doc(API_DOC).build().unwrap();
    api.res("resource")
        .action("action", ACTION_DOC, echo_name())
        .unwrap();
    api
}

pub fn test_service() -> AppService {
    test_api().into_service()
}

pub fn get(service: &AppService, target: &str) -> HttpResponse {
    service.handle(ParsedRequest::new(Method::GET, target))
}

pub fn post_json(service: &AppService, target: &str, body: &str) -> HttpResponse {
    service.handle(
        ParsedRequest::new(Method::POST, target)
            .with_header("Content-Type", "application/json")
            .with_body(body),
    )
}

pub fn post_form(service: &AppService, target: &str, body: &str) -> HttpResponse {
    service.handle(
        ParsedRequest::new(Method::POST, target)
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(body),
    )
}

/// Ensures May coroutines are configured only once
static MAY_INIT: Once = Once::new();

pub fn setup_may_runtime() {
    MAY_INIT.call_once(|| {
        may::config().set_stack_size(0x8000);
    });
}

pub fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {:?}", e),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Status, content type and body of a raw HTTP/1.1 response.
pub fn parse_parts(resp: &str) -> (u16, String, String) {
    let mut parts = resp.splitn(2, "\r\n\r\n");
    let headers = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("").to_string();
    let mut status = 0;
    let mut content_type = String::new();
    for line in headers.lines() {
        if line.starts_with("HTTP/1.1") {
            status = line
                .split_whitespace()
                .nth(1)
                .unwrap_or("0")
                .parse()
                .unwrap();
        } else if let Some((name, val)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-type") {
                content_type = val.trim().to_string();
            }
        }
    }
    (status, content_type, body)
}
