use crate::error::ApiError;
use crate::handler::Payload;
use http::Method;
use may_minihttp::Request;
use serde_json::{Map, Value};
use futures::executor::block_on;
use futures::stream;
use std::collections::HashMap;
use std::io::{self, Read};
use tracing::debug;

/// Parsed HTTP request data used by the request pipeline.
///
/// Owns everything the pipeline needs so the raw `may_minihttp` buffer can be
/// released before any handler runs. Also constructible by hand, which is how the
/// tests drive the pipeline without a socket.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Parsed query string parameters
    pub query_params: HashMap<String, String>,
    /// Raw request body
    pub body: Vec<u8>,
}

impl ParsedRequest {
    /// Build a request from a method and a target (`/path?query`).
    pub fn new(method: Method, target: &str) -> Self {
        let path = target.split('?').next().unwrap_or("/").to_string();
        Self {
            method,
            path,
            headers: HashMap::new(),
            query_params: parse_query_params(target),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Content type without parameters, lowercased (`application/json`).
    pub fn mimetype(&self) -> String {
        self.header("content-type")
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Parse query string parameters from a request target
///
/// Extracts everything after the `?` character and URL-decodes parameter names and
/// values. A bare key (`/?json`) maps to an empty string.
pub fn parse_query_params(target: &str) -> HashMap<String, String> {
    if let Some(pos) = target.find('?') {
        let query_str = &target[pos + 1..];
        url::form_urlencoded::parse(query_str.as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    } else {
        HashMap::new()
    }
}

/// Parse an incoming HTTP request into a [`ParsedRequest`]
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = Method::from_bytes(req.method().as_bytes()).unwrap_or(Method::GET);
    let target = req.path().to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let mut body = Vec::new();
    if let Err(err) = req.body().read_to_end(&mut body) {
        debug!(error = %err, "Request body read failed");
    }

    debug!(
        method = %method,
        target = %target,
        header_count = headers.len(),
        body_size_bytes = body.len(),
        "HTTP request parsed"
    );

    let mut parsed = ParsedRequest::new(method, &target);
    parsed.headers = headers;
    parsed.body = body;
    parsed
}

/// Decode the request body according to its content type.
///
/// `application/json` bodies must hold a JSON object. `multipart/form-data`
/// bodies contribute their text fields; file parts are skipped. Anything else is
/// read as a url-encoded form. The first value of a repeated form field wins.
pub fn decode_payload(req: &ParsedRequest) -> Result<Payload, ApiError> {
    match req.mimetype().as_str() {
        "application/json" => {
            let value: Value = serde_json::from_slice(&req.body)
                .map_err(|_| ApiError::abort("Invalid JSON content"))?;
            match value {
                Value::Object(map) => Ok(Payload::Json(map)),
                _ => Err(ApiError::abort("JSON content must be object")),
            }
        }
        "multipart/form-data" => decode_multipart(req).map(Payload::Form),
        _ => Ok(Payload::Form(decode_urlencoded(&req.body))),
    }
}

fn decode_urlencoded(body: &[u8]) -> Map<String, Value> {
    let mut form = Map::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        if !form.contains_key(key.as_ref()) {
            form.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }
    form
}

fn decode_multipart(req: &ParsedRequest) -> Result<Map<String, Value>, ApiError> {
    let invalid = |err: multer::Error| {
        debug!(error = %err, "Multipart body rejected");
        ApiError::abort("Invalid multipart content")
    };
    let boundary = multer::parse_boundary(req.header("content-type").unwrap_or_default())
        .map_err(invalid)?;
    let body = req.body.clone();
    let stream = stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    // The whole body is already in memory, so every future is ready on first poll.
    block_on(async {
        let mut form = Map::new();
        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                debug!(field = %name, "Multipart file part skipped");
                continue;
            }
            let text = field.text().await.map_err(invalid)?;
            if !form.contains_key(&name) {
                form.insert(name, Value::String(text));
            }
        }
        Ok::<_, ApiError>(form)
    })
}
