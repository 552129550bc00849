use http::StatusCode;
use may_minihttp::Response;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

/// Header lines already handed to `may_minihttp`, which only takes `'static` text.
static HEADER_LINES: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(Default::default);

/// Content types the pipeline emits.
///
/// `may_minihttp` wants `'static` header lines, so each variant maps to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Html,
    Text,
}

impl ContentType {
    pub fn mimetype(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Html => "text/html",
            ContentType::Text => "text/plain",
        }
    }

    fn header_line(self) -> &'static str {
        match self {
            ContentType::Json => "Content-Type: application/json; charset=utf-8",
            ContentType::Html => "Content-Type: text/html; charset=utf-8",
            ContentType::Text => "Content-Type: text/plain; charset=utf-8",
        }
    }
}

/// A complete response, independent of the socket it is written to.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: ContentType,
    /// Extra headers; a `Content-Type` here replaces the one from `content_type`
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: ContentType, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header, e.g. `Location` on a redirect or `Content-Disposition` on a
    /// download.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// JSON response; non-ASCII text is written as UTF-8, never escaped.
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, ContentType::Json, body.to_string())
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, ContentType::Html, body.into())
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, ContentType::Text, body.into())
    }

    pub fn not_found(method: &str, path: &str) -> Self {
        Self::json(
            404,
            &json!({"error": "Not Found", "method": method, "path": path}),
        )
    }

    pub fn method_not_allowed(method: &str, path: &str) -> Self {
        Self::json(
            405,
            &json!({"error": "Method Not Allowed", "method": method, "path": path}),
        )
    }

    /// Content type without parameters.
    pub fn mimetype(&self) -> &str {
        match self.header("content-type") {
            Some(value) => value.split(';').next().unwrap_or(value).trim(),
            None => self.content_type.mimetype(),
        }
    }

    /// Body parsed as JSON, if it is JSON.
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Reason phrase for a status line; `"Unknown"` for codes without one.
pub fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}

fn header_line(name: &str, value: &str) -> &'static str {
    let line = format!("{name}: {value}");
    let mut lines = HEADER_LINES.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(&known) = lines.get(line.as_str()) {
        return known;
    }
    let leaked: &'static str = Box::leak(line.into_boxed_str());
    lines.insert(leaked);
    leaked
}

pub fn write_response(res: &mut Response, response: HttpResponse) {
    res.status_code(usize::from(response.status), status_reason(response.status));
    if response.header("content-type").is_none() {
        res.header(response.content_type.header_line());
    }
    for (name, value) in &response.headers {
        res.header(header_line(name, value));
    }
    res.body_vec(response.body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(302), "Found");
        assert_eq!(status_reason(409), "Conflict");
        assert_eq!(status_reason(503), "Service Unavailable");
        assert_eq!(status_reason(599), "Unknown");
    }

    #[test]
    fn test_custom_headers() {
        let res = HttpResponse::text(200, "a,b")
            .with_header("Content-Type", "text/csv; charset=utf-8")
            .with_header("Content-Disposition", "attachment; filename=\"export.csv\"");
        assert_eq!(res.mimetype(), "text/csv");
        assert_eq!(res.header("content-disposition"), Some("attachment; filename=\"export.csv\""));

        let first = header_line("Location", "/r/a");
        let second = header_line("Location", "/r/a");
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, "Location: /r/a");
    }

    #[test]
    fn test_json_keeps_unicode() {
        let res = HttpResponse::json(200, &json!({"hello": "世界"}));
        assert_eq!(String::from_utf8(res.body.clone()).unwrap(), r#"{"hello":"世界"}"#);
        assert_eq!(res.mimetype(), "application/json");
        assert_eq!(res.body_json(), Some(json!({"hello": "世界"})));
    }
}
