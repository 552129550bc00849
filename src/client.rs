//! Blocking client for calling a running API.
//!
//! ```rust,no_run
//! use docroute::client::Res;
//! use serde_json::json;
//!
//! let res = Res::new("http://127.0.0.1:5000").unwrap();
//! let reply = res.post("/resource/action", Some(&json!({"name": "kk"}))).unwrap();
//! assert_eq!(reply["hello"], "kk");
//! ```

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResError {
    /// The request never got an HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the decoded JSON body when there is one,
    /// otherwise the HTTP error text.
    #[error("{status}: {message}")]
    Status { status: u16, message: Value },

    /// A 2xx response whose body is not JSON.
    #[error("response data not valid JSON document")]
    InvalidBody,
}

impl ResError {
    /// The 400 message of an aborted request, if that is what this is.
    pub fn message(&self) -> Option<&str> {
        match self {
            ResError::Status { message, .. } => message.as_str(),
            _ => None,
        }
    }
}

/// Client bound to a URL prefix such as `http://127.0.0.1:5000`.
#[derive(Debug, Clone)]
pub struct Res {
    url_prefix: String,
    client: Client,
}

impl Res {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be initialised (TLS backend).
    pub fn new(url_prefix: impl Into<String>) -> Result<Self, ResError> {
        Ok(Self {
            url_prefix: url_prefix.into(),
            client: Client::builder().build()?,
        })
    }

    /// POST `data` as JSON to `url` (appended to the prefix) and decode the reply.
    pub fn post(&self, url: &str, data: Option<&Value>) -> Result<Value, ResError> {
        let url = format!("{}{}", self.url_prefix, url);
        let mut request = self.client.post(&url);
        if let Some(data) = data {
            request = request.json(data);
        }
        let response = request.send()?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Response received");

        let text = response.text()?;
        let body = serde_json::from_str::<Value>(&text);
        if !status.is_success() {
            let message = body.unwrap_or_else(|_| {
                Value::String(format!(
                    "{} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Error")
                ))
            });
            return Err(ResError::Status {
                status: status.as_u16(),
                message,
            });
        }
        body.map_err(|_| ResError::InvalidBody)
    }
}
