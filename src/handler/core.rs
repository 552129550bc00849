use crate::error::ApiError;
use crate::server::request::ParsedRequest;
use crate::server::response::HttpResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `application/json` object
    Json(Map<String, Value>),
    /// url-encoded form fields, all text
    Form(Map<String, Value>),
}

impl Payload {
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            Payload::Json(map) | Payload::Form(map) => map,
        }
    }
}

/// One invocation of a handler chain.
#[derive(Debug, Clone)]
pub struct Call {
    /// The request being served
    pub request: Arc<ParsedRequest>,
    /// Request body, decoded before any directive runs
    pub payload: Payload,
    /// Named arguments for the handler; filled by the `input` directive
    pub args: Map<String, Value>,
}

impl Call {
    pub fn new(request: Arc<ParsedRequest>, payload: Payload) -> Self {
        Self {
            request,
            payload,
            args: Map::new(),
        }
    }

    /// Named argument by name.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }
}

/// What a handler chain produces.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Serialized to a JSON response with status 200
    Json(Value),
    /// Sent as is, bypassing serialization and output validation
    Response(HttpResponse),
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<HttpResponse> for Reply {
    fn from(response: HttpResponse) -> Self {
        Reply::Response(response)
    }
}

/// A callable handler chain: the user function wrapped by its directives.
pub type Handler = Arc<dyn Fn(Call) -> Result<Reply, ApiError> + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F, R>(f: F) -> Handler
where
    F: Fn(Call) -> Result<R, ApiError> + Send + Sync + 'static,
    R: Into<Reply>,
{
    Arc::new(move |call| f(call).map(Into::into))
}

/// Wrap a function of typed named arguments as a [`Handler`].
///
/// The arguments are deserialized from [`Call::args`], so `A` normally mirrors the
/// route's `input` declaration. A mismatch is a programming error and surfaces as a
/// 500, not a 400.
pub fn typed<A, R, F>(f: F) -> Handler
where
    A: DeserializeOwned,
    R: Serialize,
    F: Fn(A) -> Result<R, ApiError> + Send + Sync + 'static,
{
    Arc::new(move |call: Call| {
        let args: A = serde_json::from_value(Value::Object(call.args))
            .map_err(|e| anyhow::anyhow!("handler arguments do not match input: {e}"))?;
        let result = f(args)?;
        let value = serde_json::to_value(result)
            .map_err(|e| anyhow::anyhow!("failed to serialize handler result: {e}"))?;
        Ok(Reply::Json(value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde::Deserialize;
    use serde_json::json;

    fn call(args: Value) -> Call {
        let request = Arc::new(ParsedRequest::new(Method::POST, "/r/a"));
        let mut call = Call::new(request, Payload::Json(Map::new()));
        if let Value::Object(map) = args {
            call.args = map;
        }
        call
    }

    #[derive(Deserialize)]
    struct Greet {
        name: String,
    }

    #[test]
    fn test_typed_handler() {
        let h = typed(|args: Greet| Ok(json!({"hello": args.name})));
        match h(call(json!({"name": "kk"}))).unwrap() {
            Reply::Json(v) => assert_eq!(v, json!({"hello": "kk"})),
            Reply::Response(_) => panic!("expected JSON"),
        }
    }

    #[test]
    fn test_typed_argument_mismatch_is_internal() {
        let h = typed(|args: Greet| Ok(args.name));
        let err = h(call(json!({"name": 1}))).unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_closure_handler() {
        let h = handler(|c: Call| Ok(c.arg("x").cloned().unwrap_or(Value::Null)));
        assert!(matches!(h(call(json!({"x": 2}))).unwrap(), Reply::Json(v) if v == json!(2)));
    }
}
