//! # Schema Module
//!
//! Compact schema declarations, compiled to JSON Schema and validated with the
//! `jsonschema` crate.
//!
//! A compiled [`Validator`] does more than accept or reject: it returns the
//! *shaped* value, with defaults filled in, absent optional fields set to `null`
//! and undeclared keys removed. Handlers therefore always see exactly the fields
//! their `input` declares.
//!
//! ```
//! use docroute::schema::SchemaCompiler;
//! use serde_json::json;
//!
//! let compiler = SchemaCompiler::default();
//! let validator = compiler
//!     .compile(&json!({"name?str&default=\"world\"": "Your name"}))
//!     .unwrap();
//! assert_eq!(validator.validate(json!({})).unwrap(), json!({"name": "world"}));
//! ```

mod coerce;
mod compiler;
mod shorthand;

pub use compiler::{FormatFn, SchemaCompiler, BUILTIN_TYPES};

use crate::error::ValidationError;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A compiled declaration, cheap to clone and shared across coroutines.
#[derive(Clone)]
pub struct Validator {
    schema: Arc<Value>,
    inner: Arc<jsonschema::Validator>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Validator {
    pub(crate) fn new(schema: Value, inner: jsonschema::Validator) -> Self {
        Self {
            schema: Arc::new(schema),
            inner: Arc::new(inner),
        }
    }

    /// The JSON Schema this validator was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Whether the declaration describes an object (a set of named fields).
    pub fn is_object(&self) -> bool {
        match self.schema.get("type") {
            Some(Value::String(ty)) => ty == "object",
            Some(Value::Array(types)) => types.iter().any(|ty| ty == "object"),
            _ => false,
        }
    }

    /// Validate a value and return it shaped to the declaration.
    pub fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        let errors: Vec<String> = self.inner.iter_errors(&value).map(|e| e.to_string()).collect();
        if !errors.is_empty() {
            return Err(ValidationError::new(errors.join("; ")));
        }
        Ok(coerce::shape(&self.schema, value))
    }

    /// Validate form fields, converting text to the declared scalar types first.
    pub fn validate_form(&self, fields: Map<String, Value>) -> Result<Value, ValidationError> {
        let fields = coerce::coerce_form(&self.schema, fields);
        self.validate(Value::Object(fields))
    }
}
