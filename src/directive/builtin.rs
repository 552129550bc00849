use super::registry::ApiContext;
use crate::error::{ApiError, SchemaError};
use crate::handler::{Call, Handler, Payload, Reply};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// `$input`: validate the request payload and pass it as named arguments.
///
/// The declaration must describe an object. Form payloads are coerced to the
/// declared scalar types before validation. A payload that does not conform is
/// answered with 400 and the validation message; the handler is not called.
pub fn input_directive(
    handler: Handler,
    meta: &Value,
    ctx: &ApiContext<'_>,
) -> Result<Handler, SchemaError> {
    let validator = ctx.compiler.compile(meta)?;
    if !validator.is_object() {
        return Err(SchemaError::Invalid(
            "input must declare an object of named fields".into(),
        ));
    }
    let endpoint = ctx.endpoint.to_string();
    Ok(Arc::new(move |mut call: Call| {
        let result = match &call.payload {
            Payload::Json(fields) => validator.validate(Value::Object(fields.clone())),
            Payload::Form(fields) => validator.validate_form(fields.clone()),
        };
        match result {
            Ok(Value::Object(args)) => {
                call.args = args;
                handler(call)
            }
            Ok(other) => Err(ApiError::Internal(anyhow::anyhow!(
                "input validated to a non-object: {other}"
            ))),
            Err(err) => {
                warn!(endpoint = %endpoint, error = %err, "Input validation failed");
                Err(ApiError::BadRequest(err.message))
            }
        }
    }))
}

/// `$output`: validate and shape what the handler returns.
///
/// A violation is the handler's fault and becomes a 500. Raw responses are
/// passed through untouched.
pub fn output_directive(
    handler: Handler,
    meta: &Value,
    ctx: &ApiContext<'_>,
) -> Result<Handler, SchemaError> {
    let validator = ctx.compiler.compile(meta)?;
    let endpoint = ctx.endpoint.to_string();
    Ok(Arc::new(move |call: Call| match handler(call)? {
        Reply::Json(value) => validator.validate(value).map(Reply::Json).map_err(|err| {
            error!(endpoint = %endpoint, error = %err, "Output validation failed");
            ApiError::Output(err)
        }),
        raw @ Reply::Response(_) => Ok(raw),
    }))
}
