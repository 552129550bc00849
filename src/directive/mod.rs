//! # Directive Module
//!
//! A directive is a named handler decorator declared in a route's doc block:
//!
//! ```text
//! $input:
//!     name?str: Your name
//! $output: @message
//! ```
//!
//! Each `$name` resolves to a [`DirectiveFactory`] in the [`DirectiveRegistry`].
//! The factory receives the handler built so far plus the directive's metadata
//! and returns a new handler. Directives are applied in declaration order, so the
//! first one listed wraps the user function directly.
//!
//! `input` and `output` are built in. Applications add their own through
//! [`crate::api::ApiBuilder::directive`]:
//!
//! ```rust
//! use docroute::directive::ApiContext;
//! use docroute::error::{ApiError, SchemaError};
//! use docroute::handler::{handler, Call, Handler};
//! use serde_json::Value;
//!
//! fn require_token(inner: Handler, meta: &Value, _ctx: &ApiContext<'_>) -> Result<Handler, SchemaError> {
//!     let header = meta.as_str().unwrap_or("x-token").to_string();
//!     Ok(handler(move |call: Call| {
//!         if call.request.header(&header).is_none() {
//!             return Err(ApiError::abort("missing token"));
//!         }
//!         inner(call)
//!     }))
//! }
//! ```

mod builtin;
mod registry;

pub use builtin::{input_directive, output_directive};
pub use registry::{ApiContext, DirectiveFactory, DirectiveRegistry};
