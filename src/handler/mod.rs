//! # Handler Module
//!
//! A route handler is a plain closure from a [`Call`] to a [`Reply`]. Directives
//! wrap handlers in other handlers of the same type, so the whole chain is a
//! single [`Handler`] by the time a request arrives.
//!
//! Two adapters cover the common cases:
//!
//! - [`handler`] for closures that want the full call (request, payload, args)
//! - [`typed`] for functions of deserialized named arguments returning anything
//!   serializable
//!
//! ```rust
//! use docroute::handler::typed;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Args {
//!     name: String,
//! }
//!
//! let hello = typed(|args: Args| Ok(json!({"hello": args.name})));
//! ```

mod core;

pub use core::*;
