//! # docroute
//!
//! **docroute** builds self-documenting JSON APIs on the `may` coroutine runtime.
//! Routes declare their contract in doc blocks, next to the handler:
//!
//! ```text
//! Say hello                          <- description, rendered from Markdown
//!
//! $input:                            <- validate the request into named arguments
//!     name?str&default="world": Your name
//! $output: @message                  <- validate what the handler returns
//! ```
//!
//! `GET` on a route returns its documentation (HTML, or JSON on request); `POST`
//! calls it. `GET /` documents the whole API.
//!
//! ## Architecture
//!
//! - **[`doc`]** - splitting doc blocks into prose and YAML, sigil parsing, titles
//! - **[`schema`]** - compact schema declarations compiled to JSON Schema
//! - **[`directive`]** - named handler decorators; `input` and `output` built in
//! - **[`handler`]** - the handler type and adapters for closures and typed functions
//! - **[`api`]** - the application object, route registration, the resource table
//! - **[`server`]** - the request pipeline and its `may_minihttp` adapter
//! - **[`render`]** - Markdown and HTML documentation pages
//! - **[`client`]** - blocking client for calling a running API
//!
//! Every declaration problem is a [`SchemaError`] raised while building the
//! [`Api`]; nothing is parsed or compiled while serving requests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docroute::api::Api;
//! use docroute::handler::typed;
//! use docroute::server::HttpServer;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Greet {
//!     name: String,
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut api = Api::builder()
//!         .doc("Greetings\n\n@message:\n    hello?str: Greeting")
//!         .build()?;
//!     api.res("resource").action(
//!         "action",
//!         "Say hello\n\n$input:\n    name?str&default=\"world\": Your name\n$output: @message",
//!         typed(|args: Greet| Ok(json!({"hello": args.name}))),
//!     )?;
//!     let handle = HttpServer(api.into_service()).start("127.0.0.1:5000")?;
//!     handle.join().map_err(|_| anyhow::anyhow!("server panicked"))
//! }
//! ```
//!
//! ## Configuration
//!
//! - [`logging::LogConfig`] reads `DOCROUTE_LOG_*`
//! - [`runtime_config::RuntimeConfig`] reads `DOCROUTE_STACK_SIZE` and `DOCROUTE_ADDR`

pub mod api;
pub mod cli;
pub mod client;
pub mod directive;
pub mod doc;
pub mod error;
pub mod handler;
pub mod hello;
pub mod ids;
pub mod logging;
pub mod render;
pub mod runtime_config;
pub mod schema;
pub mod server;

pub use api::{Api, ApiBuilder, RouteDecl};
pub use error::{ApiError, SchemaError, ValidationError};
pub use handler::{handler, typed, Call, Handler, Payload, Reply};
pub use server::{AppService, HttpServer, ServerHandle};
