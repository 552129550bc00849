//! # Server Module
//!
//! The request pipeline and its HTTP adapter.
//!
//! [`ApiState::handle`] is the whole pipeline as a function from a
//! [`ParsedRequest`] to an [`HttpResponse`], so it can be driven without a
//! socket. [`AppService`] plugs it into `may_minihttp`, and [`HttpServer`] starts
//! that service on an address.

pub mod http_server;
pub mod negotiate;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use negotiate::{accept_json, best_match};
pub use request::{decode_payload, parse_query_params, parse_request, ParsedRequest};
pub use response::{status_reason, write_response, ContentType, HttpResponse};
pub use service::{health_endpoint, ApiState, AppService};
