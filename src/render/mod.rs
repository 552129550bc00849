//! # Render Module
//!
//! Documentation pages served on `GET`. The description is rendered from
//! Markdown; shared schemas and directives are shown as pretty-printed JSON.
//! The HTML template is embedded in the binary.

mod document;
mod markdown;

pub use document::DocPage;
pub use markdown::{dumps, markdown};
