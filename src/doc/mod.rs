//! # Doc Module
//!
//! Routes and the API itself are declared with doc blocks: free prose followed by
//! a YAML block whose keys carry a sigil.
//!
//! ```text
//! Say hello to someone          <- description (Markdown)
//!
//! $input:                       <- directive block, `$` sigil
//!     name?str: Your name
//! $output: @message             <- `@` refers to a shared schema
//! ```
//!
//! The API-level doc uses the `@` sigil for its block and declares the shared
//! schemas that handler directives may reference.
//!
//! - [`split_doc`] separates prose from data for any marker
//! - [`parse_directive`] / [`parse_shared`] validate and strip the sigils
//! - [`get_title`] derives the short title listed in the documentation index

mod parse;
mod split;
mod title;

pub use parse::{
    parse_directive, parse_shared, DIRECTIVE_SIGIL, RE_DIRECTIVE, RE_SHARED, SHARED_SIGIL,
};
pub use split::{split_doc, DocMap};
pub use title::{get_title, TITLE_MAX_CHARS};
