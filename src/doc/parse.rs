use super::split::{split_doc, DocMap};
use crate::error::SchemaError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sigil prefixing directive keys in a handler doc block.
pub const DIRECTIVE_SIGIL: char = '$';
/// Sigil prefixing shared schema keys in the API doc block.
pub const SHARED_SIGIL: char = '@';

/// A line opening a directive block: optional indentation, `$word:`.
#[allow(clippy::expect_used)]
pub static RE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[\t ]*\$\w+:").expect("directive marker regex"));

/// A line opening a shared block: optional indentation, `@word:`.
#[allow(clippy::expect_used)]
pub static RE_SHARED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[\t ]*@\w+:").expect("shared marker regex"));

/// Parse the directive block of a handler doc.
///
/// Returns the prose description and an ordered `name -> metadata` mapping with the
/// `$` sigil stripped. Order follows the comment and is the order in which the
/// directives wrap the handler.
pub fn parse_directive(doc: Option<&str>) -> Result<(String, DocMap), SchemaError> {
    parse_sigil_block(doc, &RE_DIRECTIVE, DIRECTIVE_SIGIL, "directive")
}

/// Parse the shared-schema block of the API doc.
///
/// Returns the API description and an ordered `name -> schema` mapping with the
/// `@` sigil stripped.
pub fn parse_shared(doc: Option<&str>) -> Result<(String, DocMap), SchemaError> {
    parse_sigil_block(doc, &RE_SHARED, SHARED_SIGIL, "shared")
}

fn parse_sigil_block(
    doc: Option<&str>,
    marker: &Regex,
    sigil: char,
    kind: &'static str,
) -> Result<(String, DocMap), SchemaError> {
    let (desc, data) = split_doc(doc, marker)?;
    let mut entries = DocMap::new();
    for (key, value) in data {
        match key.strip_prefix(sigil) {
            Some(name) if !name.is_empty() => {
                entries.insert(name.to_string(), value);
            }
            _ => return Err(SchemaError::InvalidKey { kind, sigil, key }),
        }
    }
    Ok((desc, entries))
}
