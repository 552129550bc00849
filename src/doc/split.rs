use crate::error::SchemaError;
use regex::Regex;
use serde_json::{Map, Value};
use textwrap::dedent;

/// Ordered string-keyed mapping recovered from a doc block.
///
/// `serde_json` is built with `preserve_order`, so iteration follows the order
/// in which keys were written in the comment.
pub type DocMap = Map<String, Value>;

/// Split a doc comment into its prose description and its structured-data block.
///
/// The data block starts at the first line matching `marker` and runs to the end
/// of the comment. It is dedented and parsed as YAML into an ordered mapping.
///
/// - `None` yields an empty description and an empty mapping.
/// - A comment without a marker line yields the whole (dedented, trimmed) text and
///   an empty mapping.
/// - Malformed YAML is a [`SchemaError`], never a silent empty result.
///
/// # Example
///
/// ```
/// use docroute::doc::{split_doc, RE_DIRECTIVE};
///
/// let doc = "
///     Say hello
///
///     $input:
///         name?str: Your name
/// ";
/// let (desc, data) = split_doc(Some(doc), &RE_DIRECTIVE).unwrap();
/// assert_eq!(desc, "Say hello");
/// assert!(data.contains_key("$input"));
/// ```
pub fn split_doc(doc: Option<&str>, marker: &Regex) -> Result<(String, DocMap), SchemaError> {
    let Some(doc) = doc else {
        return Ok((String::new(), DocMap::new()));
    };
    let Some(found) = marker.find(doc) else {
        return Ok((dedent(doc).trim().to_string(), DocMap::new()));
    };
    let start = found.start();
    let data = parse_block(&dedent(&doc[start..]))?;
    Ok((dedent(&doc[..start]).trim().to_string(), data))
}

fn parse_block(text: &str) -> Result<DocMap, SchemaError> {
    let value: Value = serde_yaml::from_str(&quote_reserved_scalars(text))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SchemaError::NotAMapping),
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

// YAML reserves `@` as an indicator, so `@message` cannot start a plain scalar.
// Shared keys (`@message:`) and shared references (`$output: @message`) are
// rewritten to double-quoted scalars before the block reaches the YAML parser.
// Lines inside a block scalar (`|`, `>`) are literal text and left alone.
fn quote_reserved_scalars(text: &str) -> String {
    let mut block_parent: Option<usize> = None;
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let indent = line.len() - line.trim_start_matches(is_blank).len();
        if let Some(parent) = block_parent {
            if line.trim().is_empty() || indent > parent {
                lines.push(line.to_string());
                continue;
            }
            block_parent = None;
        }
        if opens_block_scalar(line) {
            block_parent = Some(indent);
        }
        lines.push(quote_line(line));
    }
    lines.join("\n")
}

/// `key: |`, `- >-` and the like: the line's value is a block scalar header.
fn opens_block_scalar(line: &str) -> bool {
    let end = line.find(" #").unwrap_or(line.len());
    let body = line[..end].trim_end();
    let Some((before, header)) = body.rsplit_once(is_blank) else {
        return false;
    };
    let before = before.trim_end();
    let mut chars = header.chars();
    matches!(chars.next(), Some('|' | '>'))
        && chars.all(|c| c.is_ascii_digit() || c == '+' || c == '-')
        && (before.ends_with(':') || before.trim_start() == "-" || before.ends_with(" -"))
}

fn quote_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 4);
    let mut rest = line;
    loop {
        let body = rest.trim_start_matches(is_blank);
        out.push_str(&rest[..rest.len() - body.len()]);
        rest = body;
        match rest.strip_prefix('-') {
            Some(after) if after.starts_with(is_blank) => {
                out.push('-');
                rest = after;
            }
            _ => break,
        }
    }

    if rest.starts_with('@') {
        match key_colon(rest) {
            Some(pos) => {
                out.push_str(&quoted(&rest[..pos]));
                rest = &rest[pos..];
            }
            None => {
                out.push_str(&quote_scalar(rest));
                return out;
            }
        }
    } else if let Some(pos) = key_colon(rest) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
    } else {
        out.push_str(rest);
        return out;
    }

    // `rest` now starts at the key separator
    out.push(':');
    let value = &rest[1..];
    let trimmed = value.trim_start_matches(is_blank);
    out.push_str(&value[..value.len() - trimmed.len()]);
    if trimmed.starts_with('@') {
        out.push_str(&quote_scalar(trimmed));
    } else {
        out.push_str(trimmed);
    }
    out
}

fn quote_scalar(text: &str) -> String {
    let end = text.find(" #").unwrap_or(text.len());
    let scalar = text[..end].trim_end();
    let mut out = quoted(scalar);
    out.push_str(&text[scalar.len()..]);
    out
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// Byte offset of the `:` separating a mapping key from its value.
fn key_colon(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' if i == 0 => quote = Some(b),
            b'#' if i > 0 && is_blank(bytes[i - 1] as char) => return None,
            b':' if bytes.get(i + 1).map_or(true, |n| is_blank(*n as char)) => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{RE_DIRECTIVE, RE_SHARED};
    use serde_json::json;

    #[test]
    fn test_none_is_empty() {
        let (desc, data) = split_doc(None, &RE_DIRECTIVE).unwrap();
        assert_eq!(desc, "");
        assert!(data.is_empty());
    }

    #[test]
    fn test_no_marker_returns_dedented_text() {
        let doc = "\n    First line\n\n      indented\n    last\n    ";
        let (desc, data) = split_doc(Some(doc), &RE_DIRECTIVE).unwrap();
        assert_eq!(desc, "First line\n\n  indented\nlast");
        assert!(data.is_empty());
    }

    #[test]
    fn test_sigil_inside_prose_is_not_a_marker() {
        let doc = "Costs $price: see table";
        let (desc, data) = split_doc(Some(doc), &RE_DIRECTIVE).unwrap();
        assert_eq!(desc, doc);
        assert!(data.is_empty());
    }

    #[test]
    fn test_split_preserves_order() {
        let doc = "
            Greeting

            $output: @message
            $input:
                name?str: Name
        ";
        let (desc, data) = split_doc(Some(doc), &RE_DIRECTIVE).unwrap();
        assert_eq!(desc, "Greeting");
        let keys: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["$output", "$input"]);
        assert_eq!(data["$output"], json!("@message"));
        assert_eq!(data["$input"], json!({"name?str": "Name"}));
    }

    #[test]
    fn test_shared_keys_are_quoted() {
        let doc = "API\n\n@message:\n    hello?str: Welcome\n@user:\n    - @message\n";
        let (desc, data) = split_doc(Some(doc), &RE_SHARED).unwrap();
        assert_eq!(desc, "API");
        assert_eq!(data["@message"], json!({"hello?str": "Welcome"}));
        assert_eq!(data["@user"], json!(["@message"]));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let doc = "test\n\n$input:\ninvalid YAML\n";
        let err = split_doc(Some(doc), &RE_DIRECTIVE).unwrap_err();
        assert!(matches!(err, SchemaError::Yaml(_)));
    }

    #[test]
    fn test_blank_lines_do_not_limit_dedent() {
        let doc = "\tSummary\n  \n\t$input:\n\t    name?str: Name\n\t\n";
        let (desc, data) = split_doc(Some(doc), &RE_DIRECTIVE).unwrap();
        assert_eq!(desc, "Summary");
        assert_eq!(data["$input"], json!({"name?str": "Name"}));
    }

    #[test]
    fn test_block_scalar_text_is_not_quoted() {
        let doc = "
            Notify

            $input:
                name?str: |
                    @channel gets pinged

                    twice
                tags: [\"str\"]
            $output: @message
        ";
        let (_, data) = split_doc(Some(doc), &RE_DIRECTIVE).unwrap();
        assert_eq!(
            data["$input"]["name?str"],
            json!("@channel gets pinged\n\ntwice\n")
        );
        assert_eq!(data["$input"]["tags"], json!(["str"]));
        assert_eq!(data["$output"], json!("@message"));
    }

    #[test]
    fn test_opens_block_scalar() {
        assert!(opens_block_scalar("    name?str: |"));
        assert!(opens_block_scalar("desc: >-  # folded"));
        assert!(opens_block_scalar("  - |2"));
        assert!(!opens_block_scalar("name?str: a | b"));
        assert!(!opens_block_scalar("|"));
    }

    #[test]
    fn test_quote_line() {
        assert_eq!(quote_line("$output: @message"), "$output: \"@message\"");
        assert_eq!(quote_line("@message:"), "\"@message\":");
        assert_eq!(quote_line("  - @user  # comment"), "  - \"@user\"  # comment");
        assert_eq!(quote_line("name?str&default=\"x\": Name"), "name?str&default=\"x\": Name");
        assert_eq!(quote_line("user@user: Owner"), "user@user: Owner");
    }
}
