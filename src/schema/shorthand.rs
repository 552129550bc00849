//! Parsing of the compact schema expressions used in doc blocks.
//!
//! ```text
//! int&min=0&default=5          validator `int`, three parameters
//! name?str&optional            field `name`, validator `str`
//! owner@user                   field `owner`, shared schema `user`
//! ```

use crate::error::SchemaError;
use serde_json::Value;

/// `validator&param&param=value`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expr {
    pub kind: String,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Param {
    pub name: String,
    pub value: Option<Value>,
}

/// How a mapping key declares its field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldKey<'a> {
    /// `name?expr`; the mapping value is a description (or a nested schema when
    /// the expression has no validator).
    Validator { name: &'a str, expr: &'a str },
    /// `name@shared&params`; the mapping value is a description.
    Reference { name: &'a str, target: &'a str },
    /// `name`; the mapping value is the field's schema.
    Nested { name: &'a str },
}

pub(crate) fn parse_key(key: &str) -> Result<FieldKey<'_>, SchemaError> {
    let key = key.trim();
    let field = match key.find(|c: char| c == '?' || c == '@') {
        Some(pos) if key[pos..].starts_with('?') => FieldKey::Validator {
            name: key[..pos].trim(),
            expr: &key[pos + 1..],
        },
        Some(pos) => FieldKey::Reference {
            name: key[..pos].trim(),
            target: &key[pos + 1..],
        },
        None => FieldKey::Nested { name: key },
    };
    let name = match &field {
        FieldKey::Validator { name, .. }
        | FieldKey::Reference { name, .. }
        | FieldKey::Nested { name } => *name,
    };
    if name.is_empty() {
        return Err(SchemaError::Invalid(format!("field key {key:?} has no name")));
    }
    Ok(field)
}

pub(crate) fn parse_expr(text: &str) -> Result<Expr, SchemaError> {
    let mut parts = split_params(text.trim()).into_iter();
    let kind = parts.next().unwrap_or_default().trim().to_string();
    let mut params = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let param = match part.split_once('=') {
            Some((name, raw)) => Param {
                name: name.trim().to_string(),
                value: Some(param_value(raw.trim())),
            },
            None => Param {
                name: part.to_string(),
                value: None,
            },
        };
        if param.name.is_empty() {
            return Err(SchemaError::Invalid(format!(
                "malformed parameter {part:?} in {text:?}"
            )));
        }
        params.push(param);
    }
    Ok(Expr { kind, params })
}

/// Parameter values are JSON when they parse as JSON, bare text otherwise.
fn param_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Split on `&` outside double quotes, so `default="a&b"` stays whole.
fn split_params(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '&' if !quoted => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
