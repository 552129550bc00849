use super::shorthand::{parse_expr, parse_key, Expr, FieldKey};
use super::Validator;
use crate::doc::DocMap;
use crate::error::SchemaError;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Type names understood without registration. Custom validators may not reuse them.
pub const BUILTIN_TYPES: &[&str] = &[
    "str", "int", "float", "bool", "any", "dict", "list", "email", "url", "date", "datetime",
    "ipv4", "ipv6", "uuid",
];

/// Predicate backing a custom string validator.
pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Compiles shorthand declarations into [`Validator`]s.
///
/// Holds the shared schemas of the API and the custom validators registered on
/// the builder. Shared references are inlined, so every compiled JSON Schema is
/// self-contained.
#[derive(Clone, Default)]
pub struct SchemaCompiler {
    shared: Arc<DocMap>,
    formats: Arc<BTreeMap<String, FormatFn>>,
}

/// Flags of a declaration that matter to the enclosing object.
#[derive(Debug, Clone, Copy, Default)]
struct FieldFlags {
    optional: bool,
    has_default: bool,
}

impl FieldFlags {
    fn required(self) -> bool {
        !self.optional && !self.has_default
    }
}

impl fmt::Debug for SchemaCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCompiler")
            .field("shared", &self.shared.keys().collect::<Vec<_>>())
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaCompiler {
    pub fn new(shared: DocMap, formats: BTreeMap<String, FormatFn>) -> Self {
        Self {
            shared: Arc::new(shared),
            formats: Arc::new(formats),
        }
    }

    /// Shared schemas as declared (sigil stripped, uncompiled).
    pub fn shared(&self) -> &DocMap {
        &self.shared
    }

    /// Compile every shared entry once so broken declarations surface at startup.
    pub fn check_shared(&self) -> Result<(), SchemaError> {
        for name in self.shared.keys() {
            self.to_json_schema(&Value::String(format!("@{name}")))
                .map_err(|e| e.at(format!("@{name}")))?;
        }
        Ok(())
    }

    /// Translate a declaration into a self-contained JSON Schema document.
    pub fn to_json_schema(&self, decl: &Value) -> Result<Value, SchemaError> {
        let mut stack = Vec::new();
        let (schema, _) = self.node(decl, &mut stack)?;
        Ok(Value::Object(schema))
    }

    /// Translate and compile a declaration.
    pub fn compile(&self, decl: &Value) -> Result<Validator, SchemaError> {
        let schema = self.to_json_schema(decl)?;
        let mut options = jsonschema::options().should_validate_formats(true);
        for (name, check) in self.formats.iter() {
            let check = Arc::clone(check);
            options = options.with_format(name.clone(), move |s: &str| check(s));
        }
        let inner = options
            .build(&schema)
            .map_err(|e| SchemaError::Invalid(e.to_string()))?;
        Ok(Validator::new(schema, inner))
    }

    fn node(
        &self,
        decl: &Value,
        stack: &mut Vec<String>,
    ) -> Result<(Map<String, Value>, FieldFlags), SchemaError> {
        match decl {
            Value::String(text) => self.expr_node(text, stack),
            Value::Object(fields) => Ok((self.object(fields, stack)?, FieldFlags::default())),
            Value::Array(items) => self.array(items, stack),
            other => Err(SchemaError::Invalid(format!(
                "expected a string, mapping or sequence, found {other}"
            ))),
        }
    }

    /// `@name&params` or `type&params`.
    fn expr_node(
        &self,
        text: &str,
        stack: &mut Vec<String>,
    ) -> Result<(Map<String, Value>, FieldFlags), SchemaError> {
        let text = text.trim();
        match text.strip_prefix('@') {
            Some(reference) => {
                let expr = parse_expr(reference)?;
                let mut schema = self.resolve(&expr.kind, stack)?;
                let flags = apply_params(&mut schema, &expr)?;
                Ok((schema, flags))
            }
            None => {
                let expr = parse_expr(text)?;
                let mut schema = self.scalar(&expr.kind)?;
                let flags = apply_params(&mut schema, &expr)?;
                Ok((schema, flags))
            }
        }
    }

    fn resolve(
        &self,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<Map<String, Value>, SchemaError> {
        if stack.iter().any(|seen| seen == name) {
            return Err(SchemaError::SharedCycle(name.to_string()));
        }
        let decl = self
            .shared
            .get(name)
            .ok_or_else(|| SchemaError::UnknownShared(name.to_string()))?;
        stack.push(name.to_string());
        let resolved = self.node(decl, stack);
        stack.pop();
        Ok(resolved?.0)
    }

    fn object(
        &self,
        fields: &Map<String, Value>,
        stack: &mut Vec<String>,
    ) -> Result<Map<String, Value>, SchemaError> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (key, value) in fields {
            let (name, schema, flags) = self.field(key, value, stack).map_err(|e| e.at(key))?;
            if flags.required() {
                required.push(Value::String(name.to_string()));
            }
            properties.insert(name.to_string(), Value::Object(schema));
        }
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        Ok(schema)
    }

    fn field<'k>(
        &self,
        key: &'k str,
        value: &Value,
        stack: &mut Vec<String>,
    ) -> Result<(&'k str, Map<String, Value>, FieldFlags), SchemaError> {
        match parse_key(key)? {
            FieldKey::Validator { name, expr } => {
                let expr = parse_expr(expr)?;
                let (mut schema, flags) = match value {
                    Value::Object(_) | Value::Array(_) if expr.kind.is_empty() => {
                        let (mut schema, _) = self.node(value, stack)?;
                        let flags = apply_params(&mut schema, &expr)?;
                        (schema, flags)
                    }
                    Value::Object(_) | Value::Array(_) => {
                        return Err(SchemaError::Invalid(format!(
                            "field {name:?} has validator {:?} and a nested schema",
                            expr.kind
                        )))
                    }
                    _ => {
                        let mut schema = self.scalar(&expr.kind)?;
                        let flags = apply_params(&mut schema, &expr)?;
                        (schema, flags)
                    }
                };
                describe(&mut schema, value)?;
                Ok((name, schema, flags))
            }
            FieldKey::Reference { name, target } => {
                let expr = parse_expr(target)?;
                let mut schema = self.resolve(&expr.kind, stack)?;
                let flags = apply_params(&mut schema, &expr)?;
                describe(&mut schema, value)?;
                Ok((name, schema, flags))
            }
            FieldKey::Nested { name } => {
                let (schema, flags) = self.node(value, stack)?;
                Ok((name, schema, flags))
            }
        }
    }

    /// `[item]` or `["&params", item]`.
    fn array(
        &self,
        items: &[Value],
        stack: &mut Vec<String>,
    ) -> Result<(Map<String, Value>, FieldFlags), SchemaError> {
        let (params, item) = match items {
            [item] => (None, item),
            [Value::String(params), item] if params.trim_start().starts_with('&') => {
                (Some(parse_expr(params)?), item)
            }
            _ => {
                return Err(SchemaError::Invalid(
                    "a list schema is [item] or [\"&params\", item]".into(),
                ))
            }
        };
        let (item_schema, _) = self.node(item, stack)?;
        let mut schema = Map::new();
        schema.insert("type".into(), json!("array"));
        schema.insert("items".into(), Value::Object(item_schema));
        let flags = match params {
            Some(expr) => apply_params(&mut schema, &expr)?,
            None => FieldFlags::default(),
        };
        Ok((schema, flags))
    }

    fn scalar(&self, kind: &str) -> Result<Map<String, Value>, SchemaError> {
        let schema = match kind {
            "str" => json!({"type": "string"}),
            "int" => json!({"type": "integer"}),
            "float" => json!({"type": "number"}),
            "bool" => json!({"type": "boolean"}),
            "dict" => json!({"type": "object"}),
            "list" => json!({"type": "array"}),
            "any" | "" => json!({}),
            "email" => Value::Object(string_format("email")),
            "url" => Value::Object(string_format("uri")),
            "date" => Value::Object(string_format("date")),
            "datetime" => Value::Object(string_format("date-time")),
            "ipv4" | "ipv6" | "uuid" => Value::Object(string_format(kind)),
            custom if self.formats.contains_key(custom) => return Ok(string_format(custom)),
            other => return Err(SchemaError::UnknownValidator(other.to_string())),
        };
        match schema {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

fn string_format(format: &str) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), json!("string"));
    schema.insert("format".into(), Value::String(format.to_string()));
    schema
}

/// Field descriptions come from the mapping value when it is text.
fn describe(schema: &mut Map<String, Value>, value: &Value) -> Result<(), SchemaError> {
    match value {
        Value::String(desc) if !desc.is_empty() => {
            schema.insert("description".into(), Value::String(desc.clone()));
            Ok(())
        }
        Value::String(_) | Value::Null | Value::Object(_) | Value::Array(_) => Ok(()),
        other => Err(SchemaError::Invalid(format!(
            "field description must be text, found {other}"
        ))),
    }
}

fn apply_params(schema: &mut Map<String, Value>, expr: &Expr) -> Result<FieldFlags, SchemaError> {
    let mut flags = FieldFlags::default();
    let ty = schema.get("type").and_then(Value::as_str).map(str::to_string);
    for param in &expr.params {
        let value = param.value.clone().unwrap_or(Value::Bool(true));
        match param.name.as_str() {
            "optional" => flags.optional = value != Value::Bool(false),
            "default" => {
                flags.has_default = true;
                schema.insert("default".into(), value);
            }
            "desc" => {
                schema.insert("description".into(), value);
            }
            "regex" => {
                schema.insert("pattern".into(), value);
            }
            "min" | "max" | "minlen" | "maxlen" => {
                let keyword = bound_keyword(&param.name, ty.as_deref());
                schema.insert(keyword.into(), value);
            }
            other => {
                return Err(SchemaError::UnknownParam {
                    validator: expr.kind.clone(),
                    param: other.to_string(),
                })
            }
        }
    }
    if flags.optional || flags.has_default {
        allow_null(schema);
    }
    Ok(flags)
}

fn bound_keyword(param: &str, ty: Option<&str>) -> &'static str {
    match (param, ty) {
        ("min", Some("integer" | "number") | None) => "minimum",
        ("max", Some("integer" | "number") | None) => "maximum",
        ("min" | "minlen", Some("array")) => "minItems",
        ("max" | "maxlen", Some("array")) => "maxItems",
        ("min" | "minlen", Some("object")) => "minProperties",
        ("max" | "maxlen", Some("object")) => "maxProperties",
        ("min" | "minlen", _) => "minLength",
        _ => "maxLength",
    }
}

fn allow_null(schema: &mut Map<String, Value>) {
    if let Some(Value::String(ty)) = schema.get("type") {
        let nullable = json!([ty, "null"]);
        schema.insert("type".into(), nullable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shared() -> DocMap {
        match json!({
            "message": {"message?str": "Message"},
            "user": {"id?int&min=1": "User id", "email?email&optional": null},
            "loop_a": "@loop_b",
            "loop_b": {"next@loop_a": null}
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn compiler() -> SchemaCompiler {
        SchemaCompiler::new(shared(), BTreeMap::new())
    }

    #[test]
    fn test_object_schema() {
        let schema = compiler()
            .to_json_schema(&json!({"name?str&default=\"world\"": "Your name", "age?int&optional": null}))
            .unwrap();
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": ["string", "null"], "default": "world", "description": "Your name"},
                    "age": {"type": ["integer", "null"]}
                }
            })
        );
    }

    #[test]
    fn test_reference_inlined() {
        let schema = compiler().to_json_schema(&json!("@user")).unwrap();
        assert_eq!(schema["properties"]["id"]["minimum"], json!(1));
        assert_eq!(schema["required"], json!(["id"]));
        let schema = compiler()
            .to_json_schema(&json!({"owner@user&optional": "Owner"}))
            .unwrap();
        assert_eq!(schema["properties"]["owner"]["description"], json!("Owner"));
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_array_schema() {
        let schema = compiler()
            .to_json_schema(&json!(["&minlen=1", "int&max=9"]))
            .unwrap();
        assert_eq!(
            schema,
            json!({"type": "array", "items": {"type": "integer", "maximum": 9}, "minItems": 1})
        );
    }

    #[test]
    fn test_declaration_errors() {
        let c = compiler();
        assert!(matches!(
            c.to_json_schema(&json!("@nope")).unwrap_err().root(),
            SchemaError::UnknownShared(name) if name == "nope"
        ));
        assert!(matches!(
            c.to_json_schema(&json!("@loop_a")).unwrap_err().root(),
            SchemaError::SharedCycle(_)
        ));
        assert!(matches!(
            c.to_json_schema(&json!("color")).unwrap_err().root(),
            SchemaError::UnknownValidator(_)
        ));
        assert!(matches!(
            c.to_json_schema(&json!("int&huge")).unwrap_err().root(),
            SchemaError::UnknownParam { .. }
        ));
        assert!(c.check_shared().is_err());
    }

    #[test]
    fn test_custom_format() {
        let mut formats: BTreeMap<String, FormatFn> = BTreeMap::new();
        formats.insert("even".into(), Arc::new(|s: &str| s.len() % 2 == 0));
        let c = SchemaCompiler::new(DocMap::new(), formats);
        let validator = c.compile(&json!({"code?even": null})).unwrap();
        assert!(validator.validate(json!({"code": "ab"})).is_ok());
        assert!(validator.validate(json!({"code": "abc"})).is_err());
    }
}
