use serde_json::{Map, Value};

/// Shape a value that already passed validation.
///
/// Objects keep only declared properties, in declaration order. Absent properties
/// (and explicit nulls) take their `default`. Without a default, an absent
/// property becomes `null` only if its schema accepts `null`; otherwise it stays
/// absent, so the shaped value still satisfies the schema.
pub(crate) fn shape(schema: &Value, value: Value) -> Value {
    match value {
        Value::Object(mut fields) => {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                return Value::Object(fields);
            };
            let required = required_names(schema);
            let mut shaped = Map::new();
            for (name, property) in properties {
                let given = fields
                    .remove(name)
                    .filter(|v| !(v.is_null() && property.get("default").is_some()));
                let value = match given {
                    Some(value) => shape(property, value),
                    None => match property.get("default") {
                        Some(default) => default.clone(),
                        None if required.contains(&name.as_str()) => continue,
                        None if accepts_null(property) => Value::Null,
                        None => continue,
                    },
                };
                shaped.insert(name.clone(), value);
            }
            Value::Object(shaped)
        }
        Value::Array(items) => match schema.get("items") {
            Some(item) => Value::Array(items.into_iter().map(|v| shape(item, v)).collect()),
            None => Value::Array(items),
        },
        other => other,
    }
}

fn required_names(schema: &Value) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Convert form fields (always text) to the scalar types their properties declare.
///
/// Values that do not convert are left as text so that validation reports them.
pub(crate) fn coerce_form(schema: &Value, fields: Map<String, Value>) -> Map<String, Value> {
    let properties = schema.get("properties").and_then(Value::as_object);
    fields
        .into_iter()
        .map(|(name, value)| {
            let coerced = match (&value, properties.and_then(|p| p.get(&name))) {
                (Value::String(raw), Some(property)) => decode_form_value(raw, property),
                _ => value,
            };
            (name, coerced)
        })
        .collect()
}

fn decode_form_value(raw: &str, schema: &Value) -> Value {
    if raw.is_empty() && is_nullable(schema) {
        return Value::Null;
    }
    let text = || Value::String(raw.to_string());
    match primary_type(schema) {
        Some("array") => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| match schema.get("items") {
                    Some(items) => decode_form_value(part, items),
                    None => Value::String(part.to_string()),
                })
                .collect(),
        ),
        Some("object") => serde_json::from_str(raw).unwrap_or_else(|_| text()),
        Some("integer") => raw.parse::<i64>().map(Value::from).unwrap_or_else(|_| text()),
        Some("number") => raw.parse::<f64>().map(Value::from).unwrap_or_else(|_| text()),
        Some("boolean") => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Value::Bool(true),
            "false" | "0" | "no" | "off" => Value::Bool(false),
            _ => text(),
        },
        _ => text(),
    }
}

fn primary_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(ty) => Some(ty.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ => None,
    }
}

/// An untyped schema (`any`) accepts every value, `null` included.
fn accepts_null(schema: &Value) -> bool {
    schema.get("type").is_none() || is_nullable(schema)
}

fn is_nullable(schema: &Value) -> bool {
    match schema.get("type") {
        Some(Value::Array(types)) => types.iter().any(|ty| ty == "null"),
        Some(Value::String(ty)) => ty == "null",
        _ => false,
    }
}
