use serde_json::{Map, Value, json};

/// Builds a plausible request body from a JSON schema.
///
/// Only `properties` are walked. Properties of an unknown type are left out,
/// and a `$ref` anywhere yields a generic placeholder object.
pub fn payload_from_schema(schema: Option<&Value>) -> Value {
    match schema {
        Some(schema) => object_from_schema(schema),
        None => Value::Object(Map::new()),
    }
}

fn object_from_schema(schema: &Value) -> Value {
    if schema.get("$ref").is_some() {
        return json!({ "example": "value" });
    }

    let mut data = Map::new();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (field, property) in properties {
            if let Some(value) = value_for_property(field, property) {
                data.insert(field.clone(), value);
            }
        }
    }
    Value::Object(data)
}

fn value_for_property(field: &str, property: &Value) -> Option<Value> {
    if property.get("$ref").is_some() {
        return Some(json!({ "example": "value" }));
    }
    match property.get("type").and_then(Value::as_str) {
        Some("string") => Some(Value::String(format!("test_{}", field))),
        Some("number") | Some("integer") => Some(json!(123)),
        Some("boolean") => Some(Value::Bool(true)),
        Some("array") => Some(json!(["item1", "item2"])),
        Some("object") => Some(object_from_schema(property)),
        None if property.get("properties").is_some() => Some(object_from_schema(property)),
        _ => None,
    }
}
