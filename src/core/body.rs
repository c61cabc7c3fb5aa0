use crate::domain::model::{FieldDefinition, FieldKind};
use crate::utils::error::{ReplayError, Result};
use serde_json::{Map, Value};

/// A body field's declared value after parsing it according to its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    String(String),
    StringArray(Vec<String>),
    Integer(i64),
    Unsigned(u64),
}

impl FieldValue {
    pub fn resolve(field: &FieldDefinition) -> Result<Self> {
        match field.kind {
            FieldKind::Boolean => match field.raw_value.as_str() {
                "true" => Ok(FieldValue::Bool(true)),
                "false" => Ok(FieldValue::Bool(false)),
                other => Err(serialization_error(
                    field,
                    format!("expected 'true' or 'false', got '{}'", other),
                )),
            },
            FieldKind::String => Ok(FieldValue::String(field.raw_value.clone())),
            FieldKind::StringArray => Ok(FieldValue::StringArray(field.raw_values.clone())),
            FieldKind::Integer(_) => parse_integer(field),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::String(s) => Value::String(s),
            FieldValue::StringArray(items) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
            FieldValue::Integer(i) => Value::Number(i.into()),
            FieldValue::Unsigned(u) => Value::Number(u.into()),
        }
    }
}

// Width is not checked: every integer kind accepts the full i64/u64 range.
fn parse_integer(field: &FieldDefinition) -> Result<FieldValue> {
    let raw = field.raw_value.as_str();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(FieldValue::Integer(value));
    }
    raw.parse::<u64>()
        .map(FieldValue::Unsigned)
        .map_err(|e| serialization_error(field, format!("'{}' is not an integer: {}", raw, e)))
}

fn serialization_error(field: &FieldDefinition, reason: String) -> ReplayError {
    ReplayError::FieldSerializationError {
        field: field_label(field).to_string(),
        kind: field.kind.to_string(),
        reason,
    }
}

fn field_label(field: &FieldDefinition) -> &str {
    if field.name.is_empty() {
        &field.json_key
    } else {
        &field.name
    }
}

/// Builds the ordered JSON object for a request body. Keys keep declaration order.
pub fn to_object(fields: &[FieldDefinition]) -> Result<Map<String, Value>> {
    let mut object = Map::with_capacity(fields.len());

    for field in fields {
        let value = FieldValue::resolve(field)?;
        if object.contains_key(&field.json_key) {
            return Err(serialization_error(
                field,
                format!("json key '{}' is already used in this body", field.json_key),
            ));
        }
        object.insert(field.json_key.clone(), value.into());
    }

    Ok(object)
}

pub fn serialize(fields: &[FieldDefinition]) -> Result<Vec<u8>> {
    let object = to_object(fields)?;
    let bytes = serde_json::to_vec(&Value::Object(object))?;
    tracing::trace!("Serialized {} body fields ({} bytes)", fields.len(), bytes.len());
    Ok(bytes)
}
