use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One request template from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefinition {
    pub name: String,
    pub uri: String,
    pub method: String,
    #[serde(default)]
    pub query: Vec<QueryParam>,
    #[serde(default, rename = "desc")]
    pub description: String,
    #[serde(default)]
    pub body: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: String,
}

/// A typed body field. `raw_value` is read for scalar kinds, `raw_values` for string arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "json")]
    pub json_key: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, rename = "value", deserialize_with = "scalar_as_string")]
    pub raw_value: String,
    #[serde(default, rename = "stringArray")]
    pub raw_values: Vec<String>,
    #[serde(default, rename = "desc")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(default, rename = "validate")]
    pub validation_rule: String,
}

impl FieldDefinition {
    pub fn new(json_key: &str, kind: FieldKind, raw_value: &str) -> Self {
        Self {
            name: json_key.to_string(),
            json_key: json_key.to_string(),
            kind,
            raw_value: raw_value.to_string(),
            raw_values: Vec::new(),
            description: String::new(),
            example: None,
            validation_rule: String::new(),
        }
    }

    pub fn string_array(json_key: &str, values: &[&str]) -> Self {
        Self {
            raw_values: values.iter().map(|v| v.to_string()).collect(),
            ..Self::new(json_key, FieldKind::StringArray, "")
        }
    }
}

/// Declared numeric sub-kind. Parsing ignores it; it is kept for messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerKind {
    Number,
    Int,
    Int8,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint32,
    Uint64,
}

impl IntegerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegerKind::Number => "number",
            IntegerKind::Int => "int",
            IntegerKind::Int8 => "int8",
            IntegerKind::Int32 => "int32",
            IntegerKind::Int64 => "int64",
            IntegerKind::Uint => "uint",
            IntegerKind::Uint8 => "uint8",
            IntegerKind::Uint32 => "uint32",
            IntegerKind::Uint64 => "uint64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldKind {
    Boolean,
    String,
    StringArray,
    Integer(IntegerKind),
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "bool",
            FieldKind::String => "string",
            FieldKind::StringArray => "stringArray",
            FieldKind::Integer(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "bool" | "boolean" => FieldKind::Boolean,
            "string" => FieldKind::String,
            "stringArray" | "string-array" => FieldKind::StringArray,
            "number" => FieldKind::Integer(IntegerKind::Number),
            "int" | "integer" => FieldKind::Integer(IntegerKind::Int),
            "int8" => FieldKind::Integer(IntegerKind::Int8),
            "int32" => FieldKind::Integer(IntegerKind::Int32),
            "int64" => FieldKind::Integer(IntegerKind::Int64),
            "uint" => FieldKind::Integer(IntegerKind::Uint),
            "uint8" => FieldKind::Integer(IntegerKind::Uint8),
            "uint32" => FieldKind::Integer(IntegerKind::Uint32),
            "uint64" => FieldKind::Integer(IntegerKind::Uint64),
            other => return Err(format!("unknown field type '{}'", other)),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for FieldKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

struct ScalarText;

impl<'de> Visitor<'de> for ScalarText {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a scalar value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

/// Reads a scalar as the text the author wrote. YAML plain scalars arrive verbatim
/// (`1.50` stays `1.50`); typed TOML values fall back to their display form.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(ScalarText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_spellings() {
        assert_eq!("bool".parse::<FieldKind>().unwrap(), FieldKind::Boolean);
        assert_eq!("stringArray".parse::<FieldKind>().unwrap(), FieldKind::StringArray);
        assert_eq!(
            "uint32".parse::<FieldKind>().unwrap(),
            FieldKind::Integer(IntegerKind::Uint32)
        );
        assert!("float".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_field_definition_from_yaml() {
        let yaml = r#"
name: user age
type: int32
value: 42
json: age
desc: age in years
example: 30
validate: min=0
"#;
        let field: FieldDefinition = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(field.json_key, "age");
        assert_eq!(field.kind, FieldKind::Integer(IntegerKind::Int32));
        assert_eq!(field.raw_value, "42");
        assert_eq!(field.validation_rule, "min=0");
        assert_eq!(field.example, Some(serde_json::json!(30)));
    }

    #[test]
    fn test_yaml_scalars_keep_their_text() {
        for (raw, expected) in [
            ("1.50", "1.50"),
            ("1e3", "1e3"),
            ("0x1F", "0x1F"),
            ("5.0", "5.0"),
            ("007", "007"),
            ("yes", "yes"),
            ("\"quoted\"", "quoted"),
        ] {
            let yaml = format!("type: string\njson: zip\nvalue: {}", raw);
            let field: FieldDefinition = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(field.raw_value, expected, "value: {}", raw);
        }
    }

    #[test]
    fn test_missing_value_reads_as_empty() {
        let field: FieldDefinition = serde_yaml::from_str("type: string\njson: zip").unwrap();
        assert_eq!(field.raw_value, "");
    }

    #[test]
    fn test_toml_typed_scalars_read_as_text() {
        let toml_content = r#"
type = "int"
json = "count"
value = 5
"#;
        let field: FieldDefinition = toml::from_str(toml_content).unwrap();
        assert_eq!(field.raw_value, "5");

        let flag: FieldDefinition =
            toml::from_str("type = \"bool\"\njson = \"on\"\nvalue = true").unwrap();
        assert_eq!(flag.raw_value, "true");
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        let yaml = r#"
type: float64
value: "1.5"
json: ratio
"#;
        let err = serde_yaml::from_str::<FieldDefinition>(yaml).unwrap_err();
        assert!(err.to_string().contains("float64"));
    }
}
