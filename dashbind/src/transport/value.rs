use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of wire kinds a topic can carry.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    Double,
    String,
    Raw,
    BooleanArray,
    IntegerArray,
    FloatArray,
    DoubleArray,
    StringArray,
}

impl ValueKind {
    /// Type string announced to the dashboard when a topic is published
    pub fn type_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Raw => "raw",
            Self::BooleanArray => "boolean[]",
            Self::IntegerArray => "int[]",
            Self::FloatArray => "float[]",
            Self::DoubleArray => "double[]",
            Self::StringArray => "string[]",
        }
    }

    /// The value substituted for a topic that has never been written
    pub fn default_value(self) -> Value {
        match self {
            Self::Boolean => Value::Boolean(false),
            Self::Integer => Value::Integer(0),
            Self::Float => Value::Float(0.0),
            Self::Double => Value::Double(0.0),
            Self::String => Value::String(String::new()),
            Self::Raw => Value::Raw(Vec::new()),
            Self::BooleanArray => Value::BooleanArray(Vec::new()),
            Self::IntegerArray => Value::IntegerArray(Vec::new()),
            Self::FloatArray => Value::FloatArray(Vec::new()),
            Self::DoubleArray => Value::DoubleArray(Vec::new()),
            Self::StringArray => Value::StringArray(Vec::new()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_str())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f32),
    Double(f64),
    String(String),
    Raw(Vec<u8>),
    BooleanArray(Vec<bool>),
    IntegerArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::Raw(_) => ValueKind::Raw,
            Self::BooleanArray(_) => ValueKind::BooleanArray,
            Self::IntegerArray(_) => ValueKind::IntegerArray,
            Self::FloatArray(_) => ValueKind::FloatArray,
            Self::DoubleArray(_) => ValueKind::DoubleArray,
            Self::StringArray(_) => ValueKind::StringArray,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_value_matches_kind() {
        let kinds = [
            ValueKind::Boolean,
            ValueKind::Integer,
            ValueKind::Float,
            ValueKind::Double,
            ValueKind::String,
            ValueKind::Raw,
            ValueKind::BooleanArray,
            ValueKind::IntegerArray,
            ValueKind::FloatArray,
            ValueKind::DoubleArray,
            ValueKind::StringArray,
        ];
        for kind in kinds {
            assert_eq!(kind.default_value().kind(), kind);
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_string(&Value::Double(1.5)).unwrap();
        assert_eq!(json, r#"{"type":"double","value":1.5}"#);

        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Double(1.5));
    }
}
