//! generic value representation
//!
//! This is the untyped tree a yaml decoder hands us. It contains the following data types
//! - null
//! - boolean (true/false)
//! - integer (signed, i128, wide enough for every i64 and u64)
//! - decimal (f64)
//! - string (utf-8)
//! - sequence (ordered list of values)
//! - mapping (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Additionally:
//! - mapping keys that are scalars (numbers, booleans, null) are turned into strings
//! - yaml tags are dropped, only the tagged value is kept
//!
use indexmap::IndexMap;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// All possible value types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i128),
    Decimal(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Short name of the structural shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Decode a yaml document into a value
    pub fn from_yaml_str(document: &str) -> Result<Self, crate::error::Error> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(document)?;
        Value::try_from(yaml)
    }
}

impl std::fmt::Display for Value {
    /// Compact single line rendering (json syntax)
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(value: IndexMap<K, V>) -> Self {
        Value::Mapping(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl From<serde_yaml::Number> for Value {
    fn from(value: serde_yaml::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return int.into();
        }
        if let Some(int) = value.as_u64() {
            return int.into();
        }

        Value::Decimal(value.as_f64().unwrap_or(f64::NAN))
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = crate::error::Error;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value as Yaml;

        Ok(match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => b.into(),
            Yaml::Number(n) => n.into(),
            Yaml::String(s) => s.into(),
            Yaml::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Yaml::Mapping(mapping) => {
                let mut entries = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    entries.insert(mapping_key(key)?, Value::try_from(value)?);
                }
                Value::Mapping(entries)
            }
            Yaml::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

fn mapping_key(key: serde_yaml::Value) -> Result<String, crate::error::Error> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => mapping_key(tagged.value),
        other => Err(crate::error::Error::UnsupportedKey(format!("{other:?}"))),
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => {
                if let Ok(int) = i64::try_from(*value) {
                    serializer.serialize_i64(int)
                } else if let Ok(int) = u64::try_from(*value) {
                    serializer.serialize_u64(int)
                } else {
                    serializer.serialize_i128(*value)
                }
            }
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Sequence(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Mapping(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_nested_document() {
        let value = Value::from_yaml_str(
            r#"
            name: server
            port: 8080
            ratio: 0.5
            enabled: true
            missing: ~
            tags: [a, b]
            "#,
        )
        .unwrap();

        let mut expected = IndexMap::new();
        expected.insert("name".to_string(), Value::from("server"));
        expected.insert("port".to_string(), Value::Integer(8080));
        expected.insert("ratio".to_string(), Value::Decimal(0.5));
        expected.insert("enabled".to_string(), Value::Boolean(true));
        expected.insert("missing".to_string(), Value::Null);
        expected.insert("tags".to_string(), Value::from(vec!["a", "b"]));

        assert_eq!(value, Value::Mapping(expected));
    }

    #[test]
    fn scalar_keys_become_strings() {
        let value = Value::from_yaml_str("1: one\ntrue: yes").unwrap();
        let keys: Vec<_> = value.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["1".to_string(), "true".to_string()]);
    }

    #[test]
    fn sequence_keys_are_rejected() {
        let err = Value::from_yaml_str("? [a, b]\n: value").unwrap_err();
        assert!(matches!(err, crate::error::Error::UnsupportedKey(_)));
    }

    #[test]
    fn unsigned_integers_keep_their_precision() {
        let document = "big: 18446744073709551615\nsmall: -9223372036854775808\n";
        let value = Value::from_yaml_str(document).unwrap();
        let entries = value.as_mapping().unwrap();

        assert_eq!(entries["big"], Value::Integer(u64::MAX.into()));
        assert_eq!(entries["small"], Value::Integer(i64::MIN.into()));
        assert_eq!(serde_yaml::to_string(&value).unwrap(), document);
    }

    #[test]
    fn display_is_compact() {
        let value = Value::from(vec![Value::Integer(1), Value::from("two"), Value::Null]);
        assert_eq!(value.to_string(), r#"[1,"two",null]"#);
    }
}
