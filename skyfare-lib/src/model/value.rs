//! Value enum for dynamic field values

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// A dynamic value held by a [`Row`](super::Row) field.
///
/// Values mirror the shapes a JSON API response can take. Nested objects are
/// kept as [`Value::Object`] so columns can address them by path
/// (`price.total`).
///
/// # Example
///
/// ```
/// use skyfare_lib::model::Value;
///
/// let origin = Value::from("NYC");
/// let seats = Value::from(4i64);
/// let empty = Value::Null;
///
/// assert_eq!(origin.to_string(), "NYC");
/// assert!(empty.is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested object.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested object if this is an object value.
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Follows a dotted path (`price.total`) through nested objects.
    ///
    /// An empty path returns `self`.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            _ => None,
        })
    }

    /// Returns a copy of `self` with the value at `path` replaced.
    ///
    /// Missing intermediate objects are created; a non-object value on the
    /// path is replaced by an object.
    pub fn with_pointer(&self, path: &str, value: Value) -> Value {
        match path.split_once('.') {
            None if path.is_empty() => value,
            None => {
                let mut map = self.as_object().cloned().unwrap_or_default();
                map.insert(path.to_string(), value);
                Value::Object(map)
            }
            Some((head, rest)) => {
                let mut map = self.as_object().cloned().unwrap_or_default();
                let child = map.get(head).cloned().unwrap_or(Value::Null);
                map.insert(head.to_string(), child.with_pointer(rest, value));
                Value::Object(map)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(_) | Value::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

// Deserialization goes through serde_json::Value so that JSON strings stay
// strings instead of being claimed by an earlier untagged variant.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(total: &str) -> Value {
        Value::from(BTreeMap::from([("total".to_string(), Value::from(total))]))
    }

    #[test]
    fn test_pointer_nested() {
        let value = price("120.50");
        assert_eq!(value.pointer("total"), Some(&Value::from("120.50")));
        assert_eq!(value.pointer("total.cents"), None);
        assert_eq!(value.pointer(""), Some(&value));
    }

    #[test]
    fn test_with_pointer_leaves_original_untouched() {
        let original = price("100");
        let updated = original.with_pointer("total", Value::from("150"));

        assert_eq!(original.pointer("total"), Some(&Value::from("100")));
        assert_eq!(updated.pointer("total"), Some(&Value::from("150")));
    }

    #[test]
    fn test_with_pointer_creates_missing_objects() {
        let updated = Value::Null.with_pointer("links.flightOffers", Value::from("x"));
        assert_eq!(updated.pointer("links.flightOffers"), Some(&Value::from("x")));
    }

    #[test]
    fn test_deserialize_keeps_strings() {
        let value: Value = serde_json::from_str(r#"{"total": "150.00", "count": 3}"#).unwrap();
        assert_eq!(value.pointer("total"), Some(&Value::from("150.00")));
        assert_eq!(value.pointer("count"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("LAX").to_string(), "LAX");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(price("9").to_string(), r#"{"total":"9"}"#);
    }
}
