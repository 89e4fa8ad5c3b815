//! Dynamic table row

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::Value;
use crate::error::FieldError;

/// Caller-assigned stable identifier of a [`Row`].
///
/// Row identity is defined solely by this id: two rows with equal ids are the
/// same logical row regardless of their field contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a new row id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A dynamic table row.
///
/// Rows hold field values as a `HashMap<String, Value>` keyed by field name.
/// Field order is irrelevant. Typed getters return [`FieldError`] when a
/// field is missing or holds a different type.
///
/// # Example
///
/// ```
/// use skyfare_lib::model::Row;
///
/// let row = Row::new("A")
///     .set("origin", "NYC")
///     .set("price", "100");
///
/// assert_eq!(row.id().as_str(), "A");
/// assert_eq!(row.get_string("origin").unwrap(), Some("NYC"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    id: RowId,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl Row {
    /// Creates a new empty row with the given id.
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Creates a row from an id and a prepared field map.
    pub fn with_fields(id: impl Into<RowId>, fields: HashMap<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the row id.
    pub fn id(&self) -> &RowId {
        &self.id
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Follows a dotted path whose first segment is a field name.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            None => self.fields.get(path),
            Some((field, rest)) => self.fields.get(field)?.pointer(rest),
        }
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Consumes the row and returns its fields.
    pub fn into_fields(self) -> HashMap<String, Value> {
        self.fields
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns a copy of this row with only `field` replaced.
    ///
    /// This is the shallow merge used for cell edits when a column defines
    /// no custom setter.
    pub fn merged(&self, field: &str, value: Value) -> Row {
        let mut fields = self.fields.clone();
        fields.insert(field.to_string(), value);
        Row {
            id: self.id.clone(),
            fields,
        }
    }

    /// Returns a copy of this row with the value at a dotted path replaced.
    pub fn merged_path(&self, path: &str, value: Value) -> Row {
        match path.split_once('.') {
            None => self.merged(path, value),
            Some((field, rest)) => {
                let current = self.fields.get(field).cloned().unwrap_or_default();
                self.merged(field, current.with_pointer(rest, value))
            }
        }
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.get_path(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(
                field,
                "string",
                other.type_name(),
            )),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.get_path(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(FieldError::type_mismatch(field, "bool", other.type_name())),
        }
    }

    /// Gets an i64 field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.get_path(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(FieldError::type_mismatch(field, "int", other.type_name())),
        }
    }

    /// Gets an f64 field value.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.get_path(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Float(n)) => Ok(Some(*n)),
            Some(Value::Int(n)) => Ok(Some(*n as f64)), // Allow widening
            Some(other) => Err(FieldError::type_mismatch(field, "float", other.type_name())),
        }
    }

    /// Gets a required string field, treating null like a missing field.
    pub fn require_string(&self, field: &str) -> Result<String, FieldError> {
        self.get_string(field)?
            .map(str::to_string)
            .ok_or_else(|| FieldError::missing(field))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn offer() -> Row {
        let price = BTreeMap::from([("total".to_string(), Value::from("100"))]);
        Row::new("A").set("origin", "NYC").set("price", price)
    }

    #[test]
    fn test_merged_replaces_only_named_field() {
        let row = offer();
        let edited = row.merged("origin", Value::from("BOS"));

        assert_eq!(edited.get_string("origin").unwrap(), Some("BOS"));
        assert_eq!(edited.get_path("price.total"), row.get_path("price.total"));
        assert_eq!(row.get_string("origin").unwrap(), Some("NYC"));
        assert_eq!(edited.id(), row.id());
    }

    #[test]
    fn test_merged_path() {
        let edited = offer().merged_path("price.total", Value::from("175"));
        assert_eq!(edited.get_string("price.total").unwrap(), Some("175"));
    }

    #[test]
    fn test_typed_getter_errors() {
        let row = offer().set("stops", 1i64).set("note", Value::Null);

        assert!(matches!(
            row.get_string("missing"),
            Err(FieldError::Missing { .. })
        ));
        assert!(matches!(
            row.get_string("stops"),
            Err(FieldError::TypeMismatch { expected: "string", actual: "int", .. })
        ));
        assert_eq!(row.get_string("note").unwrap(), None);
        assert!(row.require_string("note").is_err());
        assert_eq!(row.get_float("stops").unwrap(), Some(1.0));
    }
}
