//! Column definitions and per-column behavior

use std::fmt;
use std::sync::Arc;

use crate::model::Row;
use crate::model::Value;

/// Per-column hooks for reading, writing and rendering a cell.
///
/// Every hook has a default, so a behavior only overrides what it
/// customizes:
///
/// - [`value`](ColumnBehavior::value) reads the cell's displayed value
///   (default: the row's field of the same name).
/// - [`set_value`](ColumnBehavior::set_value) produces the edited row
///   (default: a shallow merge that replaces only the named field).
/// - [`render`](ColumnBehavior::render) formats the value for display
///   (default: the value's `Display`).
///
/// Implementations must not mutate the input row; they return a new one.
pub trait ColumnBehavior: Send + Sync + fmt::Debug {
    /// Returns the value displayed in this column for `row`.
    fn value(&self, row: &Row, field: &str) -> Value {
        row.get(field).cloned().unwrap_or_default()
    }

    /// Returns a copy of `row` with the cell set to `value`.
    fn set_value(&self, row: &Row, field: &str, value: Value) -> Row {
        row.merged(field, value)
    }

    /// Formats a cell value. `edited` is `true` for unsaved cells.
    fn render(&self, value: &Value, _row: &Row, _edited: bool) -> String {
        value.to_string()
    }
}

/// The default behavior: reads and writes the field of the same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldBehavior;

impl ColumnBehavior for FieldBehavior {}

/// Reads and writes a value nested inside the column's field.
///
/// A `price` column with `PathBehavior::new("total")` displays
/// `row.price.total` and writes edits back into that nested slot, leaving
/// the rest of the `price` object untouched.
#[derive(Debug, Clone)]
pub struct PathBehavior {
    path: String,
}

impl PathBehavior {
    /// Creates a behavior for the dotted `path` below the column's field.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the nested path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ColumnBehavior for PathBehavior {
    fn value(&self, row: &Row, field: &str) -> Value {
        row.get(field)
            .and_then(|v| v.pointer(&self.path))
            .cloned()
            .unwrap_or_default()
    }

    fn set_value(&self, row: &Row, field: &str, value: Value) -> Row {
        let current = row.get(field).cloned().unwrap_or_default();
        row.merged(field, current.with_pointer(&self.path, value))
    }
}

/// A table column: the field it addresses, its header label and its
/// behavior.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    field: String,
    header_name: String,
    behavior: Arc<dyn ColumnBehavior>,
}

impl ColumnDef {
    /// Creates a column with the default [`FieldBehavior`].
    pub fn new(field: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header_name: header_name.into(),
            behavior: Arc::new(FieldBehavior),
        }
    }

    /// Replaces the column's behavior.
    pub fn with_behavior(mut self, behavior: impl ColumnBehavior + 'static) -> Self {
        self.behavior = Arc::new(behavior);
        self
    }

    /// Returns the field name (the column id).
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the header label.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Returns the displayed value of this column for `row`.
    pub fn value(&self, row: &Row) -> Value {
        self.behavior.value(row, &self.field)
    }

    /// Returns a copy of `row` with this column's cell set to `value`.
    pub fn set_value(&self, row: &Row, value: Value) -> Row {
        self.behavior.set_value(row, &self.field, value)
    }

    /// Renders this column's cell for `row`.
    pub fn render(&self, row: &Row, edited: bool) -> String {
        self.behavior.render(&self.value(row), row, edited)
    }
}

/// The column definitions of one table, in definition order.
#[derive(Debug, Clone, Default)]
pub(crate) struct ColumnSet {
    columns: Vec<ColumnDef>,
}

impl ColumnSet {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    pub fn get(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn as_slice(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.field.as_str())
    }

    /// Displayed value of `field` for `row`, falling back to the raw field
    /// when no column is defined for it.
    pub fn value(&self, row: &Row, field: &str) -> Value {
        match self.get(field) {
            Some(column) => column.value(row),
            None => FieldBehavior.value(row, field),
        }
    }
}
