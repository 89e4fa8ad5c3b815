//! Per-column text filters

use std::collections::HashMap;

use super::column::ColumnSet;
use crate::model::Row;

/// Per-column substring filters.
///
/// Matching is case-insensitive: a row passes a filter when the column's
/// displayed value, lowercased, contains the lowercased filter text. A row
/// is visible when it passes every filter. Setting an empty filter text
/// removes the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: HashMap<String, String>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or with empty `value`, removes) the filter for `field`.
    ///
    /// Returns `true` if the filter set changed.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> bool {
        let field = field.into();
        let value = value.into();

        if value.is_empty() {
            return self.filters.remove(&field).is_some();
        }
        match self.filters.get(&field) {
            Some(current) if *current == value => false,
            _ => {
                self.filters.insert(field, value);
                true
            }
        }
    }

    /// Returns the filter text for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.filters.get(field).map(String::as_str)
    }

    /// Removes all filters. Returns `true` if any filter was removed.
    pub fn clear(&mut self) -> bool {
        let had_filters = !self.filters.is_empty();
        self.filters.clear();
        had_filters
    }

    /// Returns `true` if no filter is active.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of active filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if `row` passes every filter.
    pub(crate) fn matches(&self, row: &Row, columns: &ColumnSet) -> bool {
        self.filters.iter().all(|(field, needle)| {
            let haystack = columns.value(row, field).to_string().to_lowercase();
            haystack.contains(&needle.to_lowercase())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnDef;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDef::new("origin", "Origin"),
            ColumnDef::new("destination", "Destination"),
        ])
    }

    #[test]
    fn test_set_and_clear() {
        let mut filters = FilterSet::new();
        assert!(filters.set("origin", "NY"));
        assert!(!filters.set("origin", "NY"));
        assert_eq!(filters.get("origin"), Some("NY"));

        assert!(filters.set("origin", ""));
        assert!(filters.is_empty());
        assert!(!filters.set("origin", ""));
    }

    #[test]
    fn test_matches_case_insensitive_substring() {
        let mut filters = FilterSet::new();
        filters.set("origin", "ny");

        let nyc = Row::new("1").set("origin", "NYC");
        let lax = Row::new("2").set("origin", "LAX");
        let none = Row::new("3");

        assert!(filters.matches(&nyc, &columns()));
        assert!(!filters.matches(&lax, &columns()));
        assert!(!filters.matches(&none, &columns()));
    }

    #[test]
    fn test_all_filters_must_match() {
        let mut filters = FilterSet::new();
        filters.set("origin", "NYC");
        filters.set("destination", "PAR");

        let row = Row::new("1").set("origin", "NYC").set("destination", "LON");
        assert!(!filters.matches(&row, &columns()));
        assert!(FilterSet::new().matches(&row, &columns()));
    }
}
