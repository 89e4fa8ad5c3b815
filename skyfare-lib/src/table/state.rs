//! Editable table state
//!
//! [`TableState`] owns the canonical row collection together with the edit
//! tracking, column order, filters and pagination of one table. All mutation
//! goes through `&mut self`; stale references (unknown row ids or fields)
//! degrade to no-ops and are logged at `debug` level.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::debug;
use log::warn;

use super::column::ColumnDef;
use super::column::ColumnSet;
use super::filter::FilterSet;
use super::pagination::PageSummary;
use super::pagination::PaginationState;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Value;

/// Identifies one cell by row id and column field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row_id: RowId,
    pub field: String,
}

impl CellKey {
    /// Creates a new cell key.
    pub fn new(row_id: impl Into<RowId>, field: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row_id, self.field)
    }
}

/// State of an editable, column-reorderable table.
///
/// # Example
///
/// ```
/// use skyfare_lib::model::Row;
/// use skyfare_lib::table::{ColumnDef, TableState};
///
/// let mut table = TableState::new(vec![
///     ColumnDef::new("origin", "Origin"),
///     ColumnDef::new("price", "Price"),
/// ]);
/// table.ingest(vec![Row::new("A").set("origin", "NYC").set("price", "100")]);
///
/// table.update_cell("A", "price", "175");
/// assert_eq!(table.dirty_count(), 1);
/// assert_eq!(table.render_cell(table.row("A").unwrap(), "price"), "175");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableState {
    columns: ColumnSet,
    column_order: Vec<String>,
    rows: Vec<Arc<Row>>,
    positions: HashMap<RowId, usize>,
    dirty: HashSet<CellKey>,
    filters: FilterSet,
    pagination: PaginationState,
    generation: u64,
}

impl TableState {
    /// Creates an empty table with the given columns.
    ///
    /// The initial column order is the definition order. Columns repeating an
    /// earlier field are dropped.
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        let mut unique: Vec<ColumnDef> = Vec::with_capacity(columns.len());
        for column in columns {
            if unique.iter().any(|c| c.field() == column.field()) {
                debug!("Ignoring duplicate column definition: {}", column.field());
                continue;
            }
            unique.push(column);
        }
        let column_order = unique.iter().map(|c| c.field().to_string()).collect();

        Self {
            columns: ColumnSet::new(unique),
            column_order,
            ..Default::default()
        }
    }

    /// Sets the initial page size (builder pattern).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pagination = PaginationState::new(page_size);
        self
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Replaces the row collection.
    ///
    /// Ingesting an empty collection into an empty table changes nothing.
    /// Otherwise the rows are replaced, all unsaved edit markers are
    /// discarded, the generation is bumped and the page index resets.
    ///
    /// Returns `true` if the table changed.
    pub fn ingest(&mut self, rows: Vec<Row>) -> bool {
        if rows.is_empty() && self.rows.is_empty() {
            debug!("Ignoring empty ingest into empty table");
            return false;
        }

        if !self.dirty.is_empty() {
            debug!("Ingest discards {} unsaved cell edits", self.dirty.len());
        }

        self.rows = rows.into_iter().map(Arc::new).collect();
        self.positions.clear();
        for (index, row) in self.rows.iter().enumerate() {
            self.positions.entry(row.id().clone()).or_insert(index);
        }
        self.dirty.clear();
        self.generation += 1;
        self.pagination.page_index = 0;
        true
    }

    /// Applies a cell edit.
    ///
    /// The new row is produced by the column's `set_value` hook (a shallow
    /// merge when no column is defined for `field`) and replaces the old row;
    /// the previous row object is left untouched. Unknown row ids are
    /// ignored.
    ///
    /// Returns `true` if the edit was applied.
    pub fn update_cell(&mut self, row_id: &str, field: &str, value: impl Into<Value>) -> bool {
        let Some(&index) = self.positions.get(row_id) else {
            debug!("Ignoring edit of {}-{}: unknown row", row_id, field);
            return false;
        };

        let current = &self.rows[index];
        let value = value.into();
        let updated = match self.columns.get(field) {
            Some(column) => column.set_value(current, value),
            None => current.merged(field, value),
        };

        if updated.id() != current.id() {
            warn!(
                "Rejecting edit of {}-{}: column behavior changed the row id",
                row_id, field
            );
            return false;
        }

        let key = CellKey::new(current.id().clone(), field);
        self.rows[index] = Arc::new(updated);
        self.dirty.insert(key);
        true
    }

    /// Returns the row with the given id.
    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.positions
            .get(row_id)
            .map(|&index| self.rows[index].as_ref())
    }

    /// Returns all rows in collection order, ignoring filters and pagination.
    pub fn rows(&self) -> impl Iterator<Item = &Row> + Clone + '_ {
        self.rows.iter().map(|row| &**row)
    }

    /// Returns the number of rows, ignoring filters.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Incremented by every [`ingest`](Self::ingest) that changes the table.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Edit tracking
    // =========================================================================

    /// Number of distinct cells edited since the last save.
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Returns `true` if the cell has an unsaved edit.
    pub fn is_dirty(&self, row_id: &str, field: &str) -> bool {
        self.dirty.contains(&CellKey::new(row_id, field))
    }

    /// Returns `true` if any cell has an unsaved edit.
    pub fn has_edits(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Iterates over the cells with unsaved edits, in no particular order.
    pub fn dirty_cells(&self) -> impl Iterator<Item = &CellKey> {
        self.dirty.iter()
    }

    /// Drains the edit markers and snapshots the rows they point at.
    ///
    /// Returns one row per distinct dirty row id, in collection order, and
    /// the drained cell keys. Keys of rows no longer present are dropped.
    pub(super) fn take_dirty(&mut self) -> (Vec<Row>, Vec<CellKey>) {
        let mut cells: Vec<CellKey> = self.dirty.drain().collect();
        cells.sort();

        let mut pending: HashSet<&RowId> = cells.iter().map(|cell| &cell.row_id).collect();
        let rows = self
            .rows
            .iter()
            .filter(|row| pending.remove(row.id()))
            .map(|row| Row::clone(row))
            .collect();

        for missing in pending {
            debug!("Skipping dirty row {}: no longer present", missing);
        }

        (rows, cells)
    }

    /// Re-marks cells as edited. Cells of rows no longer present are
    /// skipped. Returns the number of cells restored.
    pub(super) fn restore_dirty(&mut self, cells: impl IntoIterator<Item = CellKey>) -> usize {
        let mut restored = 0;
        for cell in cells {
            if !self.positions.contains_key(&cell.row_id) {
                debug!("Not restoring {}: row no longer present", cell);
                continue;
            }
            if self.dirty.insert(cell) {
                restored += 1;
            }
        }
        restored
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Returns the column definitions in definition order.
    pub fn columns(&self) -> &[ColumnDef] {
        self.columns.as_slice()
    }

    /// Returns the column fields in display order.
    pub fn column_order(&self) -> &[String] {
        &self.column_order
    }

    /// Returns the column definitions in display order.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.column_order
            .iter()
            .filter_map(|field| self.columns.get(field))
    }

    /// Replaces the column order.
    ///
    /// Unknown fields and repeats are ignored. Known fields missing from
    /// `order` keep their relative order and are appended, so the result is
    /// always a permutation of the column fields.
    pub fn set_column_order<I>(&mut self, order: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut next: Vec<String> = Vec::with_capacity(self.column_order.len());
        for field in order {
            let field = field.as_ref();
            if !self.columns.contains(field) {
                debug!("Ignoring unknown column in order: {}", field);
            } else if !next.iter().any(|f| f == field) {
                next.push(field.to_string());
            }
        }
        for field in &self.column_order {
            if !next.contains(field) {
                next.push(field.clone());
            }
        }
        self.column_order = next;
    }

    /// Moves column `active` to the position of column `over`.
    ///
    /// Returns `true` if the order changed.
    pub fn move_column(&mut self, active: &str, over: &str) -> bool {
        let position = |field: &str| self.column_order.iter().position(|f| f == field);
        let (Some(from), Some(to)) = (position(active), position(over)) else {
            debug!("Ignoring move of column {} over {}: unknown column", active, over);
            return false;
        };
        if from == to {
            return false;
        }

        let field = self.column_order.remove(from);
        self.column_order.insert(to, field);
        true
    }

    /// Returns the displayed value of a cell.
    pub fn cell_value(&self, row: &Row, field: &str) -> Value {
        self.columns.value(row, field)
    }

    /// Renders a cell through its column's render hook.
    pub fn render_cell(&self, row: &Row, field: &str) -> String {
        let edited = self.is_dirty(row.id().as_str(), field);
        match self.columns.get(field) {
            Some(column) => column.render(row, edited),
            None => self.cell_value(row, field).to_string(),
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Sets the filter text of a column; an empty text removes the filter.
    ///
    /// Resets the page index when the filters change. Returns `true` if they
    /// changed.
    pub fn set_filter(&mut self, field: &str, value: impl Into<String>) -> bool {
        if !self.columns.contains(field) {
            debug!("Ignoring filter on unknown column: {}", field);
            return false;
        }
        let changed = self.filters.set(field, value);
        if changed {
            self.pagination.page_index = 0;
        }
        changed
    }

    /// Removes all filters.
    pub fn clear_filters(&mut self) -> bool {
        let changed = self.filters.clear();
        if changed {
            self.pagination.page_index = 0;
        }
        changed
    }

    /// Returns the active filters.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Iterates over all rows passing the filters, ignoring pagination.
    pub fn filtered_rows(&self) -> impl Iterator<Item = &Row> + Clone + '_ {
        self.rows()
            .filter(move |row| self.filters.matches(row, &self.columns))
    }

    /// Number of rows passing the filters.
    pub fn filtered_len(&self) -> usize {
        self.filtered_rows().count()
    }

    /// Iterates over the rows of the current page after filtering.
    ///
    /// The iterator borrows the table and can be cloned to restart it.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> + Clone + '_ {
        let range = self.pagination.range(self.filtered_len());
        self.filtered_rows().skip(range.start).take(range.len())
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Returns the current pagination state.
    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn page_index(&self) -> usize {
        self.pagination.page_index
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size
    }

    /// Number of pages for the filtered rows.
    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.filtered_len())
    }

    /// Summary of the current page, e.g. "Showing 1 to 10 of 42 results".
    pub fn page_summary(&self) -> PageSummary {
        self.pagination.summary(self.filtered_len())
    }

    /// Moves to page `index`, clamped to the available pages.
    pub fn set_page_index(&mut self, index: usize) {
        let total = self.filtered_len();
        self.pagination.set_page_index(index, total);
    }

    pub fn can_previous_page(&self) -> bool {
        self.pagination.can_previous()
    }

    pub fn can_next_page(&self) -> bool {
        self.pagination.can_next(self.filtered_len())
    }

    /// Moves to the next page. Returns `false` on the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.can_next_page() {
            return false;
        }
        self.pagination.page_index += 1;
        true
    }

    /// Moves to the previous page. Returns `false` on the first page.
    pub fn previous_page(&mut self) -> bool {
        if !self.can_previous_page() {
            return false;
        }
        self.pagination.page_index -= 1;
        true
    }

    /// Changes the page size and returns to the first page.
    ///
    /// A zero size is ignored. Returns `true` if the state changed.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if page_size == 0 {
            debug!("Ignoring zero page size");
            return false;
        }
        let changed = self.pagination.page_size != page_size || self.pagination.page_index != 0;
        self.pagination.page_size = page_size;
        self.pagination.page_index = 0;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::PathBehavior;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("origin", "Origin"),
            ColumnDef::new("destination", "Destination"),
            ColumnDef::new("price", "Price"),
        ]
    }

    fn table() -> TableState {
        let mut table = TableState::new(columns());
        table.ingest(vec![
            Row::new("A").set("origin", "NYC").set("price", "100"),
            Row::new("B").set("origin", "LAX").set("price", "200"),
        ]);
        table
    }

    fn many(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| Row::new(format!("r{i}")).set("origin", format!("O{i}")))
            .collect()
    }

    fn visible_ids(table: &TableState) -> Vec<String> {
        table.visible_rows().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn test_new_uses_definition_order() {
        let table = TableState::new(columns());
        assert_eq!(table.column_order(), ["origin", "destination", "price"]);
        assert_eq!(table.page_size(), 10);
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_ingest_into_empty_table_is_noop() {
        let mut table = TableState::new(columns());
        assert!(!table.ingest(vec![]));
        assert_eq!(table.generation(), 0);
        assert_eq!(table.visible_rows().count(), 0);
    }

    #[test]
    fn test_ingest_clears_edits_and_resets_page() {
        let mut table = TableState::new(columns());
        table.ingest(many(25));
        table.set_page_index(2);
        table.update_cell("r0", "origin", "BOS");
        let generation = table.generation();

        assert!(table.ingest(many(25)));
        assert_eq!(table.dirty_count(), 0);
        assert_eq!(table.page_index(), 0);
        assert_eq!(table.generation(), generation + 1);

        // Replacing with an empty set still clears the table.
        assert!(table.ingest(vec![]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_update_cell_marks_distinct_cells() {
        let mut table = table();
        table.update_cell("A", "price", "150");
        table.update_cell("A", "price", "175");
        table.update_cell("A", "origin", "BOS");
        table.update_cell("B", "price", "250");

        assert_eq!(table.dirty_count(), 3);
        assert!(table.is_dirty("A", "price"));
        assert!(!table.is_dirty("B", "origin"));
        assert_eq!(
            table.row("A").unwrap().get_string("price").unwrap(),
            Some("175")
        );
    }

    #[test]
    fn test_update_unknown_row_is_noop() {
        let mut table = table();
        assert!(!table.update_cell("Z", "price", "1"));
        assert_eq!(table.dirty_count(), 0);
        assert!(!table.has_edits());
    }

    #[test]
    fn test_update_cell_keeps_previous_row_untouched() {
        let mut table = table();
        let before = table.rows[0].clone();
        table.update_cell("A", "price", "175");

        assert_eq!(before.get_string("price").unwrap(), Some("100"));
        assert_eq!(table.row("A").unwrap().get_string("origin").unwrap(), Some("NYC"));
    }

    #[test]
    fn test_update_cell_uses_column_behavior() {
        let mut table = TableState::new(vec![
            ColumnDef::new("price", "Price").with_behavior(PathBehavior::new("total")),
        ]);
        table.ingest(vec![Row::new("A").set(
            "price",
            std::collections::BTreeMap::from([("total".to_string(), Value::from("100"))]),
        )]);

        table.update_cell("A", "price", "175");
        let row = table.row("A").unwrap();
        assert_eq!(row.get_string("price.total").unwrap(), Some("175"));
        assert_eq!(table.render_cell(row, "price"), "175");
    }

    #[test]
    fn test_update_cell_does_not_reset_page() {
        let mut table = TableState::new(columns());
        table.ingest(many(25));
        table.set_page_index(1);
        table.update_cell("r12", "origin", "X");
        assert_eq!(table.page_index(), 1);
    }

    #[test]
    fn test_set_column_order_normalizes() {
        let mut table = table();
        table.set_column_order(["price", "bogus", "price", "origin"]);
        assert_eq!(table.column_order(), ["price", "origin", "destination"]);

        let fields: Vec<&str> = table.ordered_columns().map(|c| c.field()).collect();
        assert_eq!(fields, ["price", "origin", "destination"]);
    }

    #[test]
    fn test_column_order_does_not_change_visible_rows() {
        let mut table = table();
        let before: Vec<Row> = table.visible_rows().cloned().collect();
        table.set_column_order(["destination", "price", "origin"]);
        table.move_column("origin", "destination");
        let after: Vec<Row> = table.visible_rows().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_move_column_array_move() {
        let mut table = table();
        assert!(table.move_column("origin", "price"));
        assert_eq!(table.column_order(), ["destination", "price", "origin"]);

        assert!(table.move_column("origin", "destination"));
        assert_eq!(table.column_order(), ["origin", "destination", "price"]);

        assert!(!table.move_column("origin", "origin"));
        assert!(!table.move_column("origin", "missing"));
    }

    #[test]
    fn test_filter_substring_case_insensitive() {
        let mut table = table();
        table.set_filter("origin", "NY");
        assert_eq!(visible_ids(&table), ["A"]);

        table.set_filter("origin", "ny");
        assert_eq!(visible_ids(&table), ["A"]);

        table.set_filter("origin", "");
        assert_eq!(visible_ids(&table), ["A", "B"]);
        assert!(table.filters().is_empty());
    }

    #[test]
    fn test_filter_resets_page_and_ignores_unknown_column() {
        let mut table = TableState::new(columns());
        table.ingest(many(25));
        table.set_page_index(2);

        assert!(!table.set_filter("missing", "x"));
        assert_eq!(table.page_index(), 2);

        assert!(table.set_filter("origin", "O1"));
        assert_eq!(table.page_index(), 0);
        // O1, O10..O19
        assert_eq!(table.filtered_len(), 11);
        assert_eq!(table.page_count(), 2);
    }

    #[test]
    fn test_filter_sees_edited_values() {
        let mut table = table();
        table.update_cell("B", "origin", "NYC");
        table.set_filter("origin", "nyc");
        assert_eq!(visible_ids(&table), ["A", "B"]);
    }

    #[test]
    fn test_pagination() {
        let mut table = TableState::new(columns());
        table.ingest(many(25));

        assert_eq!(table.page_count(), 3);
        assert_eq!(table.visible_rows().count(), 10);
        assert!(!table.can_previous_page());

        assert!(table.next_page());
        assert!(table.next_page());
        assert!(!table.next_page());
        assert_eq!(visible_ids(&table).first().map(String::as_str), Some("r20"));
        assert_eq!(table.page_summary().to_string(), "Showing 21 to 25 of 25 results");

        table.set_page_index(99);
        assert_eq!(table.page_index(), 2);

        assert!(table.set_page_size(20));
        assert_eq!(table.page_index(), 0);
        assert_eq!(table.page_count(), 2);
        assert!(!table.set_page_size(0));
        assert_eq!(table.page_size(), 20);
    }

    #[test]
    fn test_visible_rows_is_restartable() {
        let table = table();
        let rows = table.visible_rows();
        assert_eq!(rows.clone().count(), 2);
        assert_eq!(rows.count(), 2);
    }

    #[test]
    fn test_take_and_restore_dirty() {
        let mut table = table();
        table.update_cell("A", "price", "175");
        table.update_cell("A", "origin", "BOS");
        table.update_cell("B", "price", "250");

        let (rows, cells) = table.take_dirty();
        assert_eq!(rows.len(), 2);
        assert_eq!(cells.len(), 3);
        assert_eq!(table.dirty_count(), 0);

        assert_eq!(table.restore_dirty(cells), 3);
        assert!(table.is_dirty("A", "origin"));
        assert_eq!(table.restore_dirty([CellKey::new("Z", "price")]), 0);
    }

    #[test]
    fn test_cell_key_display() {
        assert_eq!(CellKey::new("A-1", "price").to_string(), "A-1-price");
    }
}
