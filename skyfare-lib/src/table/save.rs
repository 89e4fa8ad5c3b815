//! Deferred save of edited rows
//!
//! A save turns the table's edit markers into one snapshot per edited row
//! and hands the batch to a [`RowSink`]. The save runs in three steps so the
//! table can keep taking edits while the sink is pending:
//!
//! 1. [`SaveCoordinator::begin`] captures the batch and clears the markers.
//! 2. [`SaveBatch::dispatch`] writes the batch to the sink.
//! 3. [`SaveCoordinator::complete`] applies the outcome according to the
//!    coordinator's [`SavePolicy`].
//!
//! [`SaveCoordinator::save`] runs all three against a table it borrows for
//! the whole save.

use std::collections::HashSet;

use async_trait::async_trait;
use log::debug;
use log::warn;

use super::state::CellKey;
use super::state::TableState;
use crate::model::Row;
use crate::model::RowId;

/// Error returned by a [`RowSink`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The whole batch failed.
    #[error("Failed to save rows: {0}")]
    Batch(String),

    /// Only the listed rows failed; the rest were saved.
    #[error("Failed to save {} rows: {message}", .failed.len())]
    Partial { failed: Vec<RowId>, message: String },
}

/// Receives saved rows.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Persists the given rows. Each row is the full current row.
    async fn write_rows(&self, rows: Vec<Row>) -> Result<(), SinkError>;
}

/// Result of writing a batch to a sink.
pub type SinkOutcome = Result<(), SinkError>;

/// What happens to edit markers when the sink fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SavePolicy {
    /// Markers are cleared when the batch is captured, whatever the sink
    /// reports. Failures are only logged and reported.
    #[default]
    FireAndForget,

    /// Markers of rows the sink reports as failed are restored, unless the
    /// table was re-ingested while the sink was pending or the row is gone.
    ConfirmBeforeClear,
}

/// Rows captured for one save.
#[derive(Debug, Clone)]
pub struct SaveBatch {
    rows: Vec<Row>,
    cells: Vec<CellKey>,
    generation: u64,
}

impl SaveBatch {
    /// The captured rows, one per distinct edited row.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The edited cells the batch was built from.
    pub fn cells(&self) -> &[CellKey] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the batch to `sink` once.
    pub async fn dispatch<S: RowSink + ?Sized>(&self, sink: &S) -> SinkOutcome {
        debug!("Saving {} rows", self.rows.len());
        sink.write_rows(self.rows.clone()).await
    }

    fn row_ids(&self) -> impl Iterator<Item = &RowId> {
        self.rows.iter().map(Row::id)
    }
}

/// Summary of a completed save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    /// Rows the sink accepted.
    pub saved: Vec<RowId>,
    /// Rows the sink reported as failed.
    pub failed: Vec<RowId>,
    /// Cells marked as edited again after the failure.
    pub restored_cells: usize,
    /// The sink error, if any.
    pub error: Option<SinkError>,
}

impl SaveReport {
    /// Returns `true` if every row was saved.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Batches a table's edits into row snapshots for a [`RowSink`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveCoordinator {
    policy: SavePolicy,
}

impl SaveCoordinator {
    /// Creates a coordinator with the given policy.
    pub fn new(policy: SavePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SavePolicy {
        self.policy
    }

    /// Captures the edited rows and clears the table's edit markers.
    ///
    /// Returns `None` when there is nothing to save.
    pub fn begin(&self, table: &mut TableState) -> Option<SaveBatch> {
        if !table.has_edits() {
            return None;
        }

        let (rows, cells) = table.take_dirty();
        if rows.is_empty() {
            debug!("No edited rows left to save");
            return None;
        }

        Some(SaveBatch {
            rows,
            cells,
            generation: table.generation(),
        })
    }

    /// Applies a sink outcome to the table.
    pub fn complete(
        &self,
        table: &mut TableState,
        batch: SaveBatch,
        outcome: SinkOutcome,
    ) -> SaveReport {
        let error = match outcome {
            Ok(()) => {
                return SaveReport {
                    saved: batch.row_ids().cloned().collect(),
                    ..Default::default()
                };
            }
            Err(e) => e,
        };

        let failed: HashSet<&RowId> = match &error {
            SinkError::Batch(_) => batch.row_ids().collect(),
            SinkError::Partial { failed, .. } => failed.iter().collect(),
        };
        warn!("{}", error);

        let restored_cells = match self.policy {
            SavePolicy::FireAndForget => 0,
            SavePolicy::ConfirmBeforeClear if table.generation() != batch.generation => {
                debug!("Table was re-ingested during save; not restoring edits");
                0
            }
            SavePolicy::ConfirmBeforeClear => table.restore_dirty(
                batch
                    .cells
                    .iter()
                    .filter(|cell| failed.contains(&cell.row_id))
                    .cloned(),
            ),
        };

        let (failed_rows, saved_rows): (Vec<RowId>, Vec<RowId>) = batch
            .row_ids()
            .cloned()
            .partition(|id| failed.contains(id));

        SaveReport {
            saved: saved_rows,
            failed: failed_rows,
            restored_cells,
            error: Some(error),
        }
    }

    /// Saves the table's edits to `sink`.
    ///
    /// The sink is called at most once; it is not called when there is
    /// nothing to save.
    pub async fn save<S: RowSink + ?Sized>(&self, table: &mut TableState, sink: &S) -> SaveReport {
        let Some(batch) = self.begin(table) else {
            return SaveReport::default();
        };
        let outcome = batch.dispatch(sink).await;
        self.complete(table, batch, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::table::ColumnDef;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<Vec<Row>>>,
        fail: Option<SinkError>,
    }

    impl RecordingSink {
        fn failing(error: SinkError) -> Self {
            Self {
                fail: Some(error),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Vec<Row>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RowSink for RecordingSink {
        async fn write_rows(&self, rows: Vec<Row>) -> Result<(), SinkError> {
            self.calls.lock().unwrap().push(rows);
            match &self.fail {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn table() -> TableState {
        let mut table = TableState::new(vec![
            ColumnDef::new("origin", "Origin"),
            ColumnDef::new("price", "Price"),
        ]);
        table.ingest(vec![
            Row::new("A").set("origin", "NYC").set("price", "100"),
            Row::new("B").set("origin", "LAX").set("price", "200"),
        ]);
        table
    }

    fn ids(rows: &[RowId]) -> Vec<&str> {
        rows.iter().map(RowId::as_str).collect()
    }

    #[tokio::test]
    async fn test_save_sends_one_snapshot_per_row() {
        let mut table = table();
        table.update_cell("A", "price", "150");
        table.update_cell("A", "price", "175");

        let sink = RecordingSink::default();
        let report = SaveCoordinator::default().save(&mut table, &sink).await;

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![Row::new("A").set("origin", "NYC").set("price", "175")]
        );
        assert_eq!(ids(&report.saved), ["A"]);
        assert_eq!(table.dirty_count(), 0);
    }

    #[tokio::test]
    async fn test_save_dedups_rows_with_many_edited_cells() {
        let mut table = table();
        table.update_cell("A", "price", "175");
        table.update_cell("A", "origin", "BOS");
        table.update_cell("B", "origin", "SFO");

        let sink = RecordingSink::default();
        SaveCoordinator::default().save(&mut table, &sink).await;

        let calls = sink.calls();
        let saved: Vec<&str> = calls[0].iter().map(|r| r.id().as_str()).collect();
        assert_eq!(saved, ["A", "B"]);
    }

    #[tokio::test]
    async fn test_save_without_edits_skips_sink() {
        let mut table = table();
        let sink = RecordingSink::default();
        let report = SaveCoordinator::default().save(&mut table, &sink).await;

        assert!(sink.calls().is_empty());
        assert!(report.saved.is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_fire_and_forget_clears_on_failure() {
        let mut table = table();
        table.update_cell("A", "price", "175");

        let sink = RecordingSink::failing(SinkError::Batch("disk full".into()));
        let report = SaveCoordinator::new(SavePolicy::FireAndForget)
            .save(&mut table, &sink)
            .await;

        assert_eq!(table.dirty_count(), 0);
        assert_eq!(ids(&report.failed), ["A"]);
        assert_eq!(report.restored_cells, 0);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_confirm_before_clear_restores_failed_rows() {
        let mut table = table();
        table.update_cell("A", "price", "175");
        table.update_cell("A", "origin", "BOS");
        table.update_cell("B", "price", "250");

        let sink = RecordingSink::failing(SinkError::Partial {
            failed: vec![RowId::from("A")],
            message: "conflict".into(),
        });
        let report = SaveCoordinator::new(SavePolicy::ConfirmBeforeClear)
            .save(&mut table, &sink)
            .await;

        assert_eq!(ids(&report.saved), ["B"]);
        assert_eq!(ids(&report.failed), ["A"]);
        assert_eq!(report.restored_cells, 2);
        assert!(table.is_dirty("A", "price"));
        assert!(table.is_dirty("A", "origin"));
        assert!(!table.is_dirty("B", "price"));
    }

    #[tokio::test]
    async fn test_confirm_before_clear_skips_restore_after_ingest() {
        let mut table = table();
        table.update_cell("A", "price", "175");

        let coordinator = SaveCoordinator::new(SavePolicy::ConfirmBeforeClear);
        let batch = coordinator.begin(&mut table).unwrap();
        let outcome = batch
            .dispatch(&RecordingSink::failing(SinkError::Batch("offline".into())))
            .await;

        table.ingest(vec![Row::new("A").set("price", "100")]);
        let report = coordinator.complete(&mut table, batch, outcome);

        assert_eq!(report.restored_cells, 0);
        assert_eq!(table.dirty_count(), 0);
    }

    #[tokio::test]
    async fn test_edits_during_pending_save_stay_dirty() {
        let mut table = table();
        table.update_cell("A", "price", "175");

        let coordinator = SaveCoordinator::default();
        let batch = coordinator.begin(&mut table).unwrap();
        assert_eq!(table.dirty_count(), 0);

        table.update_cell("B", "price", "250");
        let outcome = batch.dispatch(&RecordingSink::default()).await;
        let report = coordinator.complete(&mut table, batch, outcome);

        assert_eq!(ids(&report.saved), ["A"]);
        assert!(table.is_dirty("B", "price"));
        assert_eq!(table.dirty_count(), 1);
    }

    #[test]
    fn test_sink_error_display() {
        let error = SinkError::Partial {
            failed: vec![RowId::from("A"), RowId::from("B")],
            message: "conflict".into(),
        };
        assert_eq!(error.to_string(), "Failed to save 2 rows: conflict");
    }
}
