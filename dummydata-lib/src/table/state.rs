//! Table snapshot and its owning state

use std::collections::HashSet;

use log::debug;
use log::warn;

use super::CellValue;
use super::Row;
use crate::grid::CellEdit;

/// The complete columns and rows held at one instant.
///
/// Columns are ordered (display order). Rows may carry keys outside the
/// column list; those are kept but never displayed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSnapshot {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TableSnapshot {
    /// Creates a snapshot from columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names in display order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns `true` if there are no columns or no rows.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Owner of the current [`TableSnapshot`].
///
/// All mutation goes through this type: a wholesale [`replace`](Self::replace)
/// after generation, [`append_row`](Self::append_row) for manual rows, and
/// [`set_cell`](Self::set_cell) / [`apply`](Self::apply) for edits.
#[derive(Debug, Default)]
pub struct TableState {
    snapshot: TableSnapshot,
}

impl TableState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps the current snapshot for a new one.
    ///
    /// Row keys are not checked against `columns`; missing cells are
    /// defaulted when rendered. Duplicate column names are kept as given.
    pub fn replace(&mut self, columns: Vec<String>, rows: Vec<Row>) {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                warn!("Duplicate column name in snapshot: {}", column);
            }
        }

        debug!(
            "Replacing snapshot: {} columns, {} rows",
            columns.len(),
            rows.len()
        );
        self.snapshot = TableSnapshot::new(columns, rows);
    }

    /// Appends a row with every current column set to empty text.
    ///
    /// Returns the index of the new row.
    pub fn append_row(&mut self) -> usize {
        let row = Row::blank(self.snapshot.columns.iter());
        self.snapshot.rows.push(row);
        self.snapshot.rows.len() - 1
    }

    /// Writes text into one cell.
    ///
    /// Out-of-range rows are ignored. A column outside the current column
    /// list is still stored on the row. Returns whether the write happened.
    pub fn set_cell(&mut self, row_index: usize, column: &str, value: impl Into<String>) -> bool {
        let Some(row) = self.snapshot.rows.get_mut(row_index) else {
            debug!("Ignoring edit for missing row {}", row_index);
            return false;
        };

        row.set(column, CellValue::Text(value.into()));
        true
    }

    /// Applies a grid edit event.
    pub fn apply(&mut self, edit: CellEdit) -> bool {
        self.set_cell(edit.row_index, &edit.column, edit.new_value)
    }

    /// Reads one cell, if the row exists and holds a value for the column.
    pub fn cell(&self, row_index: usize, column: &str) -> Option<&CellValue> {
        self.snapshot.rows.get(row_index)?.get(column)
    }

    /// Returns `true` if there are no columns or no rows.
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        self.snapshot.columns()
    }

    pub fn rows(&self) -> &[Row] {
        self.snapshot.rows()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &TableSnapshot {
        &self.snapshot
    }
}
