//! Rendering projection of a table snapshot

use crate::table::TableSnapshot;

/// Text shown instead of a grid when there are no columns or no rows.
pub const NO_DATA_PLACEHOLDER: &str = "No data to display";

/// What a grid view should draw for one snapshot.
///
/// Built fresh on every render. Headers and each row's cells follow the
/// column order; a row missing a column gets an empty cell, and row keys
/// that are not columns are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridFrame {
    /// A single explanatory row instead of headers and body.
    Placeholder(String),
    /// Headers plus one text cell per column for each row.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl GridFrame {
    /// Projects a snapshot into drawable text.
    pub fn project(snapshot: &TableSnapshot) -> Self {
        if snapshot.is_empty() {
            return Self::Placeholder(NO_DATA_PLACEHOLDER.to_string());
        }

        let headers = snapshot.columns().to_vec();
        let rows = snapshot
            .rows()
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|column| row.text(column).into_owned())
                    .collect()
            })
            .collect();

        Self::Table { headers, rows }
    }

    /// Returns `true` for the no-data placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Header labels, empty for the placeholder.
    pub fn headers(&self) -> &[String] {
        match self {
            Self::Placeholder(_) => &[],
            Self::Table { headers, .. } => headers,
        }
    }

    /// Number of body rows, zero for the placeholder.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Placeholder(_) => 0,
            Self::Table { rows, .. } => rows.len(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers().len()
    }

    /// Text of one body cell.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        match self {
            Self::Placeholder(_) => None,
            Self::Table { rows, .. } => rows.get(row)?.get(column).map(String::as_str),
        }
    }

    /// Mutable text of one body cell.
    ///
    /// Views use this to mirror what the user is typing; the table itself is
    /// updated separately through a [`CellEdit`](super::CellEdit).
    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut String> {
        match self {
            Self::Placeholder(_) => None,
            Self::Table { rows, .. } => rows.get_mut(row)?.get_mut(column),
        }
    }
}

impl Default for GridFrame {
    fn default() -> Self {
        Self::Placeholder(NO_DATA_PLACEHOLDER.to_string())
    }
}
