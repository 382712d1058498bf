//! Grid view contract
//!
//! A grid view draws a [`TableSnapshot`] and reports user edits back as
//! [`CellEdit`] events. Views never hold a writable copy of the table: each
//! render rebuilds a [`GridFrame`] projection from scratch, and every edit is
//! written through to [`TableState`](crate::TableState) as it happens.

mod frame;

pub use frame::*;

use crate::table::TableSnapshot;

/// A single cell edit reported by a grid view.
///
/// `new_value` is the full text of the cell after the edit, not a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    /// Row index in the snapshot the view was rendered from.
    pub row_index: usize,
    /// Column name the edited cell belongs to.
    pub column: String,
    /// Full cell text after the edit.
    pub new_value: String,
}

impl CellEdit {
    /// Creates a new edit event.
    pub fn new(row_index: usize, column: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            row_index,
            column: column.into(),
            new_value: new_value.into(),
        }
    }
}

/// A renderer for the preview table.
///
/// Implementations decide how the grid is drawn; the table state and the
/// network clients do not depend on the rendering technology.
pub trait GridView {
    /// Tears down whatever is shown and rebuilds it from `snapshot`.
    ///
    /// Also makes the grid visible if it was hidden. Transient UI state such
    /// as a cell being edited does not survive a render.
    fn render(&mut self, snapshot: &TableSnapshot);

    /// Hides the grid without rendering anything in its place.
    fn hide(&mut self);
}
