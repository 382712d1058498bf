//! Editable synthetic-data preview client
//!
//! Holds the in-memory preview table for a DDL-driven dummy data generator,
//! keeps it consistent across cell edits, and talks to the generation/export
//! backend over HTTP.

pub mod api;
pub mod error;
pub mod grid;
pub mod table;
pub mod workbench;

mod client;

pub use client::*;
pub use grid::CellEdit;
pub use grid::GridFrame;
pub use grid::GridView;
pub use table::CellValue;
pub use table::Row;
pub use table::TableSnapshot;
pub use table::TableState;
pub use workbench::Notice;
pub use workbench::NoticeLevel;
pub use workbench::Phase;
pub use workbench::Workbench;
