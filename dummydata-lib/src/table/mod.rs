//! In-memory preview table
//!
//! [`TableState`] is the single owner of the columns and rows shown in the
//! grid. Everything else reads from it or writes through it.

mod state;
mod value;

pub use state::*;
pub use value::*;
