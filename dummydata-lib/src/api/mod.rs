//! Backend endpoints
//!
//! Each endpoint is an `impl PreviewClient` block in its own module:
//!
//! - `POST /upload-sql` ([`upload`]) reads a DDL file into the DDL text.
//! - `POST /generate` ([`generate`]) produces synthetic rows for a DDL.
//! - `POST /csv` and `POST /insert-sql` ([`export`]) render the current
//!   table into a downloadable artifact.
//!
//! Generation and upload never return `Err`: their outcomes are tagged
//! results so call sites match on success, application failure, and
//! transport failure explicitly.

pub mod export;
pub mod generate;
pub mod upload;

pub use export::*;
pub use generate::*;
pub use upload::*;
