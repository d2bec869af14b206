//! Column streams
//!
//! The shredder writes one stream of `(value, r, d)` entries per schema leaf;
//! the assembler reads them back through [`ColumnReader`]s. Entries of one
//! record are never reordered within a column.

mod entry;
mod reader;

pub use entry::{Checkpoint, ColumnEntry, ColumnStream, StripedColumns};
pub use reader::{ColumnReader, StreamReader};

pub(crate) use entry::check_entry;
