//! Schema model for columnar shredding
//!
//! A schema is compiled from an ordered list of leaf paths into a tree of
//! column descriptors. It is built once, never mutated, and shared read-only
//! by the FSM builder, the shredder and the assembler.
//!
//! # Levels
//!
//! - Repetition level: number of repeated (`[*]`) fields on the path
//! - Definition level: number of fields on the path (all fields are optional)
//!
//! Both are inclusive of the node itself and zero at the root.

mod errors;
mod parser;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use parser::MAX_PATH_DEPTH;
pub use types::{ColumnDescriptor, Level, NodeId, Schema};
