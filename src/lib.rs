//! dremel - columnar shredding and assembly of nested records
//!
//! A schema of dotted leaf paths compiles into a descriptor tree. The
//! shredder turns nested JSON records into one stream of
//! `(value, repetition level, definition level)` entries per leaf, and the
//! assembler drives those streams through a per-schema FSM to rebuild the
//! original records.
//!
//! ```ignore
//! use dremel::{assemble_all, Fsm, Schema, Shredder};
//!
//! let schema = Schema::parse(["doc.links[*].url", "doc.links[*].language"])?;
//! let columns = Shredder::new(&schema).shred_record(&record)?;
//! let fsm = Fsm::build(&schema);
//! let records = assemble_all(&schema, &fsm, &columns)?;
//! ```

pub mod assembly;
pub mod batch;
pub mod cli;
pub mod column;
pub mod errors;
pub mod fsm;
pub mod observability;
pub mod schema;
pub mod shred;

pub use assembly::{assemble_all, Assembler, AssemblyError, AssemblyResult};
pub use batch::{BatchShredder, ErrorPolicy, ShredReport};
pub use column::{ColumnEntry, ColumnReader, ColumnStream, StreamReader, StripedColumns};
pub use errors::{DremelError, DremelResult, Severity};
pub use fsm::{Fsm, Transition};
pub use schema::{ColumnDescriptor, Level, NodeId, Schema, SchemaError, SchemaResult};
pub use shred::{ShredError, ShredResult, Shredder};
