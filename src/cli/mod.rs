//! CLI module for dremel
//!
//! Provides command-line access to:
//! - schema: print the column descriptor tree
//! - fsm: print the assembly FSM
//! - shred: NDJSON records to striped columns
//! - assemble: striped columns to NDJSON records
//! - roundtrip: shred, reassemble and compare

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{assemble, fsm, roundtrip, run, run_command, schema, shred};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, read_records, write_error, write_record, write_response};
