//! CLI argument definitions using clap
//!
//! Commands:
//! - dremel schema --config <path>
//! - dremel fsm --config <path>
//! - dremel shred --config <path>
//! - dremel assemble --config <path>
//! - dremel roundtrip --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dremel - shred nested JSON records into columns and assemble them back
#[derive(Parser, Debug)]
#[command(name = "dremel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the column descriptor tree as JSON
    Schema {
        /// Path to configuration file
        #[arg(long, default_value = "./dremel.json")]
        config: PathBuf,
    },

    /// Print the assembly FSM
    Fsm {
        /// Path to configuration file
        #[arg(long, default_value = "./dremel.json")]
        config: PathBuf,
    },

    /// Shred NDJSON records from stdin into striped columns
    Shred {
        /// Path to configuration file
        #[arg(long, default_value = "./dremel.json")]
        config: PathBuf,
    },

    /// Assemble striped columns from stdin into NDJSON records
    Assemble {
        /// Path to configuration file
        #[arg(long, default_value = "./dremel.json")]
        config: PathBuf,
    },

    /// Shred and reassemble NDJSON records, reporting any difference
    Roundtrip {
        /// Path to configuration file
        #[arg(long, default_value = "./dremel.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
