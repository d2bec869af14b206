//! CLI command implementations
//!
//! Every command loads the configuration and compiles the schema before
//! touching its input. Commands take their streams as arguments;
//! [`run_command`] wires them to stdin and stdout.

use std::collections::HashSet;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::assembly::{Assembler, AssemblyErrorCode};
use crate::batch::BatchShredder;
use crate::column::StripedColumns;
use crate::fsm::Fsm;
use crate::observability::{
    log_event_with_fields, Event, Logger, MetricsRegistry, ObservationScope,
};
use crate::schema::Schema;
use crate::shred::Shredder;

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_document, read_records, write_error, write_record, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. Failures are
/// also reported on stdout as an error envelope.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(ref e) = result {
        let _ = write_error(&mut io::stdout().lock(), e.code_str(), e.message());
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    match cmd {
        Command::Schema { config } => schema(&config, &mut stdout),
        Command::Fsm { config } => fsm(&config, &mut stdout),
        Command::Shred { config } => shred(&config, stdin.lock(), &mut stdout),
        Command::Assemble { config } => assemble(&config, stdin.lock(), &mut stdout),
        Command::Roundtrip { config } => roundtrip(&config, stdin.lock(), &mut stdout),
    }
}

/// Loads the configuration, sets up logging and compiles the schema.
fn prepare(config_path: &Path) -> CliResult<(Config, Schema)> {
    let config = Config::load(config_path)?;
    Logger::init(config.log_severity()?);
    let path = config_path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("path", path.as_str())]);

    let schema = config.compile_schema()?;
    let leaves = schema.leaf_count().to_string();
    log_event_with_fields(Event::SchemaParsed, &[("leaves", leaves.as_str())]);
    Ok((config, schema))
}

fn build_fsm(schema: &Schema) -> Fsm {
    let fsm = Fsm::build(schema);
    let leaves = fsm.leaf_count().to_string();
    log_event_with_fields(Event::FsmBuilt, &[("leaves", leaves.as_str())]);
    fsm
}

fn batch_shredder<'a>(
    config: &Config,
    schema: &'a Schema,
    metrics: &'a MetricsRegistry,
) -> BatchShredder<'a> {
    let shredder = Shredder::new(schema).strict(config.strict_fields);
    BatchShredder::new(shredder, config.on_shred_error).with_metrics(metrics)
}

/// Print the column descriptor tree
pub fn schema<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let (_, schema) = prepare(config_path)?;
    write_response(
        out,
        json!({
            "leaves": schema.paths(),
            "tree": schema.to_json(),
        }),
    )
}

/// Print the FSM, both as a table and as text
pub fn fsm<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let (_, schema) = prepare(config_path)?;
    let fsm = build_fsm(&schema);
    write_response(
        out,
        json!({
            "transitions": fsm.to_json(),
            "rendered": fsm.to_string(),
        }),
    )
}

/// Shred NDJSON records into striped columns
pub fn shred<R: BufRead, W: Write>(config_path: &Path, input: R, out: &mut W) -> CliResult<()> {
    let (config, schema) = prepare(config_path)?;
    let records = read_records(input)?;

    let metrics = MetricsRegistry::new();
    let (columns, report) = batch_shredder(&config, &schema, &metrics).shred(&records)?;

    let mut data = serde_json::to_value(&columns)?;
    data["report"] = serde_json::to_value(&report)?;
    data["metrics"] = metrics.to_json();
    write_response(out, data)
}

/// Assemble striped columns into NDJSON records
///
/// Records are written as they are assembled. A failure midway leaves the
/// records before it on stdout.
pub fn assemble<R: Read, W: Write>(config_path: &Path, input: R, out: &mut W) -> CliResult<()> {
    let (_, schema) = prepare(config_path)?;
    let fsm = build_fsm(&schema);

    let columns: StripedColumns = serde_json::from_value(read_document(input)?)
        .map_err(|e| CliError::input_error(format!("Invalid striped columns: {}", e)))?;
    columns.validate(&schema)?;

    let metrics = MetricsRegistry::new();
    let column_count = columns.len().to_string();
    let scope = ObservationScope::with_fields("ASSEMBLY", &[("columns", column_count.as_str())]);
    let assembler = Assembler::new(&schema, &fsm, columns.into_readers())?.with_metrics(&metrics);

    for record in assembler {
        match record {
            Ok(record) => write_record(out, &record)?,
            Err(e) => {
                scope.fail(e.code().code(), e.message());
                return Err(e.into());
            }
        }
    }

    let records = metrics.snapshot().records_assembled.to_string();
    scope.complete_with_fields(&[("records", records.as_str())]);
    Ok(())
}

/// Shred and reassemble, then compare every kept record with its input
pub fn roundtrip<R: BufRead, W: Write>(
    config_path: &Path,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let (config, schema) = prepare(config_path)?;
    let fsm = build_fsm(&schema);
    let records = read_records(input)?;

    let metrics = MetricsRegistry::new();
    let (columns, report) = batch_shredder(&config, &schema, &metrics).shred(&records)?;

    let skipped: HashSet<usize> = report.skipped.iter().copied().collect();
    let kept: Vec<(usize, &Value)> = records
        .iter()
        .enumerate()
        .filter(|(index, _)| !skipped.contains(index))
        .collect();

    let assembled = Assembler::new(&schema, &fsm, columns.readers())?
        .with_metrics(&metrics)
        .collect::<Result<Vec<Value>, _>>()?;

    if kept.len() != assembled.len() {
        return Err(CliError::new(
            CliErrorCode::Pipeline(AssemblyErrorCode::DremelAssemblyColumnMismatch.code()),
            format!(
                "shredded {} records but assembled {}",
                kept.len(),
                assembled.len()
            ),
        ));
    }

    let mut mismatches = Vec::new();
    for ((index, original), rebuilt) in kept.iter().zip(&assembled) {
        if *original != rebuilt {
            let position = index.to_string();
            Logger::warn(Event::RoundtripMismatch.as_str(), &[("record", position.as_str())]);
            mismatches.push(json!({
                "record": index,
                "expected": original,
                "actual": rebuilt,
            }));
        }
    }

    write_response(
        out,
        json!({
            "lossless": mismatches.is_empty(),
            "records": kept.len(),
            "mismatches": mismatches,
            "report": report,
            "metrics": metrics.to_json(),
        }),
    )
}
