//! JSON I/O handling for CLI
//!
//! - Records: NDJSON, one object per line, blank lines ignored
//! - Responses: one `{"status": ...}` envelope per line
//! - UTF-8 only

use std::io::{BufRead, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read NDJSON records
pub fn read_records<R: BufRead>(input: R) -> CliResult<Vec<Value>> {
    let mut records = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| {
            CliError::input_error(format!("line {}: invalid JSON: {}", index + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Read one JSON document, unwrapping a success envelope if present
pub fn read_document<R: Read>(input: R) -> CliResult<Value> {
    let value: Value = serde_json::from_reader(input)?;
    match value {
        Value::Object(mut obj) if obj.get("status") == Some(&json!("ok")) => {
            Ok(obj.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });
    write_line(out, &response)
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(out, &response)
}

/// Write one bare record line
pub fn write_record<W: Write>(out: &mut W, record: &Value) -> CliResult<()> {
    write_line(out, record)
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
