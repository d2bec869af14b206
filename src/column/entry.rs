//! Column stream entries and striped column sets
//!
//! Striped columns serialize as:
//!
//! ```text
//! {"columns":[{"path":"doc.links[*].url","entries":[{"value":"a.com","r":0,"d":3}]}]}
//! ```

use std::iter::Cloned;
use std::slice;
use std::vec;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assembly::{AssemblyError, AssemblyResult};
use crate::schema::{Level, Schema};

use super::reader::StreamReader;

/// One `(value, repetition level, definition level)` triple of a leaf column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnEntry {
    /// Scalar value, `None` when an ancestor (or the value itself) is absent
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(rename = "r")]
    pub repetition_level: Level,
    #[serde(rename = "d")]
    pub definition_level: Level,
}

impl ColumnEntry {
    /// Create an entry holding a present value
    pub fn value(value: Value, repetition_level: Level, definition_level: Level) -> Self {
        Self {
            value: Some(value),
            repetition_level,
            definition_level,
        }
    }

    /// Create a null entry
    pub fn null(repetition_level: Level, definition_level: Level) -> Self {
        Self {
            value: None,
            repetition_level,
            definition_level,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Whether this entry opens a new record in its column
    pub fn starts_record(&self) -> bool {
        self.repetition_level == 0
    }
}

/// The ordered entries of one leaf column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStream {
    /// Leaf path, e.g. `doc.links[*].url`
    pub path: String,
    pub entries: Vec<ColumnEntry>,
}

impl ColumnStream {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records this column spans
    pub fn record_count(&self) -> usize {
        self.entries.iter().filter(|e| e.starts_record()).count()
    }

    pub fn iter(&self) -> slice::Iter<'_, ColumnEntry> {
        self.entries.iter()
    }
}

/// One column stream per schema leaf, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripedColumns {
    pub columns: Vec<ColumnStream>,
}

/// Column lengths captured before a record is shredded
#[derive(Debug, Clone)]
pub struct Checkpoint(Vec<usize>);

impl StripedColumns {
    /// Create an empty stream for every leaf of the schema
    pub fn new(schema: &Schema) -> Self {
        Self {
            columns: schema.paths().into_iter().map(ColumnStream::new).collect(),
        }
    }

    pub fn columns(&self) -> &[ColumnStream] {
        &self.columns
    }

    pub fn column(&self, leaf: usize) -> Option<&ColumnStream> {
        self.columns.get(leaf)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of records, counted on the first column
    pub fn record_count(&self) -> usize {
        self.columns.first().map_or(0, ColumnStream::record_count)
    }

    /// Total entries across all columns
    pub fn total_entries(&self) -> usize {
        self.columns.iter().map(ColumnStream::len).sum()
    }

    pub(crate) fn push(&mut self, leaf: usize, entry: ColumnEntry) {
        self.columns[leaf].entries.push(entry);
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.columns.iter().map(ColumnStream::len).collect())
    }

    /// Drops every entry written after the checkpoint.
    pub(crate) fn rollback(&mut self, checkpoint: &Checkpoint) {
        for (column, len) in self.columns.iter_mut().zip(&checkpoint.0) {
            column.entries.truncate(*len);
        }
    }

    /// Appends the records of another column set with the same layout.
    ///
    /// Segments shredded independently concatenate in record order.
    pub fn append(&mut self, other: StripedColumns) -> AssemblyResult<()> {
        if self.columns.len() != other.columns.len() {
            return Err(AssemblyError::column_mismatch(format!(
                "cannot append {} columns to {}",
                other.columns.len(),
                self.columns.len()
            )));
        }
        for (mine, theirs) in self.columns.iter().zip(&other.columns) {
            if mine.path != theirs.path {
                return Err(AssemblyError::column_mismatch(format!(
                    "column '{}' does not match '{}'",
                    theirs.path, mine.path
                )));
            }
        }
        for (mine, theirs) in self.columns.iter_mut().zip(other.columns) {
            mine.entries.extend(theirs.entries);
        }
        Ok(())
    }

    /// Checks that the columns fit the schema and carry consistent levels.
    ///
    /// - one column per leaf, paths in schema order
    /// - levels within the leaf's maxima
    /// - a value is present exactly when the definition level is maximal
    /// - every column starts a record first and spans the same records
    pub fn validate(&self, schema: &Schema) -> AssemblyResult<()> {
        if self.columns.len() != schema.leaf_count() {
            return Err(AssemblyError::reader_count(schema.leaf_count(), self.columns.len()));
        }

        let mut records = None;
        for (leaf, column) in schema.leaves().iter().zip(&self.columns) {
            let node = schema.node(*leaf);
            if column.path != node.path() {
                return Err(AssemblyError::column_mismatch(format!(
                    "expected column '{}', found '{}'",
                    node.path(),
                    column.path
                )));
            }

            if let Some(first) = column.entries.first() {
                if !first.starts_record() {
                    return Err(AssemblyError::invalid_level(
                        &column.path,
                        "first entry does not start a record",
                    ));
                }
            }

            for entry in &column.entries {
                check_entry(&column.path, node.max_repetition_level(), node.max_definition_level(), entry)?;
            }

            let count = column.record_count();
            match records {
                None => records = Some(count),
                Some(expected) if expected != count => {
                    return Err(AssemblyError::column_mismatch(format!(
                        "column '{}' spans {} records, expected {}",
                        column.path, count, expected
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Borrowing readers, one per column
    pub fn readers(&self) -> Vec<StreamReader<Cloned<slice::Iter<'_, ColumnEntry>>>> {
        self.columns
            .iter()
            .map(|c| StreamReader::new(c.entries.iter().cloned()))
            .collect()
    }

    /// Owning readers, one per column
    pub fn into_readers(self) -> Vec<StreamReader<vec::IntoIter<ColumnEntry>>> {
        self.columns
            .into_iter()
            .map(|c| StreamReader::new(c.entries.into_iter()))
            .collect()
    }
}

/// Validates one entry against its column's maxima.
pub(crate) fn check_entry(
    path: &str,
    max_repetition_level: Level,
    max_definition_level: Level,
    entry: &ColumnEntry,
) -> AssemblyResult<()> {
    if entry.repetition_level > max_repetition_level {
        return Err(AssemblyError::invalid_level(
            path,
            format!(
                "repetition level {} above maximum {}",
                entry.repetition_level, max_repetition_level
            ),
        ));
    }
    if entry.definition_level > max_definition_level {
        return Err(AssemblyError::invalid_level(
            path,
            format!(
                "definition level {} above maximum {}",
                entry.definition_level, max_definition_level
            ),
        ));
    }
    let defined = entry.definition_level == max_definition_level;
    if defined == entry.is_null() {
        return Err(AssemblyError::invalid_level(
            path,
            format!(
                "value presence does not match definition level {}",
                entry.definition_level
            ),
        ));
    }
    Ok(())
}
