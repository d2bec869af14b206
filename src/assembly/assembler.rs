//! FSM-driven record assembler

use serde_json::Value;

use crate::column::{check_entry, ColumnReader, StripedColumns};
use crate::fsm::{Fsm, Transition};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::schema::{NodeId, Schema};

use super::errors::{AssemblyError, AssemblyResult};
use super::scope::Scope;

/// Reconstructs records from one reader per leaf column.
///
/// Each call to `next` reads exactly the entries of one record. After an
/// error the iterator is exhausted: readers cannot be rewound to resync.
pub struct Assembler<'a, R: ColumnReader> {
    schema: &'a Schema,
    fsm: &'a Fsm,
    readers: Vec<R>,
    /// Root-to-leaf node path of every leaf
    paths: Vec<Vec<NodeId>>,
    scope: Scope<'a>,
    /// Leaves already read in the current record
    visited: Vec<bool>,
    records: usize,
    metrics: Option<&'a MetricsRegistry>,
    done: bool,
}

impl<'a, R: ColumnReader> Assembler<'a, R> {
    /// Creates an assembler over `readers`, one per leaf in schema order.
    pub fn new(schema: &'a Schema, fsm: &'a Fsm, readers: Vec<R>) -> AssemblyResult<Self> {
        if readers.len() != schema.leaf_count() {
            return Err(AssemblyError::reader_count(schema.leaf_count(), readers.len()));
        }
        if fsm.leaf_count() != schema.leaf_count() {
            return Err(AssemblyError::column_mismatch(format!(
                "FSM covers {} leaves, schema has {}",
                fsm.leaf_count(),
                schema.leaf_count()
            )));
        }

        let paths = schema
            .leaves()
            .iter()
            .map(|leaf| leaf_path(schema, *leaf))
            .collect();

        Ok(Self {
            schema,
            fsm,
            visited: vec![false; readers.len()],
            readers,
            paths,
            scope: Scope::new(schema),
            records: 0,
            metrics: None,
            done: false,
        })
    }

    /// Counts assembled records and failures in `metrics`
    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of records assembled so far
    pub fn records_assembled(&self) -> usize {
        self.records
    }

    fn next_record(&mut self) -> AssemblyResult<Option<Value>> {
        let mut leaf = match self.fsm.start() {
            Transition::Leaf(leaf) => leaf,
            Transition::End => return Ok(None),
        };
        let schema = self.schema;
        self.visited.iter_mut().for_each(|v| *v = false);
        let mut at_boundary = true;

        loop {
            let node = schema.node(schema.leaves()[leaf]);

            let entry = match self.readers[leaf].next_entry() {
                Some(entry) => entry,
                None if at_boundary => {
                    self.check_drained()?;
                    return Ok(None);
                }
                None => return Err(AssemblyError::reader_exhausted(node.path())),
            };
            at_boundary = false;

            check_entry(
                node.path(),
                node.max_repetition_level(),
                node.max_definition_level(),
                &entry,
            )?;
            let starts_record = entry.repetition_level == 0;
            if starts_record == self.visited[leaf] {
                let reason = if starts_record {
                    "record boundary inside a record"
                } else {
                    "record does not start at repetition level 0"
                };
                return Err(AssemblyError::invalid_level(node.path(), reason));
            }
            self.visited[leaf] = true;

            self.scope.move_to_level(
                &self.paths[leaf],
                entry.definition_level as usize,
                entry.value,
            )?;

            let r = self.readers[leaf].peek_repetition_level().unwrap_or(0);
            let next = self
                .fsm
                .next(leaf, r)
                .ok_or_else(|| AssemblyError::missing_transition(node.path(), r))?;

            match next {
                Transition::End => return self.scope.finish().map(Some),
                Transition::Leaf(target) => {
                    // Only a back edge starts a new element of a repeated group.
                    if Fsm::is_back_edge(leaf, next) {
                        let level = schema
                            .definition_level_at_repetition(schema.leaves()[leaf], r)
                            .unwrap_or(0);
                        self.scope.return_to_level(level.saturating_sub(1) as usize)?;
                    }
                    leaf = target;
                }
            }
        }
    }

    /// At a clean end, no other column may hold further entries.
    fn check_drained(&mut self) -> AssemblyResult<()> {
        let schema = self.schema;
        for (leaf, reader) in self.readers.iter_mut().enumerate() {
            if reader.peek_repetition_level().is_some() {
                let path = schema.node(schema.leaves()[leaf]).path();
                return Err(AssemblyError::column_mismatch(format!(
                    "column '{}' has entries past the last record",
                    path
                )));
            }
        }
        Ok(())
    }
}

impl<R: ColumnReader> Iterator for Assembler<'_, R> {
    type Item = AssemblyResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => {
                self.records += 1;
                if let Some(metrics) = self.metrics {
                    metrics.increment_records_assembled();
                }
                Some(Ok(record))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                self.scope.reset();
                if let Some(metrics) = self.metrics {
                    metrics.increment_assembly_failures();
                }
                let err = err.at_record(self.records);
                let record = self.records.to_string();
                Logger::error(
                    Event::AssemblyFailed.as_str(),
                    &[("code", err.code().code()), ("record", record.as_str())],
                );
                Some(Err(err))
            }
        }
    }
}

/// Assembles every record of a striped column set.
pub fn assemble_all(
    schema: &Schema,
    fsm: &Fsm,
    columns: &StripedColumns,
) -> AssemblyResult<Vec<Value>> {
    Assembler::new(schema, fsm, columns.readers())?.collect()
}

fn leaf_path(schema: &Schema, leaf: NodeId) -> Vec<NodeId> {
    let mut path = vec![leaf];
    let mut current = schema.node(leaf).parent();
    while let Some(node) = current {
        path.push(node);
        current = schema.node(node).parent();
    }
    path.reverse();
    path
}
