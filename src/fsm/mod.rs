//! Column-read FSM for record assembly
//!
//! For every leaf column and every repetition level the next entry of that
//! column may carry, the FSM names the column to read next. Levels are dense
//! and small, so each leaf owns a table indexed by repetition level.
//!
//! Transitions are one of:
//! - barrier edge: the next column in schema order (no repetition at this depth)
//! - back edge: an earlier column (or the same one) whose repeated group restarts
//! - end: the record is complete

mod builder;

use std::fmt;

use serde_json::{json, Value};

use crate::schema::{Level, NodeId, Schema};

/// Target of an FSM transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Read the leaf with this schema-order index next
    Leaf(usize),
    /// The current record is complete
    End,
}

impl Transition {
    /// Returns the leaf index, or `None` for [`Transition::End`]
    pub fn leaf(self) -> Option<usize> {
        match self {
            Transition::Leaf(index) => Some(index),
            Transition::End => None,
        }
    }

    pub fn is_end(self) -> bool {
        self == Transition::End
    }
}

/// Transition table of a schema, built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fsm {
    /// `tables[leaf][level]`, total over `0..=max_repetition_level`
    tables: Vec<Box<[Transition]>>,
    /// Leaf paths, kept for rendering
    names: Vec<String>,
}

impl Fsm {
    /// Builds the FSM for a schema.
    pub fn build(schema: &Schema) -> Fsm {
        builder::build(schema)
    }

    /// Returns the first column read for every record
    pub fn start(&self) -> Transition {
        if self.tables.is_empty() {
            Transition::End
        } else {
            Transition::Leaf(0)
        }
    }

    /// Returns the transition out of `leaf` when the next entry of that column
    /// carries repetition level `level`.
    ///
    /// `None` means the level is above the column's maximum repetition level.
    pub fn next(&self, leaf: usize, level: Level) -> Option<Transition> {
        self.tables.get(leaf)?.get(level as usize).copied()
    }

    /// The full table of one leaf, indexed by repetition level
    pub fn transitions(&self, leaf: usize) -> Option<&[Transition]> {
        self.tables.get(leaf).map(|t| t.as_ref())
    }

    /// Number of leaves covered
    pub fn leaf_count(&self) -> usize {
        self.tables.len()
    }

    /// Whether moving from `from` to `to` re-enters an already visited column.
    ///
    /// Back edges (including self loops) start a new element of a repeated
    /// group; barrier edges move on to the next column.
    pub fn is_back_edge(from: usize, to: Transition) -> bool {
        matches!(to, Transition::Leaf(index) if index <= from)
    }

    /// The table of a leaf addressed by node id
    pub fn transitions_for(&self, schema: &Schema, leaf: NodeId) -> Option<&[Transition]> {
        self.transitions(schema.leaf_index(leaf)?)
    }

    /// Renders the tables as JSON, one object per leaf.
    ///
    /// `next` holds one target path (or `"END"`) per repetition level.
    pub fn to_json(&self) -> Value {
        let leaves: Vec<Value> = self
            .tables
            .iter()
            .enumerate()
            .map(|(leaf, table)| {
                let next: Vec<&str> = table.iter().map(|t| self.label(*t)).collect();
                json!({
                    "leaf": leaf,
                    "path": self.names[leaf],
                    "next": next,
                })
            })
            .collect();
        Value::Array(leaves)
    }

    fn label(&self, transition: Transition) -> &str {
        match transition {
            Transition::Leaf(index) => self.names.get(index).map_or("?", |s| s.as_str()),
            Transition::End => "END",
        }
    }
}

impl fmt::Display for Fsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (leaf, table) in self.tables.iter().enumerate() {
            write!(f, "{}:", self.names[leaf])?;
            for (level, transition) in table.iter().enumerate() {
                let sep = if level == 0 { " " } else { ", " };
                write!(f, "{}{} -> {}", sep, level, self.label(*transition))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
