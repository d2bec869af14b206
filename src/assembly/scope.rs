//! Open-container stack used while assembling one record
//!
//! `frames[k]` is the open object at depth `k` (definition level `k`) on the
//! path to the leaf being read. `frames[0]` is the record itself and is never
//! popped. Closing a frame attaches its object to the parent frame.

use std::mem;

use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::schema::{NodeId, Schema};

use super::errors::{AssemblyError, AssemblyResult};

#[derive(Debug)]
struct Frame {
    node: NodeId,
    fields: Map<String, Value>,
}

impl Frame {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            fields: Map::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Scope<'a> {
    schema: &'a Schema,
    frames: Vec<Frame>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            frames: vec![Frame::new(NodeId::ROOT)],
        }
    }

    /// Depth of the innermost open object
    pub(crate) fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Positions the stack for an entry of the leaf at the end of `path`.
    ///
    /// `path` runs from the root to the leaf. Frames off that path are closed,
    /// then objects are opened down to `definition_level`, or to the leaf's
    /// parent when `value` is present. A present value is attached last.
    pub(crate) fn move_to_level(
        &mut self,
        path: &[NodeId],
        definition_level: usize,
        value: Option<Value>,
    ) -> AssemblyResult<()> {
        let shared = self
            .frames
            .iter()
            .zip(path)
            .take_while(|(frame, node)| frame.node == **node)
            .count();
        self.return_to_level(shared.saturating_sub(1))?;

        let leaf_depth = path.len() - 1;
        let target = match value {
            Some(_) => leaf_depth - 1,
            None => definition_level.min(leaf_depth),
        };
        while self.depth() < target {
            self.frames.push(Frame::new(path[self.depth() + 1]));
        }

        match value {
            Some(value) => self.attach(path[leaf_depth], value),
            None => Ok(()),
        }
    }

    /// Closes every open object deeper than `level`.
    pub(crate) fn return_to_level(&mut self, level: usize) -> AssemblyResult<()> {
        while self.depth() > level {
            if let Some(frame) = self.frames.pop() {
                self.attach(frame.node, Value::Object(frame.fields))?;
            }
        }
        Ok(())
    }

    /// Closes everything and hands out the finished record.
    pub(crate) fn finish(&mut self) -> AssemblyResult<Value> {
        self.return_to_level(0)?;
        Ok(Value::Object(mem::take(&mut self.frames[0].fields)))
    }

    /// Drops any partially assembled record
    pub(crate) fn reset(&mut self) {
        self.frames.truncate(1);
        self.frames[0].fields.clear();
    }

    fn attach(&mut self, node: NodeId, value: Value) -> AssemblyResult<()> {
        let schema = self.schema;
        let descriptor = schema.node(node);
        let parent = match self.frames.last_mut() {
            Some(parent) => parent,
            None => return Err(AssemblyError::conflicting_value(descriptor.path())),
        };

        match parent.fields.entry(descriptor.name()) {
            Entry::Vacant(slot) => {
                if descriptor.is_repeated() {
                    slot.insert(Value::Array(vec![value]));
                } else {
                    slot.insert(value);
                }
                Ok(())
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(items) if descriptor.is_repeated() => {
                    items.push(value);
                    Ok(())
                }
                _ => Err(AssemblyError::conflicting_value(descriptor.path())),
            },
        }
    }
}
