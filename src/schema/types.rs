//! Column descriptor tree
//!
//! The schema is an arena of [`ColumnDescriptor`] nodes owned by [`Schema`].
//! Children are referenced by [`NodeId`] in declaration order and every node
//! keeps a plain index to its parent. The tree is immutable once parsed.
//!
//! Every field is implicitly optional, so the definition level grows by one at
//! each node and equals the node's depth. The repetition level grows only at
//! repeated (`[*]`) nodes.

use serde_json::{json, Value};

use super::errors::{SchemaError, SchemaResult};

/// Repetition and definition levels
pub type Level = u16;

/// Index of a node within its schema arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of every schema
    pub const ROOT: NodeId = NodeId(0);

    /// Returns the arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the schema tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) repeated: bool,
    pub(crate) max_repetition_level: Level,
    pub(crate) max_definition_level: Level,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl ColumnDescriptor {
    pub(crate) fn root() -> Self {
        Self {
            name: String::new(),
            path: String::new(),
            repeated: false,
            max_repetition_level: 0,
            max_definition_level: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Field name as it appears in records
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted path including `[*]` markers, empty for the root
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of repeated nodes on the path from the root, inclusive
    pub fn max_repetition_level(&self) -> Level {
        self.max_repetition_level
    }

    /// Number of optional or repeated nodes on the path from the root, inclusive
    pub fn max_definition_level(&self) -> Level {
        self.max_definition_level
    }

    /// Depth below the root; identical to the definition level in this model
    pub fn depth(&self) -> usize {
        self.max_definition_level as usize
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in declaration order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A parsed schema: the descriptor arena plus its leaves in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub(crate) nodes: Vec<ColumnDescriptor>,
    /// Leaves in depth-first declaration order
    pub(crate) leaves: Vec<NodeId>,
    /// Leaf index of each node, `None` for groups
    pub(crate) leaf_slots: Vec<Option<usize>>,
    /// Half-open range of leaf indexes covered by each node's subtree
    pub(crate) leaf_spans: Vec<(usize, usize)>,
}

impl Schema {
    /// Builds the leaf order and subtree spans from a populated arena.
    pub(crate) fn from_nodes(nodes: Vec<ColumnDescriptor>) -> Self {
        let mut leaves = Vec::new();
        let mut leaf_slots = vec![None; nodes.len()];
        let mut leaf_spans = vec![(0, 0); nodes.len()];

        // Iterative depth-first walk; the bool marks a node being exited.
        let mut stack = vec![(NodeId::ROOT, false)];
        while let Some((id, exiting)) = stack.pop() {
            let node = &nodes[id.0];
            if exiting {
                leaf_spans[id.0].1 = leaves.len();
                continue;
            }

            leaf_spans[id.0].0 = leaves.len();
            if node.is_leaf() && !node.is_root() {
                leaf_slots[id.0] = Some(leaves.len());
                leaves.push(id);
                leaf_spans[id.0].1 = leaves.len();
                continue;
            }

            stack.push((id, true));
            for child in node.children.iter().rev() {
                stack.push((*child, false));
            }
        }

        Self {
            nodes,
            leaves,
            leaf_slots,
            leaf_spans,
        }
    }

    /// Returns the root node id
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the descriptor for a node of this schema.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this schema. Use [`Schema::get`] for
    /// ids of unknown origin.
    pub fn node(&self, id: NodeId) -> &ColumnDescriptor {
        &self.nodes[id.0]
    }

    /// Returns the descriptor for a node, or `None` if the id is foreign
    pub fn get(&self, id: NodeId) -> Option<&ColumnDescriptor> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Leaves in schema order
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Returns the leaf at a schema-order index
    pub fn leaf(&self, index: usize) -> Option<NodeId> {
        self.leaves.get(index).copied()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Returns the schema-order index of a leaf, `None` for groups
    pub fn leaf_index(&self, id: NodeId) -> Option<usize> {
        self.leaf_slots.get(id.0).copied().flatten()
    }

    /// Returns the schema-order indexes of all leaves under a node.
    ///
    /// Leaves of a subtree are contiguous in schema order.
    pub fn leaf_range(&self, id: NodeId) -> std::ops::Range<usize> {
        let (start, end) = self.leaf_spans[id.0];
        start..end
    }

    /// Leaf paths in schema order
    pub fn paths(&self) -> Vec<&str> {
        self.leaves.iter().map(|id| self.node(*id).path()).collect()
    }

    /// Deepest repetition level of any column
    pub fn max_repetition_level(&self) -> Level {
        self.leaves
            .iter()
            .map(|id| self.node(*id).max_repetition_level)
            .max()
            .unwrap_or(0)
    }

    /// Returns the nodes from the root down to `id`, both inclusive.
    pub fn ancestors(&self, id: NodeId) -> SchemaResult<Vec<NodeId>> {
        self.check(id)?;
        let mut path = Vec::with_capacity(self.node(id).depth() + 1);
        let mut current = Some(id);
        while let Some(node) = current {
            path.push(node);
            current = self.node(node).parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Lowest node that is an ancestor of (or equal to) both `a` and `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> SchemaResult<NodeId> {
        self.check(a)?;
        self.check(b)?;

        let (mut a, mut b) = (a, b);
        while self.node(a).depth() > self.node(b).depth() {
            a = self.parent_of(a);
        }
        while self.node(b).depth() > self.node(a).depth() {
            b = self.parent_of(b);
        }
        while a != b {
            a = self.parent_of(a);
            b = self.parent_of(b);
        }
        Ok(a)
    }

    /// Definition level of the ancestor of `id` whose repetition level is `r`.
    ///
    /// That ancestor is the repeated node which starts a new element when a
    /// column entry carries repetition level `r`. Level 0 resolves to the root.
    /// Returns `None` when `r` exceeds the node's maximum repetition level.
    pub fn definition_level_at_repetition(&self, id: NodeId, r: Level) -> Option<Level> {
        let mut current = Some(self.get(id)?);
        if r == 0 {
            return Some(0);
        }
        while let Some(node) = current {
            if node.repeated && node.max_repetition_level == r {
                return Some(node.max_definition_level);
            }
            if node.max_repetition_level < r {
                return None;
            }
            current = node.parent.map(|p| self.node(p));
        }
        None
    }

    /// Renders the descriptor tree as JSON, children in declaration order.
    pub fn to_json(&self) -> Value {
        self.node_to_json(NodeId::ROOT)
    }

    fn node_to_json(&self, id: NodeId) -> Value {
        let node = self.node(id);
        let children: Vec<Value> = node
            .children
            .iter()
            .map(|child| self.node_to_json(*child))
            .collect();

        let mut obj = json!({
            "name": node.name,
            "path": node.path,
            "repeated": node.repeated,
            "max_repetition_level": node.max_repetition_level,
            "max_definition_level": node.max_definition_level,
        });
        if let Some(index) = self.leaf_index(id) {
            obj["leaf_index"] = json!(index);
        } else {
            obj["children"] = Value::Array(children);
        }
        obj
    }

    fn parent_of(&self, id: NodeId) -> NodeId {
        // Only reached for nodes deeper than some other node, never the root.
        self.node(id).parent.unwrap_or(NodeId::ROOT)
    }

    fn check(&self, id: NodeId) -> SchemaResult<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(SchemaError::unknown_node(id.0, self.nodes.len()))
        }
    }
}
