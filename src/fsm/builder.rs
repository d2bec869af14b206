//! FSM construction
//!
//! For each leaf `field` at schema-order index `i`:
//!
//! 1. `barrier` is leaf `i + 1`, or END after the last leaf.
//! 2. `barrier_level` is the repetition level of the common ancestor of
//!    `field` and `barrier` (0 for END).
//! 3. Back edges: every leaf up to and including `field` that repeats deeper
//!    than `barrier_level` claims the level of its common ancestor with
//!    `field`. When several leaves claim a level, the earliest one in schema
//!    order keeps it: a restarted group is always re-entered at its first
//!    column.
//! 4. Unclaimed levels in `(barrier_level, max]` are filled top-down: the top
//!    level loops on `field`, lower levels copy the level above.
//! 5. Levels `0..=barrier_level` go to `barrier`.

use crate::schema::{Level, NodeId, Schema};

use super::{Fsm, Transition};

pub(super) fn build(schema: &Schema) -> Fsm {
    let leaves = schema.leaves();
    let mut tables = Vec::with_capacity(leaves.len());

    for (i, &field) in leaves.iter().enumerate() {
        let max_level = schema.node(field).max_repetition_level() as usize;
        let barrier = leaves.get(i + 1).copied();
        let barrier_level = match barrier {
            Some(next) => common_repetition_level(schema, field, next) as usize,
            None => 0,
        };

        let mut table: Vec<Option<Transition>> = vec![None; max_level + 1];

        // Nearest first; earlier leaves overwrite later ones.
        for pre_index in (0..=i).rev() {
            let pre = leaves[pre_index];
            if schema.node(pre).max_repetition_level() as usize <= barrier_level {
                continue;
            }
            let back_level = common_repetition_level(schema, pre, field) as usize;
            table[back_level] = Some(Transition::Leaf(pre_index));
        }

        let mut above = Transition::Leaf(i);
        for level in (barrier_level + 1..=max_level).rev() {
            match table[level] {
                Some(transition) => above = transition,
                None => table[level] = Some(above),
            }
        }

        let barrier_target = barrier.map_or(Transition::End, |_| Transition::Leaf(i + 1));
        for slot in table.iter_mut().take(barrier_level + 1) {
            *slot = Some(barrier_target);
        }

        tables.push(
            table
                .into_iter()
                .map(|t| t.unwrap_or(barrier_target))
                .collect::<Box<[Transition]>>(),
        );
    }

    Fsm {
        tables,
        names: schema.paths().into_iter().map(str::to_string).collect(),
    }
}

fn common_repetition_level(schema: &Schema, a: NodeId, b: NodeId) -> Level {
    // Both ids come from `schema.leaves()`, so the lookup cannot fail.
    schema
        .common_ancestor(a, b)
        .map(|ancestor| schema.node(ancestor).max_repetition_level())
        .unwrap_or(0)
}
