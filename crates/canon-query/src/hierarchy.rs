// SPDX-License-Identifier: Apache-2.0

//! Folding denormalized join rows into nested trees.
//!
//! Each tree level is a [`GroupIndex`]: nodes in first-seen order plus a key lookup. The
//! lookup is never iterated, so output order is exactly input order.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::warn;

/// A tree node built from the first row carrying its key.
pub trait Shell<R> {
    fn from_row(row: &R) -> Self;

    /// Whether `row` repeats the ancestor columns this node was built from.
    fn matches(&self, row: &R) -> bool;
}

#[derive(Debug, Clone)]
pub struct GroupIndex<K, N> {
    level: &'static str,
    nodes: Vec<N>,
    positions: HashMap<K, usize>,
    conflicts: usize,
}

impl<K, N> GroupIndex<K, N>
where
    K: Eq + Hash + Debug,
{
    #[must_use]
    pub fn new(level: &'static str) -> Self {
        Self {
            level,
            nodes: Vec::new(),
            positions: HashMap::new(),
            conflicts: 0,
        }
    }

    /// Returns the node for `key`, creating it from `row` on first sight.
    ///
    /// A later row that disagrees with the node's columns is counted and logged; the
    /// first-seen values stay.
    pub fn entry<R>(&mut self, key: K, row: &R) -> &mut N
    where
        N: Shell<R>,
    {
        if let Some(pos) = self.positions.get(&key).copied() {
            if !self.nodes[pos].matches(row) {
                self.conflicts += 1;
                warn!(
                    level = self.level,
                    key = ?key,
                    "join rows disagree on ancestor columns; keeping first-seen values"
                );
            }
            return &mut self.nodes[pos];
        }
        let pos = self.nodes.len();
        self.nodes.push(N::from_row(row));
        self.positions.insert(key, pos);
        &mut self.nodes[pos]
    }

    /// Existing node for `key`; used to attach rows from a second query to the tree.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut N> {
        let pos = *self.positions.get(key)?;
        self.nodes.get_mut(pos)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    /// Rows whose ancestor columns contradicted an existing node, this level only.
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<N> {
        self.nodes
    }
}

impl<K, N: Serialize> Serialize for GroupIndex<K, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.nodes)
    }
}

/// One-level fold: groups `rows` by `key` and hands every row to `add_leaf` on its group.
pub fn assemble<R, K, N>(
    level: &'static str,
    rows: &[R],
    key: impl Fn(&R) -> K,
    mut add_leaf: impl FnMut(&mut N, &R),
) -> GroupIndex<K, N>
where
    K: Eq + Hash + Debug,
    N: Shell<R>,
{
    let mut groups = GroupIndex::new(level);
    for row in rows {
        let node = groups.entry(key(row), row);
        add_leaf(node, row);
    }
    groups
}
