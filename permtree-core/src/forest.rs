// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable forest of permission nodes.
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::node::PermissionNode;

/// Ordered list of root nodes.
///
/// A forest is never mutated in place. Engine operations build a new forest in which every touched
/// node and its ancestors are fresh allocations while untouched subtrees are shared with the
/// previous forest through their `Arc`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<Arc<PermissionNode>>,
}

impl Forest {
    pub fn new(roots: Vec<PermissionNode>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_shared(roots: Vec<Arc<PermissionNode>>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Arc<PermissionNode>] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns the first node with the given slug, searching depth-first in pre-order.
    ///
    /// Slugs are only guaranteed to be unique among siblings. When the same slug appears at
    /// different depths the first one in traversal order wins.
    pub fn find(&self, slug: &str) -> Option<&PermissionNode> {
        self.iter().find(|node| node.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.find(slug).is_some()
    }

    /// Iterates over all nodes depth-first in pre-order.
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: self.roots.iter().rev().map(Arc::as_ref).collect(),
        }
    }

    /// Roots in the order they are displayed, sorted by `sequence`. Equal sequences keep their
    /// position in the list.
    pub fn display_order(&self) -> Vec<&Arc<PermissionNode>> {
        display_order(&self.roots)
    }

    /// Returns true if both forests share every root allocation.
    ///
    /// Operations which turn out to be no-ops return a forest for which this holds.
    pub fn ptr_eq(&self, other: &Forest) -> bool {
        self.roots.len() == other.roots.len()
            && self
                .roots
                .iter()
                .zip(other.roots.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl From<Vec<PermissionNode>> for Forest {
    fn from(roots: Vec<PermissionNode>) -> Self {
        Forest::new(roots)
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a PermissionNode;
    type IntoIter = DepthFirst<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over a forest.
#[derive(Debug)]
pub struct DepthFirst<'a> {
    stack: Vec<&'a PermissionNode>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a PermissionNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev().map(Arc::as_ref));
        Some(node)
    }
}

pub(crate) fn display_order(nodes: &[Arc<PermissionNode>]) -> Vec<&Arc<PermissionNode>> {
    let mut sorted: Vec<_> = nodes.iter().collect();
    sorted.sort_by_key(|node| node.sequence);
    sorted
}
