// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reordering of siblings.
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::forest::{Forest, display_order};
use crate::node::{PermissionAction, PermissionNode};
use crate::tree::{rewrite, sequence_at};

/// A list of siblings of the same kind under the same parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "slug", rename_all = "snake_case")]
pub enum Level {
    /// Root groups of the forest.
    Root,

    /// Children of the node with this slug.
    Children(String),

    /// Actions of the node with this slug.
    Actions(String),
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Root => write!(f, "root"),
            Level::Children(slug) => write!(f, "children:{slug}"),
            Level::Actions(slug) => write!(f, "actions:{slug}"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid level \"{0}\", expected \"root\", \"children:<slug>\" or \"actions:<slug>\"")]
pub struct InvalidLevel(pub String);

impl FromStr for Level {
    type Err = InvalidLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            None if value == "root" => Ok(Level::Root),
            Some(("children", slug)) if !slug.is_empty() => Ok(Level::Children(slug.to_string())),
            Some(("actions", slug)) if !slug.is_empty() => Ok(Level::Actions(slug.to_string())),
            _ => Err(InvalidLevel(value.to_string())),
        }
    }
}

/// Keys of the siblings at `level` in the order they are displayed.
///
/// Nodes are listed by `sequence`, actions in the order they are stored. Returns `None` if the
/// parent node does not exist.
pub fn sibling_keys(forest: &Forest, level: &Level) -> Option<Vec<String>> {
    let keys = match level {
        Level::Root => slugs(forest.roots()),
        Level::Children(parent) => slugs(forest.find(parent)?.children()),
        Level::Actions(slug) => forest
            .find(slug)?
            .actions
            .iter()
            .map(|action| action.code.clone())
            .collect(),
    };

    Some(keys)
}

/// Rearrange the siblings at `level` to follow `new_order`.
///
/// Siblings missing from `new_order` keep their relative order behind the named ones, unknown
/// keys are ignored. Nodes get their `sequence` reassigned densely from 1 in the new order,
/// actions are moved as they are.
pub fn reorder<S: AsRef<str>>(forest: &Forest, level: &Level, new_order: &[S]) -> Forest {
    match level {
        Level::Root => {
            let roots = reorder_nodes(forest.roots(), new_order);
            if shares_all(&roots, forest.roots()) {
                return forest.clone();
            }
            Forest::from_shared(roots)
        }
        Level::Children(parent) => {
            let Ok(outcome) = rewrite::<Infallible>(forest.roots(), parent, &mut |node| {
                let children = reorder_nodes(node.children(), new_order);
                if node.children.is_none() || shares_all(&children, node.children()) {
                    return Ok(None);
                }

                Ok(Some(PermissionNode {
                    children: Some(children),
                    ..node.clone()
                }))
            });
            outcome.or_unchanged(forest)
        }
        Level::Actions(slug) => {
            let Ok(outcome) = rewrite::<Infallible>(forest.roots(), slug, &mut |node| {
                let actions = arrange(
                    node.actions.iter().collect(),
                    |action: &&PermissionAction| action.code.as_str(),
                    new_order,
                );

                if actions.iter().zip(&node.actions).all(|(a, b)| a.code == b.code) {
                    return Ok(None);
                }

                Ok(Some(PermissionNode {
                    actions: actions.into_iter().cloned().collect(),
                    ..node.clone()
                }))
            });
            outcome.or_unchanged(forest)
        }
    }
}

/// Move `dragged` to the position of `target` among the siblings at `level`.
///
/// This is the drag-and-drop primitive: the dragged item is taken out of the displayed list and
/// inserted again at the index the target had. Returns `None` if either key is unknown or both
/// keys are the same.
pub fn move_sibling(forest: &Forest, level: &Level, dragged: &str, target: &str) -> Option<Forest> {
    if dragged == target {
        return None;
    }

    let mut keys = sibling_keys(forest, level)?;
    let from = keys.iter().position(|key| key == dragged)?;
    let to = keys.iter().position(|key| key == target)?;

    let moved = keys.remove(from);
    keys.insert(to, moved);

    debug!(%level, %dragged, %target, "move sibling");

    Some(reorder(forest, level, &keys))
}

fn shares_all(a: &[Arc<PermissionNode>], b: &[Arc<PermissionNode>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Arc::ptr_eq(a, b))
}

fn slugs(nodes: &[Arc<PermissionNode>]) -> Vec<String> {
    display_order(nodes)
        .into_iter()
        .map(|node| node.slug.clone())
        .collect()
}

fn reorder_nodes<S: AsRef<str>>(
    nodes: &[Arc<PermissionNode>],
    new_order: &[S],
) -> Vec<Arc<PermissionNode>> {
    let arranged = arrange(
        display_order(nodes),
        |node: &&Arc<PermissionNode>| node.slug.as_str(),
        new_order,
    );

    arranged
        .into_iter()
        .enumerate()
        .map(|(index, node)| {
            let sequence = sequence_at(index);
            if node.sequence == sequence {
                Arc::clone(node)
            } else {
                Arc::new(PermissionNode {
                    sequence,
                    ..PermissionNode::clone(node)
                })
            }
        })
        .collect()
}

/// Pick items in the order named by `new_order`, followed by all items which were not named.
fn arrange<T, S, K>(items: Vec<T>, key: K, new_order: &[S]) -> Vec<T>
where
    S: AsRef<str>,
    K: Fn(&T) -> &str,
{
    let mut remaining: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut arranged = Vec::with_capacity(remaining.len());

    for wanted in new_order {
        let slot = remaining
            .iter_mut()
            .find(|slot| matches!(slot, Some(item) if key(item) == wanted.as_ref()));

        if let Some(item) = slot.and_then(Option::take) {
            arranged.push(item);
        }
    }

    arranged.extend(remaining.into_iter().flatten());
    arranged
}
