// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable mutation engine for permission forests.
//!
//! Every operation takes the current [`Forest`] by reference and returns a new one. The input is
//! never modified: the path from the touched node up to its root is rebuilt while all other
//! subtrees are shared with the previous forest.
//!
//! Operations which create something (`add_*`, `edit_action`, `edit_node_at`) validate their
//! arguments and return a [`TreeError`] if a precondition does not hold, the caller then simply
//! keeps its previous forest. Removals and plain edits of nodes which do not exist are no-ops and
//! return a forest sharing every node with the input.
//!
//! Nodes are addressed by slug. Lookups run depth-first in pre-order and stop at the first match,
//! slugs are only checked for uniqueness among siblings.
use std::convert::Infallible;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::forest::Forest;
use crate::node::{ChildDraft, GroupDraft, PermissionAction, PermissionNode};

mod reorder;
#[cfg(test)]
mod tests;

pub use reorder::{Level, move_sibling, reorder, sibling_keys};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("a group with slug \"{0}\" already exists")]
    DuplicateGroup(String),

    #[error("\"{parent}\" already has a child with slug \"{slug}\"")]
    DuplicateChild { parent: String, slug: String },

    #[error("\"{slug}\" already has an action with code \"{code}\"")]
    DuplicateAction { slug: String, code: String },

    #[error("action \"{0}\" needs at least one api resource")]
    EmptyResources(String),

    #[error("no node with slug \"{0}\" exists")]
    UnknownNode(String),

    #[error("\"{slug}\" has no action with code \"{code}\"")]
    UnknownAction { slug: String, code: String },
}

/// Append a new root group.
///
/// The group starts without actions or children and is placed after all existing roots.
pub fn add_group(forest: &Forest, group: GroupDraft) -> Result<Forest, TreeError> {
    let name = required("name", &group.name)?;
    let slug = required("slug", &group.slug)?;

    if forest.roots().iter().any(|root| root.slug == slug) {
        return Err(TreeError::DuplicateGroup(slug));
    }

    debug!(%slug, "add group");

    let mut roots = forest.roots().to_vec();
    roots.push(Arc::new(PermissionNode {
        name,
        slug,
        icon: group.icon,
        router: None,
        component: None,
        sequence: sequence_at(roots.len()),
        actions: Vec::new(),
        children: Some(Vec::new()),
    }));

    Ok(Forest::from_shared(roots))
}

/// Append a routable child to the node with slug `parent_slug`.
pub fn add_child(
    forest: &Forest,
    parent_slug: &str,
    child: ChildDraft,
) -> Result<Forest, TreeError> {
    let name = required("name", &child.name)?;
    let slug = required("slug", &child.slug)?;
    let router = required("router", &child.router)?;
    let component = required("component", &child.component)?;

    let mut pending = Some(PermissionNode {
        name,
        slug,
        icon: child.icon,
        router: Some(router),
        component: Some(component),
        sequence: 0,
        actions: Vec::new(),
        children: None,
    });

    let outcome = rewrite(forest.roots(), parent_slug, &mut |parent| {
        let Some(mut child) = pending.take() else {
            return Ok(None);
        };

        if parent.child(&child.slug).is_some() {
            return Err(TreeError::DuplicateChild {
                parent: parent.slug.clone(),
                slug: child.slug,
            });
        }

        debug!(parent = %parent.slug, slug = %child.slug, "add child");

        let mut children = parent.children().to_vec();
        child.sequence = sequence_at(children.len());
        children.push(Arc::new(child));

        Ok(Some(PermissionNode {
            children: Some(children),
            ..parent.clone()
        }))
    })?;

    outcome.into_forest(forest, parent_slug)
}

/// Append an action to the node with slug `target_slug`.
pub fn add_action(
    forest: &Forest,
    target_slug: &str,
    action: PermissionAction,
) -> Result<Forest, TreeError> {
    let mut pending = Some(validate_action(action)?);

    let outcome = rewrite(forest.roots(), target_slug, &mut |target| {
        let Some(action) = pending.take() else {
            return Ok(None);
        };

        if target.action(&action.code).is_some() {
            return Err(TreeError::DuplicateAction {
                slug: target.slug.clone(),
                code: action.code,
            });
        }

        debug!(slug = %target.slug, code = %action.code, "add action");

        let mut updated = target.clone();
        updated.actions.push(action);
        Ok(Some(updated))
    })?;

    outcome.into_forest(forest, target_slug)
}

/// Replace the action `code` of node `node_slug`, keeping its position.
pub fn edit_action(
    forest: &Forest,
    node_slug: &str,
    code: &str,
    updated: PermissionAction,
) -> Result<Forest, TreeError> {
    let mut pending = Some(validate_action(updated)?);

    let outcome = rewrite(forest.roots(), node_slug, &mut |node| {
        let Some(updated) = pending.take() else {
            return Ok(None);
        };

        let Some(index) = node.actions.iter().position(|action| action.code == code) else {
            return Err(TreeError::UnknownAction {
                slug: node.slug.clone(),
                code: code.to_string(),
            });
        };

        if updated.code != code && node.action(&updated.code).is_some() {
            return Err(TreeError::DuplicateAction {
                slug: node.slug.clone(),
                code: updated.code,
            });
        }

        if node.actions[index] == updated {
            return Ok(None);
        }

        debug!(slug = %node.slug, %code, "edit action");

        let mut node = node.clone();
        node.actions[index] = updated;
        Ok(Some(node))
    })?;

    outcome.into_forest(forest, node_slug)
}

/// Remove the action `code` from node `node_slug`.
///
/// Removing an action which does not exist is not an error.
pub fn remove_action(forest: &Forest, node_slug: &str, code: &str) -> Forest {
    let Ok(outcome) = rewrite::<Infallible>(forest.roots(), node_slug, &mut |node| {
        if node.action(code).is_none() {
            return Ok(None);
        }

        debug!(slug = %node.slug, %code, "remove action");

        let mut node = node.clone();
        node.actions.retain(|action| action.code != code);
        Ok(Some(node))
    });

    outcome.or_unchanged(forest)
}

/// Remove the direct child `child_slug` of node `parent_slug` together with its subtree.
pub fn remove_child(forest: &Forest, parent_slug: &str, child_slug: &str) -> Forest {
    let Ok(outcome) = rewrite::<Infallible>(forest.roots(), parent_slug, &mut |parent| {
        if parent.child(child_slug).is_none() {
            return Ok(None);
        }

        debug!(parent = %parent.slug, slug = %child_slug, "remove child");

        let children = parent
            .children()
            .iter()
            .filter(|child| child.slug != child_slug)
            .cloned()
            .collect();

        Ok(Some(PermissionNode {
            children: Some(children),
            ..parent.clone()
        }))
    });

    outcome.or_unchanged(forest)
}

/// Remove the first node with the given slug, at any depth, together with its subtree.
pub fn remove_node(forest: &Forest, slug: &str) -> Forest {
    match remove_first(forest.roots(), slug) {
        Some(roots) => {
            debug!(%slug, "remove node");
            Forest::from_shared(roots)
        }
        None => forest.clone(),
    }
}

/// Replace the node with the same slug as `updated`.
///
/// When `updated.children` is `None` the existing children of the node are kept, this allows
/// editing scalar fields without re-specifying the subtree. `Some` replaces them entirely.
pub fn edit_node(forest: &Forest, updated: PermissionNode) -> Forest {
    let slug = updated.slug.clone();
    let mut pending = Some(updated);

    let Ok(outcome) = rewrite::<Infallible>(forest.roots(), &slug, &mut |node| {
        Ok(pending.take().map(|updated| merge_children(node, updated)))
    });

    outcome.or_unchanged(forest)
}

/// Replace the node currently named `slug` with `updated`, which may carry a different slug.
///
/// Name and slug of `updated` must not be empty and a new slug must not collide with one of the
/// node's siblings. Children are merged as in [`edit_node`].
pub fn edit_node_at(
    forest: &Forest,
    slug: &str,
    updated: PermissionNode,
) -> Result<Forest, TreeError> {
    let name = required("name", &updated.name)?;
    let new_slug = required("slug", &updated.slug)?;

    let Some(parent) = locate(forest.roots(), None, slug) else {
        return Err(TreeError::UnknownNode(slug.to_string()));
    };

    if new_slug != slug {
        let siblings = parent.map_or(forest.roots(), PermissionNode::children);
        if siblings.iter().any(|sibling| sibling.slug == new_slug) {
            return Err(match parent {
                Some(parent) => TreeError::DuplicateChild {
                    parent: parent.slug.clone(),
                    slug: new_slug,
                },
                None => TreeError::DuplicateGroup(new_slug),
            });
        }
    }

    let mut pending = Some(PermissionNode {
        name,
        slug: new_slug,
        ..updated
    });

    let outcome = rewrite(forest.roots(), slug, &mut |node| {
        Ok(pending.take().map(|updated| merge_children(node, updated)))
    })?;

    outcome.into_forest(forest, slug)
}

fn merge_children(existing: &PermissionNode, mut updated: PermissionNode) -> PermissionNode {
    if updated.children.is_none() {
        updated.children = existing.children.clone();
    }
    updated
}

fn validate_action(action: PermissionAction) -> Result<PermissionAction, TreeError> {
    let code = required("code", &action.code)?;
    let name = required("name", &action.name)?;

    if action.resources.is_empty() {
        return Err(TreeError::EmptyResources(code));
    }

    Ok(PermissionAction {
        code,
        name,
        resources: action.resources,
    })
}

fn required(field: &'static str, value: &str) -> Result<String, TreeError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TreeError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Dense 1-based sequence of the sibling at `index`.
pub(crate) fn sequence_at(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Result of rebuilding the path to a node.
pub(crate) enum Rewrite {
    /// No node with the requested slug exists.
    NotFound,

    /// The node was found but did not need to change.
    Unchanged,

    /// Rebuilt list of roots.
    Replaced(Vec<Arc<PermissionNode>>),
}

impl Rewrite {
    fn into_forest(self, forest: &Forest, slug: &str) -> Result<Forest, TreeError> {
        match self {
            Rewrite::NotFound => Err(TreeError::UnknownNode(slug.to_string())),
            Rewrite::Unchanged => Ok(forest.clone()),
            Rewrite::Replaced(roots) => Ok(Forest::from_shared(roots)),
        }
    }

    pub(crate) fn or_unchanged(self, forest: &Forest) -> Forest {
        match self {
            Rewrite::Replaced(roots) => Forest::from_shared(roots),
            Rewrite::NotFound | Rewrite::Unchanged => forest.clone(),
        }
    }
}

/// Find the first node with `slug` and replace it with what `update` returns.
///
/// Only the first match is visited, even when `update` decides to leave it untouched.
pub(crate) fn rewrite<E>(
    nodes: &[Arc<PermissionNode>],
    slug: &str,
    update: &mut dyn FnMut(&PermissionNode) -> Result<Option<PermissionNode>, E>,
) -> Result<Rewrite, E> {
    for (index, node) in nodes.iter().enumerate() {
        let replacement = if node.slug == slug {
            match update(node)? {
                Some(updated) => updated,
                None => return Ok(Rewrite::Unchanged),
            }
        } else {
            match rewrite(node.children(), slug, update)? {
                Rewrite::NotFound => continue,
                Rewrite::Unchanged => return Ok(Rewrite::Unchanged),
                Rewrite::Replaced(children) => PermissionNode {
                    children: Some(children),
                    ..PermissionNode::clone(node)
                },
            }
        };

        let mut rebuilt = nodes.to_vec();
        rebuilt[index] = Arc::new(replacement);
        return Ok(Rewrite::Replaced(rebuilt));
    }

    Ok(Rewrite::NotFound)
}

fn remove_first(nodes: &[Arc<PermissionNode>], slug: &str) -> Option<Vec<Arc<PermissionNode>>> {
    for (index, node) in nodes.iter().enumerate() {
        if node.slug == slug {
            let mut rebuilt = nodes.to_vec();
            rebuilt.remove(index);
            return Some(rebuilt);
        }

        if let Some(children) = remove_first(node.children(), slug) {
            let mut rebuilt = nodes.to_vec();
            rebuilt[index] = Arc::new(PermissionNode {
                children: Some(children),
                ..PermissionNode::clone(node)
            });
            return Some(rebuilt);
        }
    }

    None
}

/// Find the first node with `slug` and return its parent, `Some(None)` for roots.
fn locate<'a>(
    nodes: &'a [Arc<PermissionNode>],
    parent: Option<&'a PermissionNode>,
    slug: &str,
) -> Option<Option<&'a PermissionNode>> {
    for node in nodes {
        if node.slug == slug {
            return Some(parent);
        }

        if let Some(found) = locate(node.children(), Some(node), slug) {
            return Some(found);
        }
    }

    None
}
