// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML projection of permission forests.
//!
//! The exported document only contains what was granted: [`serialize`] filters every node's
//! actions by the [`SelectedActions`] and drops nodes which end up without actions and without
//! children. The result is therefore lossy, use [`snapshot`] to dump a forest as a whole.
//!
//! ```yaml
//! - name: USERS
//!   slug: users
//!   icon: CreditCard
//!   sequence: 1
//!   children:
//!   - name: Admin
//!     slug: admin
//!     icon: Zap
//!     sequence: 1
//!     actions:
//!     - code: query
//!       name: QUERY
//!       resources:
//!       - method: GET
//!         path: /api/v1/users
//! ```
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

use crate::forest::Forest;
use crate::node::{Icon, PermissionAction, PermissionNode};
use crate::selection::SelectedActions;

/// Switches for the exported document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Also emit `router` and `component` of routable nodes.
    pub include_routes: bool,
}

/// Export the selected part of the forest.
pub fn serialize(forest: &Forest, selected: &SelectedActions) -> Result<String, EncodeError> {
    serialize_with(forest, Some(selected), ExportOptions::default())
}

/// Export the forest, keeping every action when `selected` is `None`.
pub fn serialize_with(
    forest: &Forest,
    selected: Option<&SelectedActions>,
    options: ExportOptions,
) -> Result<String, EncodeError> {
    let nodes: Vec<ExportNode<'_>> = forest
        .roots()
        .iter()
        .filter_map(|root| project(root, selected, options))
        .collect();

    Ok(serde_yaml::to_string(&nodes)?)
}

/// Dump the whole forest without filtering anything.
pub fn snapshot(forest: &Forest) -> Result<String, EncodeError> {
    Ok(serde_yaml::to_string(forest)?)
}

/// Parse a YAML document into a forest.
///
/// The top-level value must be a sequence. Fields missing from a node are filled with their
/// defaults. Nothing is returned unless the whole document could be read.
pub fn deserialize(text: &str) -> Result<Forest, DecodeError> {
    let value: Value = serde_yaml::from_str(text).map_err(DecodeError::Syntax)?;

    let kind = match &value {
        Value::Sequence(_) => None,
        Value::Null => Some("nothing"),
        Value::Bool(_) => Some("a boolean"),
        Value::Number(_) => Some("a number"),
        Value::String(_) => Some("a string"),
        Value::Mapping(_) => Some("a mapping"),
        Value::Tagged(_) => Some("a tagged value"),
    };

    if let Some(kind) = kind {
        return Err(DecodeError::NotASequence(kind));
    }

    serde_yaml::from_value(value).map_err(DecodeError::Shape)
}

#[derive(Debug, Serialize)]
struct ExportNode<'a> {
    name: &'a str,
    slug: &'a str,
    icon: Icon,
    #[serde(skip_serializing_if = "Option::is_none")]
    router: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<&'a str>,
    sequence: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    actions: Vec<&'a PermissionAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ExportNode<'a>>,
}

fn project<'a>(
    node: &'a PermissionNode,
    selected: Option<&SelectedActions>,
    options: ExportOptions,
) -> Option<ExportNode<'a>> {
    let actions: Vec<_> = node
        .actions
        .iter()
        .filter(|action| {
            selected.is_none_or(|selected| selected.contains(&node.slug, &action.code))
        })
        .collect();

    let children: Vec<_> = node
        .children()
        .iter()
        .filter_map(|child| project(child, selected, options))
        .collect();

    if actions.is_empty() && children.is_empty() {
        return None;
    }

    let (router, component) = if options.include_routes {
        (node.router.as_deref(), node.component.as_deref())
    } else {
        (None, None)
    };

    Some(ExportNode {
        name: &node.name,
        slug: &node.slug,
        icon: node.icon,
        router,
        component,
        sequence: node.sequence,
        actions,
        children,
    })
}

/// An error occurred while encoding a forest.
#[derive(Debug, Error)]
#[error("could not encode permission tree: {0}")]
pub struct EncodeError(#[from] serde_yaml::Error);

/// An error occurred while reading a YAML document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not valid YAML.
    #[error("invalid yaml: {0}")]
    Syntax(serde_yaml::Error),

    /// The document is valid YAML but not a list.
    #[error("expected a list of permission nodes, found {0}")]
    NotASequence(&'static str),

    /// An entry of the list does not describe a permission node.
    #[error("invalid permission node: {0}")]
    Shape(serde_yaml::Error),
}
