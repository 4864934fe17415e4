// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data-types of the permission tree.
//!
//! A permission tree is a forest of [`PermissionNode`]s. Groups sit at the roots, their children
//! may nest arbitrarily deep and every node carries an ordered list of [`PermissionAction`]s. An
//! action grants access to one or more backend [`ApiResource`]s.
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Icon shown next to a node in the menu.
///
/// This is a presentation hint only, the engine never looks at it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    #[default]
    CreditCard,

    /// Older documents call this icon "LightningCharge".
    #[serde(alias = "LightningCharge")]
    Zap,

    Home,
}

impl Icon {
    pub const ALL: [Icon; 3] = [Icon::CreditCard, Icon::Zap, Icon::Home];

    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::CreditCard => "CreditCard",
            Icon::Zap => "Zap",
            Icon::Home => "Home",
        }
    }
}

impl Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown icon \"{0}\", expected one of CreditCard, Zap or Home")]
pub struct UnknownIcon(pub String);

impl FromStr for Icon {
    type Err = UnknownIcon;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CreditCard" => Ok(Icon::CreditCard),
            "Zap" | "LightningCharge" => Ok(Icon::Zap),
            "Home" => Ok(Icon::Home),
            _ => Err(UnknownIcon(value.to_string())),
        }
    }
}

/// A backend route an action grants access to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiResource {
    /// HTTP verb, for example "GET".
    pub method: String,

    /// Route template, may contain `:param` segments.
    pub path: String,

    /// Optional scoping qualifier, for example "OWN".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl ApiResource {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Returns true if both resources point at the same route, regardless of their attribute.
    pub fn same_route(&self, other: &ApiResource) -> bool {
        self.method == other.method && self.path == other.path
    }
}

impl Display for ApiResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(attribute) = &self.attribute {
            write!(f, " [{attribute}]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid api resource \"{0}\", expected \"METHOD path [ATTRIBUTE]\"")]
pub struct InvalidResource(pub String);

/// Parses the `"METHOD path"` form with an optional trailing attribute, as typed by operators.
impl FromStr for ApiResource {
    type Err = InvalidResource;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split_whitespace();
        let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
            return Err(InvalidResource(value.to_string()));
        };

        let attribute = match (parts.next(), parts.next()) {
            (None, _) => None,
            (Some(attribute), None) => Some(
                attribute
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .to_string(),
            ),
            (Some(_), Some(_)) => return Err(InvalidResource(value.to_string())),
        };

        Ok(ApiResource {
            method: method.to_uppercase(),
            path: path.to_string(),
            attribute,
        })
    }
}

/// A named capability attached to a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAction {
    /// Identifier of the action, unique within its node.
    pub code: String,

    /// Display label.
    pub name: String,

    /// Routes granted by this action, never empty for actions created through the engine.
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

impl PermissionAction {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        resources: Vec<ApiResource>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            resources,
        }
    }
}

/// Entry in the permission forest.
///
/// Every field has a default so documents with missing fields still load; the engine validates
/// drafts when nodes are created, not when they are read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionNode {
    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "id")]
    pub slug: String,

    #[serde(default)]
    pub icon: Icon,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(default)]
    pub sequence: u32,

    #[serde(default)]
    pub actions: Vec<PermissionAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Arc<PermissionNode>>>,
}

impl PermissionNode {
    /// Children of this node, empty for leaves.
    pub fn children(&self) -> &[Arc<PermissionNode>] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn action(&self, code: &str) -> Option<&PermissionAction> {
        self.actions.iter().find(|action| action.code == code)
    }

    pub fn child(&self, slug: &str) -> Option<&Arc<PermissionNode>> {
        self.children().iter().find(|child| child.slug == slug)
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// Fields of a new root group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
    pub slug: String,
    pub icon: Icon,
}

impl GroupDraft {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, icon: Icon) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            icon,
        }
    }
}

/// Fields of a new child node. Children are routable and need both a router and a component.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildDraft {
    pub name: String,
    pub slug: String,
    pub icon: Icon,
    pub router: String,
    pub component: String,
}

impl ChildDraft {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        icon: Icon,
        router: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            icon,
            router: router.into(),
            component: component.into(),
        }
    }
}
