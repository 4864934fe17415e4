// SPDX-License-Identifier: MIT OR Apache-2.0

//! Set of actions granted to the role being edited.
//!
//! The selection is independent of the tree structure. It only decides which actions end up in
//! the exported document, see [`crate::yaml::serialize`].
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forest::Forest;

/// Composite `"<slug>:<code>"` key of an action.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionKey {
    pub slug: String,
    pub code: String,
}

impl ActionKey {
    pub fn new(slug: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            code: code.into(),
        }
    }
}

impl Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.slug, self.code)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid action key \"{0}\", expected \"<slug>:<code>\"")]
pub struct InvalidActionKey(pub String);

/// Splits at the first `:`, so action codes may contain colons but slugs may not.
impl FromStr for ActionKey {
    type Err = InvalidActionKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            Some((slug, code)) if !slug.is_empty() && !code.is_empty() => {
                Ok(ActionKey::new(slug, code))
            }
            _ => Err(InvalidActionKey(value.to_string())),
        }
    }
}

impl TryFrom<String> for ActionKey {
    type Error = InvalidActionKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionKey> for String {
    fn from(key: ActionKey) -> Self {
        key.to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedActions(BTreeSet<ActionKey>);

impl SelectedActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, slug: &str, code: &str) -> bool {
        self.0.contains(&ActionKey::new(slug, code))
    }

    pub fn insert(&mut self, key: ActionKey) -> bool {
        self.0.insert(key)
    }

    pub fn remove(&mut self, slug: &str, code: &str) -> bool {
        self.0.remove(&ActionKey::new(slug, code))
    }

    /// Enables or disables an action.
    pub fn toggle(&mut self, slug: &str, code: &str, enabled: bool) {
        if enabled {
            self.0.insert(ActionKey::new(slug, code));
        } else {
            self.remove(slug, code);
        }
    }

    /// Moves all keys of a node to a new slug.
    pub fn rename_node(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }

        let moved: Vec<ActionKey> = self.0.iter().filter(|key| key.slug == from).cloned().collect();
        for key in moved {
            self.0.remove(&key);
            self.0.insert(ActionKey::new(to, key.code));
        }
    }

    /// Selects every action of every node in the forest.
    pub fn select_all(&mut self, forest: &Forest) {
        for node in forest {
            for action in &node.actions {
                self.0.insert(ActionKey::new(&node.slug, &action.code));
            }
        }
    }

    /// Drops keys which do not resolve to an action of the forest anymore.
    pub fn retain_existing(&mut self, forest: &Forest) {
        self.0.retain(|key| {
            forest
                .iter()
                .any(|node| node.slug == key.slug && node.action(&key.code).is_some())
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionKey> {
        self.0.iter()
    }
}

impl FromIterator<ActionKey> for SelectedActions {
    fn from_iter<T: IntoIterator<Item = ActionKey>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
