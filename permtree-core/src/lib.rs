// SPDX-License-Identifier: MIT OR Apache-2.0

//! Permission trees for role-based menu and API access.
//!
//! A [`Forest`] holds groups of menu entries. Every node carries named actions and every action
//! maps to the API resources it grants. Forests are immutable: the functions in [`tree`] return a
//! new forest for every change, sharing untouched subtrees with the previous one.
pub mod drag;
pub mod forest;
pub mod node;
pub mod selection;
pub mod tree;
pub mod yaml;

pub use drag::{DragItem, DragState};
pub use forest::Forest;
pub use node::{ApiResource, ChildDraft, GroupDraft, Icon, PermissionAction, PermissionNode};
pub use selection::{ActionKey, SelectedActions};
pub use tree::{Level, TreeError};
pub use yaml::{DecodeError, EncodeError, ExportOptions};
