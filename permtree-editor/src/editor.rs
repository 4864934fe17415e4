// SPDX-License-Identifier: MIT OR Apache-2.0

//! State of one editing session.
use std::path::Path;

use permtree_core::tree::{self, Level, TreeError};
use permtree_core::yaml::{self, DecodeError, EncodeError, ExportOptions};
use permtree_core::{
    ActionKey, ApiResource, ChildDraft, DragItem, DragState, Forest, GroupDraft, PermissionAction,
    PermissionNode, SelectedActions,
};
use tracing::{debug, warn};

use crate::file::{ExportError, ImportError, read_document};
use crate::notice::{Notice, Outbox};
use crate::routes::{self, RouteState};
use crate::seed;

const INVALID_FILE: &str = "Invalid file";
const FILE_ERROR: &str = "File error";
const INVALID_DOCUMENT: &str = "Invalid YAML";
const ROUTES_ERROR: &str = "Could not load api routes";

/// Owner of the forest, the selected actions and everything the presentation layer shows around
/// them.
///
/// Engine errors never escape as `Err`: they are turned into error notices and the forest stays
/// as it was. Methods return whether the forest changed.
#[derive(Clone, Debug, Default)]
pub struct Editor {
    forest: Forest,
    selected: SelectedActions,
    drag: DragState,
    routes: RouteState,
    login_required: bool,
    export: ExportOptions,
    notices: Outbox,
}

impl Editor {
    pub fn new(forest: Forest) -> Self {
        Self {
            forest,
            ..Default::default()
        }
    }

    /// Session with the seed forest and the seed routes.
    pub fn seeded() -> Self {
        Self {
            forest: seed::forest(),
            routes: RouteState::Loaded(seed::api_routes()),
            ..Default::default()
        }
    }

    pub fn with_export_options(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn selected(&self) -> &SelectedActions {
        &self.selected
    }

    pub fn routes(&self) -> &RouteState {
        &self.routes
    }

    /// Set after the backend rejected the stored credentials.
    pub fn login_required(&self) -> bool {
        self.login_required
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.pending()
    }

    /// Remove and return all notices which were not taken yet.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    pub fn add_group(&mut self, group: GroupDraft) -> bool {
        let outcome = tree::add_group(&self.forest, group);
        self.apply("Could not add group", outcome)
    }

    pub fn add_child(&mut self, parent_slug: &str, child: ChildDraft) -> bool {
        let outcome = tree::add_child(&self.forest, parent_slug, child);
        self.apply("Could not add child", outcome)
    }

    pub fn add_action(&mut self, target_slug: &str, action: PermissionAction) -> bool {
        let outcome = tree::add_action(&self.forest, target_slug, action);
        self.apply("Could not add action", outcome)
    }

    /// Replace the action `code` of a node. A changed code takes its selection along.
    pub fn edit_action(&mut self, node_slug: &str, code: &str, updated: PermissionAction) -> bool {
        let new_code = updated.code.trim().to_string();
        let outcome = tree::edit_action(&self.forest, node_slug, code, updated);
        if !self.apply("Could not edit action", outcome) {
            return false;
        }

        if new_code != code && self.selected.remove(node_slug, code) {
            self.selected.toggle(node_slug, &new_code, true);
        }
        true
    }

    pub fn remove_action(&mut self, node_slug: &str, code: &str) -> bool {
        self.selected.remove(node_slug, code);
        let forest = tree::remove_action(&self.forest, node_slug, code);
        self.replace(forest)
    }

    pub fn remove_child(&mut self, parent_slug: &str, child_slug: &str) -> bool {
        let forest = tree::remove_child(&self.forest, parent_slug, child_slug);
        let changed = self.replace(forest);
        if changed {
            self.selected.retain_existing(&self.forest);
        }
        changed
    }

    /// Remove the node with this slug at any depth, together with its subtree.
    pub fn remove_node(&mut self, slug: &str) -> bool {
        let forest = tree::remove_node(&self.forest, slug);
        let changed = self.replace(forest);
        if changed {
            self.selected.retain_existing(&self.forest);
        }
        changed
    }

    /// Replace the node with the same slug, keeping its children unless `updated` brings some.
    pub fn edit_node(&mut self, updated: PermissionNode) -> bool {
        let forest = tree::edit_node(&self.forest, updated);
        let changed = self.replace(forest);
        if changed {
            self.selected.retain_existing(&self.forest);
        }
        changed
    }

    /// Replace the node currently named `slug`, which allows renaming it.
    pub fn edit_node_at(&mut self, slug: &str, updated: PermissionNode) -> bool {
        let new_slug = updated.slug.trim().to_string();
        let outcome = tree::edit_node_at(&self.forest, slug, updated);
        if !self.apply("Could not edit node", outcome) {
            return false;
        }

        self.selected.rename_node(slug, &new_slug);
        self.selected.retain_existing(&self.forest);
        true
    }

    pub fn toggle_action(&mut self, slug: &str, code: &str, enabled: bool) {
        self.selected.toggle(slug, code, enabled);
        let state = if enabled { "enabled" } else { "disabled" };
        self.notices.push(Notice::info(
            "Permission Changed",
            format!("Action \"{code}\" for \"{slug}\" {state}"),
        ));
    }

    /// Select an action without a notice. Returns false if it was selected already.
    pub fn select(&mut self, key: ActionKey) -> bool {
        self.selected.insert(key)
    }

    pub fn select_all(&mut self) {
        self.selected.select_all(&self.forest);
    }

    pub fn clear_selection(&mut self) {
        self.selected = SelectedActions::new();
    }

    pub fn reorder<S: AsRef<str>>(&mut self, level: &Level, new_order: &[S]) -> bool {
        let forest = tree::reorder(&self.forest, level, new_order);
        self.replace(forest)
    }

    pub fn move_sibling(&mut self, level: &Level, dragged: &str, target: &str) -> bool {
        match tree::move_sibling(&self.forest, level, dragged, target) {
            Some(forest) => self.replace(forest),
            None => false,
        }
    }

    pub fn begin_drag(&mut self, item: DragItem) {
        self.drag.begin(item);
    }

    pub fn dragging(&self) -> Option<&DragItem> {
        self.drag.dragging()
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Drop the dragged item onto `target`. Ends the drag in any case.
    pub fn drop_on(&mut self, target: &DragItem) -> bool {
        match self.drag.drop_on(&self.forest, target) {
            Some(forest) => self.replace(forest),
            None => false,
        }
    }

    /// Replace the forest with the one described by a YAML document.
    ///
    /// Selections which do not resolve in the new forest are dropped. On error the forest stays
    /// untouched and an error notice is pushed.
    pub fn load_yaml(&mut self, text: &str) -> Result<(), DecodeError> {
        match yaml::deserialize(text) {
            Ok(forest) => {
                debug!(roots = forest.len(), "load document");
                self.forest = forest;
                self.selected.retain_existing(&self.forest);
                Ok(())
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(INVALID_DOCUMENT, err.to_string()));
                Err(err)
            }
        }
    }

    /// Read a YAML document from disk and load it.
    pub fn import_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let text = match read_document(path) {
            Ok(text) => text,
            Err(err) => {
                let title = match &err {
                    ImportError::InvalidExtension(_) => INVALID_FILE,
                    _ => FILE_ERROR,
                };
                self.notices.push(Notice::error(title, err.to_string()));
                return Err(err);
            }
        };

        // Parse errors are reported by `load_yaml` itself.
        self.load_yaml(&text)?;
        Ok(())
    }

    /// Document with the selected actions.
    pub fn export_yaml(&self) -> Result<String, EncodeError> {
        yaml::serialize_with(&self.forest, Some(&self.selected), self.export)
    }

    /// Document with the whole forest, used to save the session.
    pub fn snapshot_yaml(&self) -> Result<String, EncodeError> {
        yaml::snapshot(&self.forest)
    }

    /// Write the exported document to `path`.
    pub fn write_export(&mut self, path: &Path) -> Result<(), ExportError> {
        let outcome = self
            .export_yaml()
            .map_err(ExportError::from)
            .and_then(|text| {
                std::fs::write(path, text).map_err(|source| ExportError::Write {
                    path: path.to_path_buf(),
                    source,
                })
            });

        if let Err(err) = &outcome {
            self.notices.push(Notice::error(FILE_ERROR, err.to_string()));
        }
        outcome
    }

    pub fn routes_loading(&mut self) {
        self.routes = RouteState::Loading;
    }

    pub fn routes_loaded(&mut self, routes: Vec<ApiResource>) {
        debug!(count = routes.len(), "api routes loaded");
        self.routes = RouteState::Loaded(routes);
        self.login_required = false;
    }

    /// Record a failed route fetch. `auth_invalid` asks the user to log in again.
    pub fn routes_failed(&mut self, message: impl Into<String>, auth_invalid: bool) {
        let message = message.into();
        self.notices.push(Notice::error(ROUTES_ERROR, message.clone()));
        self.routes = RouteState::Failed(message);
        self.login_required |= auth_invalid;
    }

    /// Clear the login request, for example after a successful login.
    pub fn logged_in(&mut self) {
        self.login_required = false;
    }

    /// Loaded routes matching `query`, see [`routes::search`].
    pub fn search_routes(&self, query: &str) -> Vec<&ApiResource> {
        routes::search(self.routes.routes(), query)
    }

    fn apply(&mut self, title: &str, outcome: Result<Forest, TreeError>) -> bool {
        match outcome {
            Ok(forest) => self.replace(forest),
            Err(err) => {
                warn!(%err, "{title}");
                self.notices.push(Notice::error(title, err.to_string()));
                false
            }
        }
    }

    fn replace(&mut self, forest: Forest) -> bool {
        if forest.ptr_eq(&self.forest) {
            return false;
        }
        self.forest = forest;
        true
    }
}
