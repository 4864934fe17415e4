// SPDX-License-Identifier: MIT OR Apache-2.0

//! Browser bindings for the permission tree editor.
//!
//! Structured values cross the boundary as plain JavaScript objects, documents as YAML strings.
//! Failed edits do not throw, they are reported through `takeNotices`. Only malformed arguments
//! raise a JavaScript `Error`.
use std::panic;

use console_error_panic_hook::hook as panic_hook;
use permtree_core::{
    ApiResource, ChildDraft, DragItem, GroupDraft, Icon, Level, PermissionAction, PermissionNode,
};
use permtree_editor::{Editor, autocomplete};
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

use crate::js::{deserialize_from_js, serialize_to_js};

mod js;

macro_rules! jserr {
    ($l:expr) => {
        $l.map_err::<JsValue, _>(|err| js_sys::Error::new(&format!("{}", err)).into())?
    };
}

/// Sets a [`panic hook`] for better error messages in NodeJS or web browser.
///
/// [`panic hook`]: https://crates.io/crates/console_error_panic_hook
#[wasm_bindgen(js_name = setWasmPanicHook)]
pub fn set_wasm_panic_hook() {
    panic::set_hook(Box::new(panic_hook));
}

#[derive(Serialize)]
struct Completion {
    text: String,
    cursor: usize,
}

/// Editing session over one permission tree.
#[wasm_bindgen]
#[derive(Debug)]
pub struct PermissionEditor(Editor);

#[wasm_bindgen]
impl PermissionEditor {
    /// Starts with the sample tree and the sample API routes.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self(Editor::seeded())
    }

    /// Starts with the tree described by a YAML document.
    #[wasm_bindgen(js_name = fromYaml)]
    pub fn from_yaml(text: String) -> Result<PermissionEditor, JsValue> {
        let mut editor = Editor::default();
        jserr!(editor.load_yaml(&text));
        editor.take_notices();
        Ok(Self(editor))
    }

    /// The whole tree as a list of node objects.
    pub fn forest(&self) -> Result<JsValue, JsValue> {
        Ok(jserr!(serialize_to_js(self.0.forest())))
    }

    /// Selected actions as a list of "slug:code" strings.
    pub fn selected(&self) -> Result<JsValue, JsValue> {
        Ok(jserr!(serialize_to_js(self.0.selected())))
    }

    #[wasm_bindgen(js_name = addGroup)]
    pub fn add_group(&mut self, name: String, slug: String, icon: String) -> Result<bool, JsValue> {
        let icon = jserr!(icon.parse::<Icon>());
        Ok(self.0.add_group(GroupDraft::new(name, slug, icon)))
    }

    #[wasm_bindgen(js_name = addChild)]
    pub fn add_child(
        &mut self,
        parent_slug: String,
        name: String,
        slug: String,
        icon: String,
        router: String,
        component: String,
    ) -> Result<bool, JsValue> {
        let icon = jserr!(icon.parse::<Icon>());
        let draft = ChildDraft::new(name, slug, icon, router, component);
        Ok(self.0.add_child(&parent_slug, draft))
    }

    /// Adds an action given as `{code, name, resources}`.
    #[wasm_bindgen(js_name = addAction)]
    pub fn add_action(&mut self, target_slug: String, action: JsValue) -> Result<bool, JsValue> {
        let action: PermissionAction = jserr!(deserialize_from_js(action));
        Ok(self.0.add_action(&target_slug, action))
    }

    #[wasm_bindgen(js_name = editAction)]
    pub fn edit_action(
        &mut self,
        node_slug: String,
        code: String,
        action: JsValue,
    ) -> Result<bool, JsValue> {
        let action: PermissionAction = jserr!(deserialize_from_js(action));
        Ok(self.0.edit_action(&node_slug, &code, action))
    }

    /// Replaces the node currently named `slug`. Children are kept when `node` has none.
    #[wasm_bindgen(js_name = editNode)]
    pub fn edit_node(&mut self, slug: String, node: JsValue) -> Result<bool, JsValue> {
        let node: PermissionNode = jserr!(deserialize_from_js(node));
        Ok(self.0.edit_node_at(&slug, node))
    }

    #[wasm_bindgen(js_name = removeAction)]
    pub fn remove_action(&mut self, node_slug: String, code: String) -> bool {
        self.0.remove_action(&node_slug, &code)
    }

    #[wasm_bindgen(js_name = removeChild)]
    pub fn remove_child(&mut self, parent_slug: String, child_slug: String) -> bool {
        self.0.remove_child(&parent_slug, &child_slug)
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, slug: String) -> bool {
        self.0.remove_node(&slug)
    }

    #[wasm_bindgen(js_name = toggleAction)]
    pub fn toggle_action(&mut self, slug: String, code: String, enabled: bool) {
        self.0.toggle_action(&slug, &code, enabled);
    }

    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) {
        self.0.select_all();
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.0.clear_selection();
    }

    /// `level` is "root", "children:<slug>" or "actions:<slug>".
    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, level: String, key: String) -> Result<(), JsValue> {
        let level = jserr!(level.parse::<Level>());
        self.0.begin_drag(DragItem::new(level, key));
        Ok(())
    }

    #[wasm_bindgen(js_name = dropOn)]
    pub fn drop_on(&mut self, level: String, key: String) -> Result<bool, JsValue> {
        let level = jserr!(level.parse::<Level>());
        Ok(self.0.drop_on(&DragItem::new(level, key)))
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.0.cancel_drag();
    }

    #[wasm_bindgen(js_name = moveSibling)]
    pub fn move_sibling(
        &mut self,
        level: String,
        dragged: String,
        target: String,
    ) -> Result<bool, JsValue> {
        let level = jserr!(level.parse::<Level>());
        Ok(self.0.move_sibling(&level, &dragged, &target))
    }

    /// Replaces the tree, parse errors end up in the notices.
    #[wasm_bindgen(js_name = loadYaml)]
    pub fn load_yaml(&mut self, text: String) -> bool {
        self.0.load_yaml(&text).is_ok()
    }

    /// Document with the selected actions only.
    #[wasm_bindgen(js_name = exportYaml)]
    pub fn export_yaml(&self) -> Result<String, JsValue> {
        Ok(jserr!(self.0.export_yaml()))
    }

    /// Document with the whole tree.
    #[wasm_bindgen(js_name = snapshotYaml)]
    pub fn snapshot_yaml(&self) -> Result<String, JsValue> {
        Ok(jserr!(self.0.snapshot_yaml()))
    }

    #[wasm_bindgen(js_name = routesLoading)]
    pub fn routes_loading(&mut self) {
        self.0.routes_loading();
    }

    /// Takes a list of `{method, path}` objects.
    #[wasm_bindgen(js_name = routesLoaded)]
    pub fn routes_loaded(&mut self, routes: JsValue) -> Result<(), JsValue> {
        let routes: Vec<ApiResource> = jserr!(deserialize_from_js(routes));
        self.0.routes_loaded(routes);
        Ok(())
    }

    #[wasm_bindgen(js_name = routesFailed)]
    pub fn routes_failed(&mut self, message: String, auth_invalid: bool) {
        self.0.routes_failed(message, auth_invalid);
    }

    #[wasm_bindgen(js_name = loginRequired)]
    pub fn login_required(&self) -> bool {
        self.0.login_required()
    }

    #[wasm_bindgen(js_name = loggedIn)]
    pub fn logged_in(&mut self) {
        self.0.logged_in();
    }

    /// Loaded routes matching `query`.
    #[wasm_bindgen(js_name = searchRoutes)]
    pub fn search_routes(&self, query: String) -> Result<JsValue, JsValue> {
        Ok(jserr!(serialize_to_js(&self.0.search_routes(&query))))
    }

    /// Notices since the last call as a list of `{level, title, description}`.
    #[wasm_bindgen(js_name = takeNotices)]
    pub fn take_notices(&mut self) -> Result<JsValue, JsValue> {
        Ok(jserr!(serialize_to_js(&self.0.take_notices())))
    }

    /// Completions for the word ending at `cursor`.
    pub fn suggest(&self, text: String, cursor: usize) -> Result<JsValue, JsValue> {
        let suggestions = autocomplete::suggest(&text, cursor, self.0.routes().routes());
        Ok(jserr!(serialize_to_js(&suggestions)))
    }

    /// Inserts `completion` and returns `{text, cursor}`.
    #[wasm_bindgen(js_name = applyCompletion)]
    pub fn apply_completion(
        &self,
        text: String,
        cursor: usize,
        completion: String,
    ) -> Result<JsValue, JsValue> {
        let (text, cursor) = autocomplete::apply(&text, cursor, &completion);
        Ok(jserr!(serialize_to_js(&Completion { text, cursor })))
    }
}

impl Default for PermissionEditor {
    fn default() -> Self {
        Self::new()
    }
}
