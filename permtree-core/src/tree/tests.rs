// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use assert_matches::assert_matches;

use crate::drag::{DragItem, DragState};
use crate::forest::Forest;
use crate::node::{ApiResource, ChildDraft, GroupDraft, Icon, PermissionAction, PermissionNode};

use super::{
    Level, TreeError, add_action, add_child, add_group, edit_action, edit_node, edit_node_at,
    move_sibling, remove_action, remove_child, remove_node, reorder, sibling_keys,
};

fn users_forest() -> Forest {
    Forest::new(vec![PermissionNode {
        name: "USERS".into(),
        slug: "users".into(),
        icon: Icon::CreditCard,
        sequence: 1,
        children: Some(vec![]),
        ..Default::default()
    }])
}

fn admin_draft() -> ChildDraft {
    ChildDraft::new("Admin", "admin", Icon::Zap, "/admin", "admin/index")
}

fn add(code: &str) -> PermissionAction {
    PermissionAction::new(
        code,
        code.to_uppercase(),
        vec![ApiResource::new("POST", "/api/v1/users")],
    )
}

fn groups(slugs: &[&str]) -> Forest {
    let mut forest = Forest::default();
    for slug in slugs {
        forest =
            add_group(&forest, GroupDraft::new(slug.to_uppercase(), *slug, Icon::Home)).unwrap();
    }
    forest
}

fn root_order(forest: &Forest) -> Vec<(String, u32)> {
    forest
        .roots()
        .iter()
        .map(|root| (root.slug.clone(), root.sequence))
        .collect()
}

#[test]
fn add_group_appends_root() {
    let forest = groups(&["g1", "g2"]);
    let forest =
        add_group(&forest, GroupDraft::new("  Reports ", " reports ", Icon::Home)).unwrap();

    assert_eq!(forest.len(), 3);
    let group = &forest.roots()[2];
    assert_eq!(group.name, "Reports");
    assert_eq!(group.slug, "reports");
    assert_eq!(group.sequence, 3);
    assert!(group.actions.is_empty());
    assert_eq!(group.children.as_deref(), Some(&[][..]));
}

#[test]
fn add_group_rejects_invalid_drafts() {
    let forest = groups(&["g1"]);

    let result = add_group(&forest, GroupDraft::new("Again", "g1", Icon::Home));
    assert_eq!(result, Err(TreeError::DuplicateGroup("g1".into())));

    let result = add_group(&forest, GroupDraft::new("   ", "g2", Icon::Home));
    assert_eq!(result, Err(TreeError::MissingField("name")));

    let result = add_group(&forest, GroupDraft::new("G2", "", Icon::Home));
    assert_eq!(result, Err(TreeError::MissingField("slug")));

    // The caller still holds the untouched forest.
    assert_eq!(forest.len(), 1);
}

#[test]
fn add_child_example() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();

    assert_eq!(
        forest.roots()[0].children(),
        &[Arc::new(PermissionNode {
            name: "Admin".into(),
            slug: "admin".into(),
            icon: Icon::Zap,
            router: Some("/admin".into()),
            component: Some("admin/index".into()),
            sequence: 1,
            actions: vec![],
            children: None,
        })]
    );

    let forest = add_child(
        &forest,
        "users",
        ChildDraft::new("Teacher", "teacher", Icon::Zap, "/teacher", "teacher/index"),
    )
    .unwrap();
    assert_eq!(forest.find("teacher").unwrap().sequence, 2);
}

#[test]
fn add_child_descends_into_nested_nodes() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();
    let forest = add_child(
        &forest,
        "admin",
        ChildDraft::new("Audit", "audit", Icon::Home, "/admin/audit", "admin/audit"),
    )
    .unwrap();

    let admin = forest.find("admin").unwrap();
    assert_eq!(admin.children().len(), 1);
    assert_eq!(admin.children()[0].slug, "audit");
}

#[test]
fn add_child_errors() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();

    assert_eq!(
        add_child(&forest, "users", admin_draft()),
        Err(TreeError::DuplicateChild {
            parent: "users".into(),
            slug: "admin".into()
        })
    );

    assert_eq!(
        add_child(&forest, "ghost", ChildDraft::new("X", "x", Icon::Zap, "/x", "x")),
        Err(TreeError::UnknownNode("ghost".into()))
    );

    assert_eq!(
        add_child(&forest, "users", ChildDraft::new("X", "x", Icon::Zap, "", "x")),
        Err(TreeError::MissingField("router"))
    );

    assert_eq!(
        add_child(&forest, "users", ChildDraft::new("X", "x", Icon::Zap, "/x", " ")),
        Err(TreeError::MissingField("component"))
    );
}

#[test]
fn add_action_twice_is_rejected() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();

    let forest = add_action(&forest, "admin", add("add")).unwrap();
    let result = add_action(&forest, "admin", add("add"));

    assert_eq!(
        result,
        Err(TreeError::DuplicateAction {
            slug: "admin".into(),
            code: "add".into()
        })
    );
    assert_eq!(forest.find("admin").unwrap().actions.len(), 1);
}

#[test]
fn add_action_errors() {
    let forest = users_forest();

    assert_eq!(
        add_action(&forest, "users", PermissionAction::new("add", "ADD", vec![])),
        Err(TreeError::EmptyResources("add".into()))
    );
    assert_eq!(
        add_action(&forest, "users", PermissionAction::new("", "ADD", vec![])),
        Err(TreeError::MissingField("code"))
    );
    assert_eq!(
        add_action(&forest, "ghost", add("add")),
        Err(TreeError::UnknownNode("ghost".into()))
    );
}

#[test]
fn add_action_keeps_insertion_order() {
    let forest = users_forest();
    let forest = add_action(&forest, "users", add("add")).unwrap();
    let forest = add_action(&forest, "users", add("edit")).unwrap();
    let forest = add_action(&forest, "users", add("delete")).unwrap();

    let codes: Vec<_> = forest.roots()[0]
        .actions
        .iter()
        .map(|action| action.code.as_str())
        .collect();
    assert_eq!(codes, vec!["add", "edit", "delete"]);
}

#[test]
fn untouched_subtrees_are_shared() {
    let forest = groups(&["g1", "g2"]);
    let updated = add_action(&forest, "g2", add("add")).unwrap();

    assert!(Arc::ptr_eq(&forest.roots()[0], &updated.roots()[0]));
    assert!(!Arc::ptr_eq(&forest.roots()[1], &updated.roots()[1]));

    // The previous forest did not change.
    assert!(forest.roots()[1].actions.is_empty());
}

#[test]
fn remove_action_is_idempotent() {
    let forest = add_action(&users_forest(), "users", add("add")).unwrap();

    let once = remove_action(&forest, "users", "add");
    let twice = remove_action(&once, "users", "add");

    assert!(once.roots()[0].actions.is_empty());
    assert_eq!(once, twice);
    assert!(once.ptr_eq(&twice));

    // Unknown nodes are ignored as well.
    assert!(remove_action(&forest, "ghost", "add").ptr_eq(&forest));
}

#[test]
fn remove_child_only_touches_direct_children() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();
    let forest = add_child(
        &forest,
        "admin",
        ChildDraft::new("Audit", "audit", Icon::Home, "/audit", "audit"),
    )
    .unwrap();

    // "audit" is a grandchild of "users".
    assert!(remove_child(&forest, "users", "audit").ptr_eq(&forest));

    let forest = remove_child(&forest, "users", "admin");
    assert!(forest.roots()[0].children().is_empty());
    assert!(!forest.contains("audit"));
}

#[test]
fn remove_node_at_any_depth() {
    let forest = add_child(&groups(&["g1", "g2"]), "g2", admin_draft()).unwrap();

    let without_admin = remove_node(&forest, "admin");
    assert!(!without_admin.contains("admin"));
    assert_eq!(without_admin.len(), 2);

    let without_group = remove_node(&forest, "g1");
    assert_eq!(root_order(&without_group), vec![("g2".to_string(), 2)]);

    assert!(remove_node(&forest, "ghost").ptr_eq(&forest));
}

#[test]
fn edit_node_keeps_children_when_absent() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();

    let mut updated = PermissionNode::clone(&forest.roots()[0]);
    updated.name = "PEOPLE".into();
    updated.icon = Icon::Home;
    updated.children = None;

    let forest = edit_node(&forest, updated);
    let users = forest.find("users").unwrap();
    assert_eq!(users.name, "PEOPLE");
    assert_eq!(users.icon, Icon::Home);
    assert_eq!(users.children().len(), 1);
}

#[test]
fn edit_node_replaces_children_when_present() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();

    let mut updated = PermissionNode::clone(&forest.roots()[0]);
    updated.children = Some(vec![]);

    let forest = edit_node(&forest, updated);
    assert!(forest.find("users").unwrap().children().is_empty());

    // Editing a node which does not exist changes nothing.
    let ghost = PermissionNode {
        slug: "ghost".into(),
        ..Default::default()
    };
    assert!(edit_node(&forest, ghost).ptr_eq(&forest));
}

#[test]
fn edit_node_at_renames_slug() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();
    let forest = add_child(
        &forest,
        "users",
        ChildDraft::new("Teacher", "teacher", Icon::Zap, "/teacher", "teacher/index"),
    )
    .unwrap();

    let mut admin = PermissionNode::clone(forest.find("admin").unwrap());
    admin.slug = "administrator".into();
    let renamed = edit_node_at(&forest, "admin", admin.clone()).unwrap();
    assert!(renamed.contains("administrator"));
    assert!(!renamed.contains("admin"));

    admin.slug = "teacher".into();
    assert_eq!(
        edit_node_at(&forest, "admin", admin.clone()),
        Err(TreeError::DuplicateChild {
            parent: "users".into(),
            slug: "teacher".into()
        })
    );

    admin.name = " ".into();
    assert_eq!(
        edit_node_at(&forest, "admin", admin),
        Err(TreeError::MissingField("name"))
    );
}

#[test]
fn edit_action_in_place() {
    let forest = add_action(&users_forest(), "users", add("add")).unwrap();
    let forest = add_action(&forest, "users", add("edit")).unwrap();

    let updated = PermissionAction::new(
        "create",
        "CREATE",
        vec![ApiResource::new("POST", "/api/v1/users").with_attribute("OWN")],
    );
    let forest = edit_action(&forest, "users", "add", updated.clone()).unwrap();
    assert_eq!(forest.roots()[0].actions[0], updated);
    assert_eq!(forest.roots()[0].actions[1].code, "edit");

    assert_matches!(
        edit_action(&forest, "users", "create", add("edit")),
        Err(TreeError::DuplicateAction { .. })
    );
    assert_matches!(
        edit_action(&forest, "users", "ghost", add("ghost")),
        Err(TreeError::UnknownAction { .. })
    );
    assert_matches!(
        edit_action(&forest, "users", "create", PermissionAction::new("create", "C", vec![])),
        Err(TreeError::EmptyResources(_))
    );
}

#[test]
fn duplicate_slugs_resolve_to_first_match() {
    // "x" exists below "g1" and below "g2", the first one in traversal order is edited.
    let forest = groups(&["g1", "g2"]);
    let x = ChildDraft::new("X", "x", Icon::Zap, "/x", "x");
    let forest = add_child(&forest, "g1", x.clone()).unwrap();
    let forest = add_child(&forest, "g2", x).unwrap();

    let forest = add_action(&forest, "x", add("add")).unwrap();
    assert_eq!(forest.roots()[0].children()[0].actions.len(), 1);
    assert!(forest.roots()[1].children()[0].actions.is_empty());
}

#[test]
fn drag_last_group_onto_first() {
    let forest = groups(&["g1", "g2", "g3"]);

    let forest = move_sibling(&forest, &Level::Root, "g3", "g1").unwrap();
    assert_eq!(
        root_order(&forest),
        vec![("g3".to_string(), 1), ("g1".to_string(), 2), ("g2".to_string(), 3)]
    );
}

#[test]
fn reorder_renumbers_children() {
    let forest = add_child(&users_forest(), "users", admin_draft()).unwrap();
    let forest = add_child(
        &forest,
        "users",
        ChildDraft::new("Teacher", "teacher", Icon::Zap, "/t", "t"),
    )
    .unwrap();
    let forest = add_child(
        &forest,
        "users",
        ChildDraft::new("Student", "student", Icon::Zap, "/s", "s"),
    )
    .unwrap();

    let level = Level::Children("users".into());
    let forest = reorder(&forest, &level, &["student", "admin"]);

    let children: Vec<_> = forest.roots()[0]
        .children()
        .iter()
        .map(|child| (child.slug.as_str(), child.sequence))
        .collect();
    assert_eq!(children, vec![("student", 1), ("admin", 2), ("teacher", 3)]);
    assert_eq!(
        sibling_keys(&forest, &level),
        Some(vec!["student".into(), "admin".into(), "teacher".into()])
    );
}

#[test]
fn reorder_uses_display_order() {
    // Sequences are sparse and out of list order, as in hand-written documents.
    let forest = Forest::new(vec![
        PermissionNode {
            slug: "settings".into(),
            sequence: 400,
            ..Default::default()
        },
        PermissionNode {
            slug: "users".into(),
            sequence: 200,
            ..Default::default()
        },
    ]);

    assert_eq!(
        sibling_keys(&forest, &Level::Root),
        Some(vec!["users".into(), "settings".into()])
    );

    let forest = reorder(&forest, &Level::Root, &[] as &[&str]);
    assert_eq!(
        root_order(&forest),
        vec![("users".to_string(), 1), ("settings".to_string(), 2)]
    );
}

#[test]
fn reorder_actions_preserves_resources() {
    let edit = PermissionAction::new(
        "edit",
        "EDIT",
        vec![
            ApiResource::new("GET", "/api/v1/users/:id"),
            ApiResource::new("PUT", "/api/v1/users/:id"),
        ],
    );
    let forest = add_action(&users_forest(), "users", add("add")).unwrap();
    let forest = add_action(&forest, "users", edit.clone()).unwrap();

    let forest = move_sibling(&forest, &Level::Actions("users".into()), "edit", "add").unwrap();
    assert_eq!(forest.roots()[0].actions[0], edit);
    assert_eq!(forest.roots()[0].actions[1].code, "add");
}

#[test]
fn drop_rules() {
    let forest = add_child(&groups(&["g1", "g2"]), "g1", admin_draft()).unwrap();
    let forest = add_child(&forest, "g2", ChildDraft::new("T", "t", Icon::Zap, "/t", "t")).unwrap();
    let forest = add_action(&forest, "admin", add("add")).unwrap();
    let forest = add_action(&forest, "admin", add("edit")).unwrap();
    let forest = add_action(&forest, "t", add("query")).unwrap();

    let mut drag = DragState::new();

    // Action dragged onto an action of another node.
    drag.begin(DragItem::action("admin", "add"));
    assert!(drag.drop_on(&forest, &DragItem::action("t", "query")).is_none());
    assert!(drag.dragging().is_none());

    // Group dragged onto a child.
    drag.begin(DragItem::group("g1"));
    assert!(drag.drop_on(&forest, &DragItem::child("g2", "t")).is_none());

    // Dropped onto itself.
    drag.begin(DragItem::group("g1"));
    assert!(drag.drop_on(&forest, &DragItem::group("g1")).is_none());

    // Nothing is being dragged.
    assert!(drag.drop_on(&forest, &DragItem::group("g2")).is_none());

    // Same parent and same kind.
    drag.begin(DragItem::action("admin", "edit"));
    let forest = drag
        .drop_on(&forest, &DragItem::action("admin", "add"))
        .unwrap();
    let codes: Vec<_> = forest
        .find("admin")
        .unwrap()
        .actions
        .iter()
        .map(|action| action.code.as_str())
        .collect();
    assert_eq!(codes, vec!["edit", "add"]);
    assert!(drag.dragging().is_none());
}
