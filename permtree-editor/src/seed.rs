// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data an editing session starts with when no document was loaded.
use permtree_core::{ApiResource, Forest, Icon, PermissionAction, PermissionNode};

const API_ROUTES: [(&str, &str); 20] = [
    ("GET", "/api/v1/roles"),
    ("POST", "/api/v1/users"),
    ("GET", "/api/v1/users/:id"),
    ("PUT", "/api/v1/users/:id"),
    ("DELETE", "/api/v1/users/:id"),
    ("GET", "/api/v1/users"),
    ("PATCH", "/api/v1/users/:id/disable"),
    ("PATCH", "/api/v1/users/:id/enable"),
    ("POST", "/api/v1/teachers"),
    ("GET", "/api/v1/teachers/:id"),
    ("PUT", "/api/v1/teachers/:id"),
    ("DELETE", "/api/v1/teachers/:id"),
    ("GET", "/api/v1/teachers"),
    ("POST", "/api/v1/students"),
    ("GET", "/api/v1/students/:id"),
    ("PUT", "/api/v1/students/:id"),
    ("DELETE", "/api/v1/students/:id"),
    ("GET", "/api/v1/students"),
    ("GET", "/api/v1/zodiac-signs"),
    ("GET", "/api/v1/countries"),
];

/// Routes offered in action forms until the backend answered.
pub fn api_routes() -> Vec<ApiResource> {
    API_ROUTES
        .iter()
        .map(|(method, path)| ApiResource::new(*method, *path))
        .collect()
}

/// The "USERS" group with its admin, teacher and student pages.
pub fn forest() -> Forest {
    let admin = page(
        "Admin",
        "admin",
        Icon::Zap,
        "/system/admin",
        2101,
        vec![
            action("add", "ADD", &[("GET", "/api/v1/roles"), ("POST", "/api/v1/users")]),
            action(
                "edit",
                "EDIT",
                &[
                    ("GET", "/api/v1/roles"),
                    ("GET", "/api/v1/users/:id"),
                    ("PUT", "/api/v1/users/:id"),
                ],
            ),
            action("delete", "DELETE", &[("DELETE", "/api/v1/users/:id")]),
            action("query", "QUERY", &[("GET", "/api/v1/users")]),
            action("disable", "DISABLE", &[("PATCH", "/api/v1/users/:id/disable")]),
            action("enable", "ENABLE", &[("PATCH", "/api/v1/users/:id/enable")]),
        ],
    );

    let teacher = page(
        "Teacher",
        "teacher",
        Icon::Zap,
        "/system/teacher",
        2102,
        vec![
            action("add", "ADD", &[("POST", "/api/v1/teachers")]),
            action(
                "edit",
                "EDIT",
                &[("GET", "/api/v1/teachers/:id"), ("PUT", "/api/v1/teachers/:id")],
            ),
            action("delete", "DELETE", &[("DELETE", "/api/v1/teachers/:id")]),
            action("query", "QUERY", &[("GET", "/api/v1/teachers")]),
            action("disable", "DISABLE", &[("PATCH", "/api/v1/users/:id/disable")]),
            action("enable", "ENABLE", &[("PATCH", "/api/v1/users/:id/enable")]),
        ],
    );

    let student_actions = vec![
        action(
            "add",
            "ADD",
            &[
                ("POST", "/api/v1/students"),
                ("GET", "/api/v1/zodiac-signs"),
                ("GET", "/api/v1/countries"),
            ],
        ),
        action(
            "edit",
            "EDIT",
            &[
                ("GET", "/api/v1/students/:id"),
                ("PUT", "/api/v1/students/:id"),
                ("GET", "/api/v1/zodiac-signs"),
                ("GET", "/api/v1/countries"),
            ],
        ),
        action("delete", "DELETE", &[("DELETE", "/api/v1/students/:id")]),
        action("query", "QUERY", &[("GET", "/api/v1/students")]),
        PermissionAction::new(
            "query-own",
            "QUERY OWN",
            vec![ApiResource::new("GET", "/api/v1/students").with_attribute("OWN")],
        ),
        action("disable", "DISABLE", &[("PATCH", "/api/v1/users/:id/disable")]),
        action("enable", "ENABLE", &[("PATCH", "/api/v1/users/:id/enable")]),
    ];

    let student = page(
        "Student",
        "student",
        Icon::CreditCard,
        "/system/student",
        2103,
        student_actions,
    );

    Forest::new(vec![PermissionNode {
        name: "USERS".into(),
        slug: "users".into(),
        icon: Icon::CreditCard,
        sequence: 200,
        children: Some(vec![admin.into(), teacher.into(), student.into()]),
        ..Default::default()
    }])
}

fn page(
    name: &str,
    slug: &str,
    icon: Icon,
    router: &str,
    sequence: u32,
    actions: Vec<PermissionAction>,
) -> PermissionNode {
    PermissionNode {
        name: name.into(),
        slug: slug.into(),
        icon,
        router: Some(router.into()),
        component: Some(format!("{}/index", router.trim_start_matches('/'))),
        sequence,
        actions,
        children: None,
    }
}

fn action(code: &str, name: &str, resources: &[(&str, &str)]) -> PermissionAction {
    PermissionAction::new(
        code,
        name,
        resources
            .iter()
            .map(|(method, path)| ApiResource::new(*method, *path))
            .collect(),
    )
}
