// SPDX-License-Identifier: MIT OR Apache-2.0

//! API routes offered when composing actions.
use permtree_core::ApiResource;
use serde::{Deserialize, Serialize};

/// Progress of fetching the routes exposed by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum RouteState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<ApiResource>),
    Failed(String),
}

impl RouteState {
    /// Routes known so far, empty unless loaded.
    pub fn routes(&self) -> &[ApiResource] {
        match self {
            RouteState::Loaded(routes) => routes,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RouteState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RouteState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Routes whose "METHOD path" contains `query`, ignoring case. An empty query matches everything.
pub fn search<'a>(routes: &'a [ApiResource], query: &str) -> Vec<&'a ApiResource> {
    let query = query.trim().to_lowercase();
    routes
        .iter()
        .filter(|route| {
            format!("{} {}", route.method, route.path)
                .to_lowercase()
                .contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use permtree_core::ApiResource;
    use rstest::rstest;

    use super::{RouteState, search};

    fn routes() -> Vec<ApiResource> {
        vec![
            ApiResource::new("GET", "/api/v1/users"),
            ApiResource::new("POST", "/api/v1/users"),
            ApiResource::new("GET", "/api/v1/teachers/:id"),
        ]
    }

    #[rstest]
    #[case("", 3)]
    #[case("users", 2)]
    #[case("get", 2)]
    #[case("POST /API", 1)]
    #[case("  teachers  ", 1)]
    #[case("students", 0)]
    fn search_routes(#[case] query: &str, #[case] expected: usize) {
        assert_eq!(search(&routes(), query).len(), expected);
    }

    #[test]
    fn routes_only_when_loaded() {
        assert!(RouteState::Idle.routes().is_empty());
        assert!(RouteState::Loading.is_loading());
        assert_eq!(RouteState::Failed("offline".into()).error(), Some("offline"));
        assert_eq!(RouteState::Loaded(routes()).routes().len(), 3);
    }
}
