// SPDX-License-Identifier: MIT OR Apache-2.0

//! Editing sessions over permission forests.
//!
//! An [`Editor`] owns the forest, the set of selected actions, the drag state and the list of API
//! routes, and turns every failed operation into a [`Notice`] for the user.
pub mod autocomplete;
mod config;
mod editor;
mod file;
mod notice;
pub mod routes;
pub mod seed;

pub use config::{
    Config, ConfigError, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, ENV_BASE_URL,
    ENV_TIMEOUT_SECS, ENV_TOKEN_PATH,
};
pub use editor::Editor;
pub use file::{
    DEFAULT_EXPORT_NAME, ExportError, ImportError, YAML_EXTENSIONS, check_extension, read_document,
};
pub use notice::{Notice, NoticeLevel, Outbox};
pub use routes::RouteState;
