// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration of an editing session.
//!
//! Values are read from an optional TOML file and can be overridden by environment variables:
//!
//! | variable                | field                  |
//! |-------------------------|------------------------|
//! | `PERMTREE_BASE_URL`     | `base_url`             |
//! | `PERMTREE_TOKEN_PATH`   | `token_path`           |
//! | `PERMTREE_TIMEOUT_SECS` | `request_timeout_secs` |
use std::path::{Path, PathBuf};
use std::time::Duration;

use permtree_core::ExportOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default address of the permission backend.
pub const DEFAULT_BASE_URL: &str = "https://schoolapi.theripplebytes.com";

/// Default timeout for requests against the backend.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "PERMTREE_BASE_URL";
pub const ENV_TOKEN_PATH: &str = "PERMTREE_TOKEN_PATH";
pub const ENV_TIMEOUT_SECS: &str = "PERMTREE_TIMEOUT_SECS";

/// Configuration parameters for the editor and its backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address of the backend serving login and route listing.
    pub base_url: String,

    /// File the access token is kept in. If not provided, the token is only kept in memory.
    pub token_path: Option<PathBuf>,

    /// Timeout for a single request in seconds.
    pub request_timeout_secs: u64,

    /// Shape of exported documents.
    pub export: ExportOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_path: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            export: ExportOptions::default(),
        }
    }
}

impl Config {
    /// Load the configuration from `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!(path = %path.display(), "loaded config");
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a TOML document, missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Override fields with the values returned by `var` for the `PERMTREE_*` variables.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = var(ENV_BASE_URL) {
            self.base_url = base_url;
        }

        if let Some(token_path) = var(ENV_TOKEN_PATH) {
            self.token_path = (!token_path.is_empty()).then(|| PathBuf::from(token_path));
        }

        if let Some(timeout) = var(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnvVar {
                        name: ENV_TIMEOUT_SECS,
                        value: timeout.clone(),
                    })?;
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file \"{}\": {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value \"{value}\" for {name}")]
    InvalidEnvVar { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::{Config, ConfigError, DEFAULT_BASE_URL};

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.export.include_routes);
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permtree.toml");
        std::fs::write(
            &path,
            "base_url = \"http://localhost:8080\"\n\
             token_path = \"/tmp/token\"\n\
             \n\
             [export]\n\
             include_routes = true\n",
        )
        .unwrap();

        let mut config = Config::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        config.apply_env(env(&[])).unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.token_path, Some(PathBuf::from("/tmp/token")));
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.export.include_routes);
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::from_toml("base_url = \"http://file\"\n").unwrap();
        config
            .apply_env(env(&[
                ("PERMTREE_BASE_URL", "http://env"),
                ("PERMTREE_TIMEOUT_SECS", " 5 "),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "http://env");
        assert_eq!(config.request_timeout_secs, 5);

        config.token_path = Some(PathBuf::from("/tmp/token"));
        config.apply_env(env(&[("PERMTREE_TOKEN_PATH", "")])).unwrap();
        assert_eq!(config.token_path, None);
    }

    #[test]
    fn errors() {
        assert_matches!(
            Config::from_toml("request_timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        );

        let mut config = Config::default();
        assert_matches!(
            config.apply_env(env(&[("PERMTREE_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidEnvVar { name: "PERMTREE_TIMEOUT_SECS", .. })
        );

        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            Config::load(Some(&dir.path().join("missing.toml"))),
            Err(ConfigError::Read { .. })
        );
    }
}
