// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading and writing YAML documents on disk.
use std::path::{Path, PathBuf};

use permtree_core::{DecodeError, EncodeError};
use thiserror::Error;

/// File extensions accepted for import, compared case-insensitively.
pub const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Name offered for downloaded documents.
pub const DEFAULT_EXPORT_NAME: &str = "data.yaml";

/// Check that `path` points to a YAML document by its extension.
pub fn check_extension(path: &Path) -> Result<(), ImportError> {
    let valid = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            YAML_EXTENSIONS
                .iter()
                .any(|valid| extension.eq_ignore_ascii_case(valid))
        });

    if valid {
        Ok(())
    } else {
        Err(ImportError::InvalidExtension(path.to_path_buf()))
    }
}

/// Read a YAML document from disk after checking its extension.
pub fn read_document(path: &Path) -> Result<String, ImportError> {
    check_extension(path)?;
    std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid file \"{}\", please upload a .yaml or .yml file", .0.display())]
    InvalidExtension(PathBuf),

    #[error("could not read \"{}\": {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("could not write \"{}\": {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
