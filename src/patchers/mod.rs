use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::version::TemplateError;

pub mod key_path_patcher;
pub mod line_patcher;
pub mod manifest_patcher;
mod yaml_source;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("No row matching /{pattern}/ found in '{path}'")]
    NoMatch { path: PathBuf, pattern: String },
    #[error("Invalid pattern /{pattern}/: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Key '{key}' not found in '{path}'")]
    MissingKey { path: PathBuf, key: String },
    #[error("Root of '{path}' is not a mapping")]
    RootNotAMapping { path: PathBuf },
    #[error("Cannot descend into '{key}' in '{path}': value is not a mapping")]
    NotAMapping { path: PathBuf, key: String },
    #[error("Unable to parse JSON file '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unable to parse YAML file '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PatchError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        PatchError::Io { path: path.to_path_buf(), source }
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, PatchError> {
    debug!("Reading file: '{}'", path.display());
    fs::read_to_string(path).map_err(|e| PatchError::io(path, e))
}

/// Replaces the content of `path` through a sibling temp file and a rename.
///
/// Symlinks are resolved first so the link stays in place and its target gets the new
/// content. The permissions of the replaced file are carried over to the new one.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), PatchError> {
    let target = fs::canonicalize(path).map_err(|e| PatchError::io(path, e))?;
    let parent = target.parent().unwrap_or(Path::new("/"));
    let permissions = fs::metadata(&target).map_err(|e| PatchError::io(path, e))?.permissions();

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| PatchError::io(path, e))?;
    temp.write_all(content.as_bytes()).map_err(|e| PatchError::io(path, e))?;
    temp.as_file().sync_all().map_err(|e| PatchError::io(path, e))?;
    fs::set_permissions(temp.path(), permissions).map_err(|e| PatchError::io(path, e))?;
    temp.persist(&target).map_err(|e| PatchError::io(path, e.error))?;

    debug!("Wrote {} bytes to '{}'", content.len(), path.display());
    Ok(())
}
