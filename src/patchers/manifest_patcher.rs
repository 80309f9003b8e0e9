use crate::patchers::{PatchError, read_file, write_file};
use crate::version::Version;
use log::info;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;

/// Sets the top-level `key` of a JSON manifest (e.g. `package.json`) to the joined version.
///
/// The manifest is always re-serialized with its original key order and a four space indent;
/// the result is written back unless `dry_run` is set.
pub fn patch_manifest(
    path: impl AsRef<Path>,
    key: &str,
    version: &Version,
    dry_run: bool,
) -> Result<String, PatchError> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    let mut manifest: Value = serde_json::from_str(&contents)
        .map_err(|source| PatchError::Json { path: path.to_path_buf(), source })?;

    manifest
        .as_object_mut()
        .ok_or_else(|| PatchError::RootNotAMapping { path: path.to_path_buf() })?
        .insert(key.to_string(), Value::String(version.to_string()));

    let updated = to_pretty_json(&manifest)
        .map_err(|source| PatchError::Json { path: path.to_path_buf(), source })?;

    if dry_run {
        info!("'{}' not written, dry run", path.display());
    } else {
        write_file(path, &updated)?;
        info!("'{}' updated: {} = {}", path.display(), key, version);
    }

    Ok(updated)
}

fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    let mut json = String::from_utf8_lossy(&buffer).into_owned();
    json.push('\n');
    Ok(json)
}
