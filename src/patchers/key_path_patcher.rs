use crate::patchers::{PatchError, read_file, write_file, yaml_source};
use crate::version::Version;
use log::{debug, info, warn};
use serde_yaml::Value;
use std::path::Path;

/// Sets the scalar at `key_path` (dot separated, e.g. `git.version`) in a YAML document.
///
/// Every intermediate key must exist and hold a mapping; the terminal key is created when
/// missing. Only the row holding the leaf is rewritten, so comments, document markers and
/// the quoting of other values are kept. Documents that cannot be edited row-wise (flow
/// collections, anchors on the path) are re-serialized as a whole instead.
///
/// Returns the written document. In dry-run mode nothing is written and the current
/// content is returned.
pub fn patch_key_path(
    path: impl AsRef<Path>,
    key_path: &str,
    version: &Version,
    dry_run: bool,
) -> Result<String, PatchError> {
    let path = path.as_ref();
    let keys: Vec<&str> = key_path.split('.').collect();
    let full_version = version.to_string();

    let contents = read_file(path)?;
    let mut document: Value = serde_yaml::from_str(&contents)
        .map_err(|source| PatchError::Yaml { path: path.to_path_buf(), source })?;

    let mut node = &mut document;
    for (depth, key) in keys.iter().enumerate() {
        let mapping = node.as_mapping_mut().ok_or_else(|| match depth {
            0 => PatchError::RootNotAMapping { path: path.to_path_buf() },
            _ => PatchError::NotAMapping { path: path.to_path_buf(), key: keys[..depth].join(".") },
        })?;

        if depth + 1 == keys.len() {
            debug!("'{}' value of '{}' = {:?}", path.display(), key_path, mapping.get(*key));
            mapping.insert(Value::String(key.to_string()), Value::String(full_version.clone()));
            break;
        }

        node = mapping.get_mut(*key).ok_or_else(|| PatchError::MissingKey {
            path: path.to_path_buf(),
            key: keys[..=depth].join("."),
        })?;
    }

    if dry_run {
        info!("'{}' not written, dry run", path.display());
        return Ok(contents);
    }

    let edited = yaml_source::set_scalar(&contents, &keys, &full_version)
        .filter(|text| serde_yaml::from_str::<Value>(text).is_ok_and(|reparsed| reparsed == document));
    let new_content = match edited {
        Some(text) => text,
        None => {
            warn!("'{}': '{}' cannot be edited in place, rewriting the whole document", path.display(), key_path);
            serde_yaml::to_string(&document).map_err(|source| PatchError::Yaml { path: path.to_path_buf(), source })?
        }
    };

    write_file(path, &new_content)?;
    info!("'{}' updated: {} = {}", path.display(), key_path, full_version);

    Ok(new_content)
}
