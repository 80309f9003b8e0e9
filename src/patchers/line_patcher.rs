use crate::patchers::{PatchError, read_file, write_file};
use crate::version::Version;
use log::{debug, info};
use regex::Regex;
use std::path::Path;

/// Splits `content` into lines, each keeping its own terminator.
///
/// `\r\n`, a bare `\r` and a bare `\n` all end a line. The last line may have none.
pub fn split_lines(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                lines.push(&content[start..i + 2]);
                i += 2;
                start = i;
            }
            b'\r' | b'\n' => {
                lines.push(&content[start..i + 1]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }

    lines
}

/// Returns the terminator `line` ends with, or `""`.
pub fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\r') {
        "\r"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Replaces the first line of `path` matching `pattern` with `template` rendered for `version`.
///
/// Returns the new line, terminator included. In dry-run mode nothing is written and a missing
/// match yields `Ok(None)`; otherwise a missing match is [`PatchError::NoMatch`].
pub fn patch_line(
    path: impl AsRef<Path>,
    pattern: &str,
    template: &str,
    version: &Version,
    dry_run: bool,
) -> Result<Option<String>, PatchError> {
    let path = path.as_ref();
    let version_regex = Regex::new(pattern).map_err(|source| PatchError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let contents = read_file(path)?;
    let lines = split_lines(&contents);

    let mut found = None;
    for (index, line) in lines.iter().enumerate() {
        let ending = line_ending(line);
        let row = &line[..line.len() - ending.len()];
        if version_regex.is_match(row) {
            debug!("Matching row found in '{}': {} {}", path.display(), index, row);
            let new_row = format!("{}{}", version.render(template)?, ending);
            info!("'{}' old row: {} | new row: {}", path.display(), row, new_row.trim_end());
            found = Some((index, new_row));
            break;
        }
    }

    if dry_run {
        info!("'{}' not written, dry run", path.display());
        return Ok(found.map(|(_, new_row)| new_row));
    }

    let Some((index, new_row)) = found else {
        return Err(PatchError::NoMatch { path: path.to_path_buf(), pattern: pattern.to_string() });
    };

    let updated: String = lines
        .iter()
        .enumerate()
        .map(|(i, line)| if i == index { new_row.as_str() } else { *line })
        .collect();
    write_file(path, &updated)?;
    info!("'{}' updated", path.display());

    Ok(Some(new_row))
}
