//! Source level edits of block-style YAML: one row changes, every other byte stays put.

use crate::patchers::line_patcher::{line_ending, split_lines};
use serde_yaml::Value;

fn strip_ending(line: &str) -> &str {
    &line[..line.len() - line_ending(line).len()]
}

fn indent_of(row: &str) -> usize {
    row.len() - row.trim_start_matches(' ').len()
}

/// Blank rows, comments, directives and document markers.
fn is_filler(row: &str) -> bool {
    let body = row.trim();
    body.is_empty()
        || body.starts_with('#')
        || body.starts_with('%')
        || body == "---"
        || body == "..."
        || body.starts_with("--- ")
}

/// A `key: value` row of a block mapping.
struct Entry {
    key: String,
    /// Byte offset just past the `:`.
    value_start: usize,
}

fn parse_entry(row: &str) -> Option<Entry> {
    let indent = indent_of(row);
    let body = &row[indent..];
    let (key, key_end) = match body.chars().next()? {
        quote @ ('"' | '\'') => {
            let close = body[1..].find(quote)? + 1;
            (body[1..close].to_string(), close + 1)
        }
        '-' if body.len() == 1 || body[1..].starts_with(' ') => return None,
        _ => {
            let colon = body
                .match_indices(':')
                .map(|(i, _)| i)
                .find(|&i| matches!(body.as_bytes().get(i + 1), None | Some(b' ') | Some(b'\t')))?;
            (body[..colon].trim_end().to_string(), colon)
        }
    };
    let after = &body[key_end..];
    let gap = after.len() - after.trim_start_matches(' ').len();
    after[gap..]
        .starts_with(':')
        .then(|| Entry { key, value_start: indent + key_end + gap + 1 })
}

/// Row range nested under `parent`, or the whole document.
fn block(rows: &[&str], parent: Option<usize>) -> (usize, usize) {
    match parent {
        None => (0, rows.len()),
        Some(p) => {
            let parent_indent = indent_of(rows[p]);
            let end = (p + 1..rows.len())
                .find(|&i| !is_filler(rows[i]) && indent_of(rows[i]) <= parent_indent)
                .unwrap_or(rows.len());
            (p + 1, end)
        }
    }
}

fn escape_double(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `value` as a plain scalar when it reads back as the same string, double quoted otherwise.
fn scalar(value: &str) -> String {
    match serde_yaml::from_str::<Value>(value) {
        Ok(Value::String(s)) if s == value => value.to_string(),
        _ => format!("\"{}\"", escape_double(value)),
    }
}

fn closing_double(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn closing_single(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
            } else {
                return Some(i + 1);
            }
        } else {
            i += 1;
        }
    }
    None
}

fn comment_start(s: &str) -> Option<usize> {
    s.match_indices('#')
        .map(|(i, _)| i)
        .find(|&i| i > 0 && matches!(s.as_bytes()[i - 1], b' ' | b'\t'))
}

/// Rewrites the value of an entry row, keeping its quoting style and trailing comment.
fn replace_value(row: &str, value_start: usize, value: &str) -> Option<String> {
    let rest = &row[value_start..];
    let gap = rest.len() - rest.trim_start().len();
    let current = &rest[gap..];

    let (rendered, len) = match current.chars().next() {
        None | Some('#') => (scalar(value), 0),
        Some('"') => (format!("\"{}\"", escape_double(value)), closing_double(current)?),
        Some('\'') => (format!("'{}'", value.replace('\'', "''")), closing_single(current)?),
        // block scalars, anchors, aliases, tags and flow collections
        Some('|' | '>' | '&' | '*' | '!' | '{' | '[') => return None,
        Some(_) => {
            let end = comment_start(current).unwrap_or(current.len());
            (scalar(value), current[..end].trim_end().len())
        }
    };

    let tail = &current[len..];
    let separator = if gap == 0 { " " } else { &rest[..gap] };
    let padding = if tail.starts_with('#') { " " } else { "" };
    Some(format!("{}{}{}{}{}", &row[..value_start], separator, rendered, padding, tail))
}

fn replace_row(lines: &[&str], index: usize, new_row: &str) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == index {
            out.push_str(new_row);
            out.push_str(line_ending(line));
        } else {
            out.push_str(line);
        }
    }
    out
}

fn insert_row(lines: &[&str], after: Option<usize>, new_row: &str) -> String {
    let ending = lines.iter().map(|line| line_ending(line)).find(|e| !e.is_empty()).unwrap_or("\n");
    let at = after.map_or(0, |i| i + 1);
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == at {
            out.push_str(new_row);
            out.push_str(ending);
        }
        out.push_str(line);
        if Some(i) == after && line_ending(line).is_empty() {
            out.push_str(ending);
        }
    }
    if at >= lines.len() {
        out.push_str(new_row);
        out.push_str(ending);
    }
    out
}

/// Sets the scalar at `keys` in the YAML source `contents` by editing a single row.
///
/// A missing terminal key gets a new row at the end of its parent block. Returns `None`
/// when the path runs through something other than block mappings or the value is not a
/// single-row scalar.
pub(crate) fn set_scalar(contents: &str, keys: &[&str], value: &str) -> Option<String> {
    let lines = split_lines(contents);
    let rows: Vec<&str> = lines.iter().map(|line| strip_ending(line)).collect();

    let mut parent = None;
    for (depth, key) in keys.iter().enumerate() {
        let (start, end) = block(&rows, parent);
        let content: Vec<usize> = (start..end).filter(|&i| !is_filler(rows[i])).collect();
        let child_indent = content.first().map(|&i| indent_of(rows[i]));
        let found = content
            .iter()
            .copied()
            .filter(|&i| Some(indent_of(rows[i])) == child_indent)
            .find_map(|i| parse_entry(rows[i]).filter(|entry| entry.key == *key).map(|entry| (i, entry)));
        let is_last = depth + 1 == keys.len();

        match found {
            Some((i, entry)) if is_last => {
                let new_row = replace_value(rows[i], entry.value_start, value)?;
                return Some(replace_row(&lines, i, &new_row));
            }
            Some((i, entry)) => {
                let inline = rows[i][entry.value_start..].trim();
                if !(inline.is_empty() || inline.starts_with('#')) {
                    return None;
                }
                parent = Some(i);
            }
            None if is_last => {
                let indent = child_indent.unwrap_or_else(|| parent.map_or(0, |p| indent_of(rows[p]) + 2));
                let new_row = format!("{}{}: {}", " ".repeat(indent), key, scalar(value));
                return Some(insert_row(&lines, content.last().copied().or(parent), &new_row));
            }
            None => return None,
        }
    }

    None
}
