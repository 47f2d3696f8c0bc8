//! Numbered plan parsing.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBERED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[).:-]?\s*").expect("valid numbered-prefix regex"));

/// Extract ordered plan items from a free-text model response.
///
/// A line starting with digits opens a new item (the number and its
/// punctuation are stripped). Other non-empty lines continue the open item.
/// Blank lines only separate.
pub fn parse_plan(response: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current: Option<String> = None;

    for line in response.split('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            flush(&mut items, current.take());
            current = Some(NUMBERED_PREFIX.replace(trimmed, "").into_owned());
        } else if !trimmed.is_empty() {
            match current.as_mut() {
                Some(open) => {
                    open.push('\n');
                    open.push_str(trimmed);
                }
                None => current = Some(trimmed.to_string()),
            }
        }
    }
    flush(&mut items, current);

    if items.is_empty() || !has_numbered_line(response) {
        return Vec::new();
    }
    items
}

fn has_numbered_line(response: &str) -> bool {
    response
        .split('\n')
        .any(|l| l.trim().starts_with(|c: char| c.is_ascii_digit()))
}

fn flush(items: &mut Vec<String>, item: Option<String>) {
    if let Some(item) = item {
        let item = item.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }
}

/// Render items as a `1. ...` numbered outline
pub fn format_outline(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}
