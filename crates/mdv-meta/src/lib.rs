//! Frontmatter extraction for markdown documents.
//!
//! A document may begin with a metadata block delimited by `---` marker
//! lines. The block is parsed with a deliberately restricted dialect:
//! `key: value` lines declare scalars, `key:` followed by indented `- item`
//! lines declares a flat string list, and everything else is ignored.
//!
//! The dialect is *not* YAML. Malformed lines inside the block are tolerated
//! rather than rejected — an observable contract, not an accident — so a
//! general YAML parser would be the wrong tool here.
//!
//! # Example
//!
//! ```
//! use mdv_meta::{Value, extract};
//!
//! let (fm, body) = extract("---\ntitle: Hello\n---\nBody");
//! let fm = fm.unwrap();
//! assert_eq!(fm.get("title"), Some(&Value::Scalar("Hello".to_owned())));
//! assert_eq!(body, "Body");
//! ```

mod panel;

use std::fmt::Write;

pub use panel::render_panel;

/// Marker line delimiting the frontmatter block.
const MARKER: &str = "---";

/// A frontmatter value: either a scalar string or a flat list of strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Single string value (`key: value`).
    Scalar(String),
    /// Ordered list of strings (`key:` followed by `- item` lines).
    List(Vec<String>),
}

/// Parsed frontmatter: an ordered mapping from key to [`Value`].
///
/// Keys are unique and preserve first-seen order. A document without a
/// frontmatter block yields `None` from [`extract`], never an empty mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, Value)>,
}

impl Frontmatter {
    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the block declared any keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `title` key, when it holds a scalar.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self.get("title") {
            Some(Value::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    /// Re-serialize to the frontmatter dialect (without marker lines).
    ///
    /// Parsing the result back yields the same mapping for the supported
    /// subset (scalars and flat string lists).
    #[must_use]
    pub fn to_block(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            match value {
                Value::Scalar(s) => writeln!(out, "{key}: {s}").unwrap(),
                Value::List(items) => {
                    writeln!(out, "{key}:").unwrap();
                    for item in items {
                        writeln!(out, "  - {item}").unwrap();
                    }
                }
            }
        }
        out
    }
}

/// Split a leading frontmatter block from the document body.
///
/// The block must start at the very first line: a `---` marker line
/// (optional trailing carriage return), arbitrary lines, and an identical
/// closing marker line. When no exact match exists the whole text is
/// returned unchanged with `None` metadata.
///
/// The closing marker may be the last line of the document; the body is
/// then empty.
#[must_use]
pub fn extract(text: &str) -> (Option<Frontmatter>, &str) {
    let Some((first, after_open)) = split_first_line(text) else {
        return (None, text);
    };
    if !is_marker(first) {
        return (None, text);
    }

    let mut rest = after_open;
    let mut header: Vec<&str> = Vec::new();
    loop {
        let Some((line, next)) = split_first_line(rest) else {
            // No closing marker: not a frontmatter block after all.
            return (None, text);
        };
        if is_marker(line) {
            return (Some(parse_header(&header)), next);
        }
        header.push(line);
        rest = next;
    }
}

fn is_marker(line: &str) -> bool {
    line.strip_suffix('\r').unwrap_or(line) == MARKER
}

/// Split off the first line (without its terminator). `None` on empty input.
fn split_first_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(i) => Some((&text[..i], &text[i + 1..])),
        None => Some((text, "")),
    }
}

fn parse_header(lines: &[&str]) -> Frontmatter {
    let mut entries: Vec<(String, Value)> = Vec::new();
    // Index of the most recently declared key; list items attach to it.
    let mut current: Option<usize> = None;

    for line in lines {
        if let Some((key, raw_value)) = parse_key_line(line) {
            let value = raw_value.trim();
            let parsed = if value.is_empty() {
                Value::List(Vec::new())
            } else {
                Value::Scalar(strip_matching_quotes(value).to_owned())
            };
            match entries.iter().position(|(k, _)| k == key) {
                Some(i) => {
                    // Duplicate key: value is replaced, position is kept.
                    entries[i].1 = parsed;
                    current = Some(i);
                }
                None => {
                    entries.push((key.to_owned(), parsed));
                    current = Some(entries.len() - 1);
                }
            }
        } else if let Some(item) = parse_list_item(line) {
            // Items attach only while the current key holds a list.
            // Orphaned items (no key yet, or a scalar key) are dropped:
            // tolerated, never an error.
            if let Some(i) = current {
                if let Value::List(items) = &mut entries[i].1 {
                    items.push(item.to_owned());
                }
            }
        }
        // Any other line is ignored.
    }

    Frontmatter { entries }
}

/// Parse a `key: value` line. The key must be non-empty and consist of word
/// characters only.
fn parse_key_line(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = line.split_once(':')?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((key, rest))
}

/// Parse a `  - item` line: leading whitespace, a dash, whitespace, item.
fn parse_list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.len() == line.len() {
        // List items require leading whitespace.
        return None;
    }
    let rest = trimmed.strip_prefix('-')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// Strip one layer of matching surrounding quotes (`"x"` or `'x'`).
///
/// A lone leading or trailing quote is left in place.
fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scalar(s: &str) -> Value {
        Value::Scalar(s.to_owned())
    }

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn test_no_frontmatter_returns_text_unchanged() {
        let text = "# Heading\n\nBody text.";
        let (fm, body) = extract(text);
        assert!(fm.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_unclosed_block_is_not_frontmatter() {
        let text = "---\ntitle: X\nno closing marker";
        let (fm, body) = extract(text);
        assert!(fm.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_marker_must_be_first_line() {
        let text = "\n---\ntitle: X\n---\nBody";
        let (fm, body) = extract(text);
        assert!(fm.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_scalars_and_lists() {
        let text = "---\ntags:\n  - a\n  - b\ntitle: X\n---\nBody";
        let (fm, body) = extract(text);
        let fm = fm.unwrap();
        assert_eq!(fm.get("tags"), Some(&list(&["a", "b"])));
        assert_eq!(fm.get("title"), Some(&scalar("X")));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_key_order_preserved() {
        let text = "---\nzeta: 1\nalpha: 2\nmid: 3\n---\n";
        let (fm, _) = extract(text);
        let fm = fm.unwrap();
        let keys: Vec<&str> = fm.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_crlf_markers() {
        let text = "---\r\ntitle: X\r\n---\r\nBody";
        let (fm, body) = extract(text);
        assert_eq!(fm.unwrap().title(), Some("X"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_closing_marker_at_eof() {
        let (fm, body) = extract("---\ntitle: X\n---");
        assert_eq!(fm.unwrap().title(), Some("X"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_quotes_stripped_when_matching() {
        let text = "---\na: \"quoted\"\nb: 'single'\nc: \"lone\nd: mixed'\n---\n";
        let (fm, _) = extract(text);
        let fm = fm.unwrap();
        assert_eq!(fm.get("a"), Some(&scalar("quoted")));
        assert_eq!(fm.get("b"), Some(&scalar("single")));
        assert_eq!(fm.get("c"), Some(&scalar("\"lone")));
        assert_eq!(fm.get("d"), Some(&scalar("mixed'")));
    }

    #[test]
    fn test_orphaned_list_items_dropped() {
        // Items before any key, and items under a scalar key, vanish.
        let text = "---\n  - before\nname: scalar\n  - under-scalar\nitems:\n  - kept\n---\n";
        let (fm, _) = extract(text);
        let fm = fm.unwrap();
        assert_eq!(fm.len(), 2);
        assert_eq!(fm.get("name"), Some(&scalar("scalar")));
        assert_eq!(fm.get("items"), Some(&list(&["kept"])));
    }

    #[test]
    fn test_unindented_dash_is_ignored() {
        let text = "---\nitems:\n- not-indented\n  - indented\n---\n";
        let (fm, _) = extract(text);
        assert_eq!(fm.unwrap().get("items"), Some(&list(&["indented"])));
    }

    #[test]
    fn test_malformed_lines_ignored() {
        let text = "---\n???\nkey with space: nope\ntitle: X\n\n---\nBody";
        let (fm, body) = extract(text);
        let fm = fm.unwrap();
        assert_eq!(fm.len(), 1);
        assert_eq!(fm.title(), Some("X"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_duplicate_key_replaces_value_keeps_position() {
        let text = "---\na: first\nb: other\na: second\n---\n";
        let (fm, _) = extract(text);
        let fm = fm.unwrap();
        let keys: Vec<&str> = fm.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(fm.get("a"), Some(&scalar("second")));
    }

    #[test]
    fn test_empty_block_yields_empty_mapping() {
        let (fm, body) = extract("---\n---\nBody");
        assert!(fm.unwrap().is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_round_trip() {
        let text = "---\ntitle: Hello World\ntags:\n  - one\n  - two\nauthor: 'A. Person'\n---\n";
        let (fm, _) = extract(text);
        let fm = fm.unwrap();

        let reserialized = format!("---\n{}---\n", fm.to_block());
        let (again, _) = extract(&reserialized);
        assert_eq!(again.unwrap(), fm);
    }
}
