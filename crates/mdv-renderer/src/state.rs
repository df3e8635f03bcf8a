//! Shared state structs for markdown rendering.
//!
//! These structs track context during event processing: code fence capture,
//! table layout, image alt text, raw HTML block buffering, and heading
//! identifier assignment.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Default)]
pub struct CodeBlockState {
    /// Whether we're inside a code block.
    active: bool,
    /// Language tag of the current code block (e.g., "rust", "mermaid").
    language: Option<String>,
    /// Buffer for code block content.
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    /// Check if we're inside a code block.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append text to the code block buffer.
    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Append a newline to the code block buffer.
    pub fn push_newline(&mut self) {
        self.buffer.push('\n');
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub struct TableState {
    /// Whether we're inside the table header row.
    in_head: bool,
    /// Column alignments for current table.
    alignments: Vec<Alignment>,
    /// Current column index in table row.
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    /// Start the table header row.
    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    /// End the table header row.
    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    /// Start a new table row.
    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    /// Move to the next cell.
    pub fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    /// Check if we're in the table header.
    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Get the alignment style for the current cell.
    pub fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub struct ImageState {
    /// Whether we're inside an image tag.
    active: bool,
    /// Buffer for alt text.
    alt_text: String,
}

impl ImageState {
    /// Start capturing image alt text.
    pub fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    /// End image capture and return the alt text.
    pub fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }

    /// Check if we're inside an image.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append text to the alt text buffer.
    pub fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// State for buffering a raw HTML block.
///
/// The parser emits HTML blocks line by line; comment detection needs the
/// whole block, so lines are accumulated until the block ends.
#[derive(Default)]
pub struct HtmlBlockState {
    active: bool,
    buffer: String,
}

impl HtmlBlockState {
    /// Start buffering a raw HTML block.
    pub fn start(&mut self) {
        self.active = true;
        self.buffer.clear();
    }

    /// End the block and return its accumulated raw HTML.
    pub fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.buffer)
    }

    /// Check if we're inside a raw HTML block.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append raw HTML to the buffer.
    pub fn push_str(&mut self, html: &str) {
        self.buffer.push_str(html);
    }
}

/// State for tracking heading rendering and identifier assignment.
///
/// Keeps two buffers per heading: plain text (for the slug) and HTML (the
/// inline-rendered content). The identifier registry is scoped to one
/// renderer instance, i.e. one render pass.
#[derive(Default)]
pub struct HeadingState {
    /// Current heading level being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Buffer for heading plain text (slug input).
    text: String,
    /// Buffer for heading HTML (with inline formatting).
    html: String,
    /// Occurrence counts per normalized slug, for deduplication.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    /// Check if we're currently inside a heading.
    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    /// Start tracking a heading.
    pub fn start(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the heading. Returns (level, id, html) or None if not in a
    /// heading.
    pub fn complete(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let id = self.assign_id(&text);
        Some((level, id, html))
    }

    /// Assign a unique identifier for a heading: the bare slug for the first
    /// occurrence, then `slug-1`, `slug-2`, … in document order.
    fn assign_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.id_counts.entry(base.clone()).or_default();
        let id = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;
        id
    }

    /// Append text to the heading plain-text buffer.
    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append HTML to the heading html buffer.
    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// Get the heading HTML buffer reference.
    pub fn html_buffer(&mut self) -> &mut String {
        &mut self.html
    }
}

/// Convert heading text to a URL-safe slug.
///
/// Lowercases, strips embedded HTML tags, drops characters outside
/// word/space/hyphen, collapses whitespace and hyphen runs to single
/// hyphens, and trims edge hyphens.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut in_tag = false;
    let mut pending_hyphen = false;

    for c in text.chars() {
        if in_tag {
            if c == '>' {
                in_tag = false;
            }
            continue;
        }
        if c == '<' {
            in_tag = true;
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            // Leading and trailing hyphens are never flushed.
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        }
        // Anything else is outside word/space/hyphen and is dropped.
    }

    slug
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
