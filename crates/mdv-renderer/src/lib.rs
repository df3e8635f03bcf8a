//! Markdown rendering with enrichment placeholders.
//!
//! Turns markdown into HTML in a single event-driven pass. Code fences are
//! not rendered inline; each one becomes a placeholder element carrying its
//! source, language, and an escaped fallback, so highlighting and diagram
//! rendering can happen later without re-parsing the document. Headings get
//! deduplicated slug identifiers, and raw HTML comments surface as visible
//! annotations.

pub mod placeholder;
mod renderer;
mod state;

pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{escape_html, slugify};
