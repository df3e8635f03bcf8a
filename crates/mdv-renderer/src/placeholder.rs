//! Placeholder wire format for deferred enrichment.
//!
//! Code fences are not rendered to their final form during the first pass.
//! Instead the renderer emits a placeholder element carrying the original
//! source as a percent-encoded payload plus an escaped `<pre><code>`
//! fallback, so the content stays inspectable even if no enrichment engine
//! ever runs. Enrichment dispatchers later locate placeholders by marker
//! class and replace them in place.
//!
//! The emitted markup is a wire contract: an element with a kind-specific
//! marker class, a stable `id` unique within the document, a `data-code`
//! payload attribute, and (for code) a `data-lang` attribute.

use std::fmt::Write;
use std::ops::Range;
use std::str::Utf8Error;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::state::escape_html;

/// Language tag reserved for diagram blocks.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Characters kept verbatim in payload attributes. Everything else is
/// percent-encoded so payloads survive quotes, angle brackets, and
/// arbitrary Unicode.
const PAYLOAD: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Enrichment kind a placeholder is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Syntax highlighting of a code block.
    CodeHighlight,
    /// Diagram rendering of a diagram source block.
    Diagram,
}

impl PlaceholderKind {
    /// CSS marker class identifying placeholders of this kind.
    #[must_use]
    pub fn marker_class(self) -> &'static str {
        match self {
            Self::CodeHighlight => "highlight-placeholder",
            Self::Diagram => "diagram-placeholder",
        }
    }
}

/// A placeholder located in rendered HTML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    /// Enrichment kind.
    pub kind: PlaceholderKind,
    /// Stable element identifier, unique within the document.
    pub id: String,
    /// Language tag (code placeholders only).
    pub language: Option<String>,
    /// Percent-encoded source payload.
    pub payload: String,
    /// Escaped fallback markup (the placeholder's inner content).
    pub fallback: String,
    /// Byte range of the whole element in the scanned HTML.
    pub span: Range<usize>,
}

impl Placeholder {
    /// Decode the payload back to the original source text.
    pub fn decode(&self) -> Result<String, Utf8Error> {
        percent_decode_str(&self.payload)
            .decode_utf8()
            .map(|cow| cow.into_owned())
    }
}

/// Percent-encode source text for a payload attribute.
#[must_use]
pub fn encode_payload(source: &str) -> String {
    utf8_percent_encode(source, PAYLOAD).to_string()
}

/// Emit a code-highlight placeholder.
pub fn emit_code(index: usize, language: &str, source: &str, out: &mut String) {
    write!(
        out,
        r#"<div class="{}" id="fence-{index}" data-lang="{}" data-code="{}"><pre><code>{}</code></pre></div>"#,
        PlaceholderKind::CodeHighlight.marker_class(),
        escape_html(language),
        encode_payload(source),
        escape_html(source)
    )
    .unwrap();
}

/// Emit a diagram placeholder.
pub fn emit_diagram(index: usize, source: &str, out: &mut String) {
    write!(
        out,
        r#"<div class="{}" id="fence-{index}" data-code="{}"><pre><code>{}</code></pre></div>"#,
        PlaceholderKind::Diagram.marker_class(),
        encode_payload(source),
        escape_html(source)
    )
    .unwrap();
}

/// Scan HTML for all placeholders of one kind, in document order.
///
/// Relies on the emitted invariant that the fallback body is escaped (no
/// raw `<`), so the first `</div>` after the opening tag closes the
/// element.
#[must_use]
pub fn scan(html: &str, kind: PlaceholderKind) -> Vec<Placeholder> {
    let open = format!(r#"<div class="{}""#, kind.marker_class());
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(rel) = html[pos..].find(&open) {
        let start = pos + rel;
        let Some(tag_len) = html[start..].find('>') else {
            break;
        };
        let tag_end = start + tag_len + 1;
        let tag = &html[start..tag_end];

        let Some(close_rel) = html[tag_end..].find("</div>") else {
            break;
        };
        let end = tag_end + close_rel + "</div>".len();

        if let (Some(id), Some(payload)) = (attr(tag, "id"), attr(tag, "data-code")) {
            found.push(Placeholder {
                kind,
                id: id.to_owned(),
                language: attr(tag, "data-lang").map(str::to_owned),
                payload: payload.to_owned(),
                fallback: html[tag_end..tag_end + close_rel].to_owned(),
                span: start..end,
            });
        }
        pos = end;
    }

    found
}

/// Extract a double-quoted attribute value from an opening tag.
fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(r#" {name}=""#);
    let at = tag.find(&needle)? + needle.len();
    let rest = &tag[at..];
    rest.find('"').map(|end| &rest[..end])
}
