//! The live document: the presentation target the pipeline writes into.
//!
//! Holds the assembled HTML shell and offers the small set of mutations the
//! pipeline, the enrichment dispatchers, and the view toggle need. Content
//! injection is a single wholesale replacement, so an observer reading the
//! document between mutations never sees a half-built shell.

use mdv_renderer::placeholder::{self, Placeholder, PlaceholderKind};

const HIDDEN_STYLE: &str = r#" style="display:none""#;

/// The mutable rendered document.
#[derive(Debug, Default)]
pub struct LiveDocument {
    html: String,
}

impl LiveDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document HTML.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Replace the entire document content in one step.
    pub fn replace_content(&mut self, html: String) {
        self.html = html;
    }

    /// All placeholders of one kind, in document order.
    #[must_use]
    pub fn placeholders(&self, kind: PlaceholderKind) -> Vec<Placeholder> {
        placeholder::scan(&self.html, kind)
    }

    /// Whether any placeholder of this kind remains in the document.
    #[must_use]
    pub fn has_placeholders(&self, kind: PlaceholderKind) -> bool {
        !self.placeholders(kind).is_empty()
    }

    /// Replace the placeholder with the given identifier by `replacement`.
    ///
    /// Placeholders are re-located at call time rather than through stored
    /// offsets, so earlier replacements (which shift byte positions) do not
    /// invalidate later ones. Returns false when no placeholder of this
    /// kind carries the identifier, which makes resolved placeholders
    /// final: once replaced, the element no longer matches.
    pub fn replace_placeholder(
        &mut self,
        kind: PlaceholderKind,
        id: &str,
        replacement: &str,
    ) -> bool {
        let Some(found) = self
            .placeholders(kind)
            .into_iter()
            .find(|p| p.id == id)
        else {
            return false;
        };
        self.html.replace_range(found.span, replacement);
        true
    }

    /// Append a fragment at the end of the body (before `</body>`, or at
    /// the document end when no such tag exists).
    pub fn append_to_body(&mut self, fragment: &str) {
        match self.html.rfind("</body>") {
            Some(at) => self.html.insert_str(at, fragment),
            None => self.html.push_str(fragment),
        }
    }

    /// Show or hide the element whose class attribute is exactly `class`.
    /// Returns false when no such element exists.
    pub fn set_hidden(&mut self, class: &str, hidden: bool) -> bool {
        let Some(range) = self.open_tag_range(class) else {
            return false;
        };
        let tag = &self.html[range.clone()];
        let has_style = tag.contains(HIDDEN_STYLE);

        if hidden && !has_style {
            // Insert just before the closing '>'.
            self.html.insert_str(range.end - 1, HIDDEN_STYLE);
        } else if !hidden && has_style {
            let updated = tag.replacen(HIDDEN_STYLE, "", 1);
            self.html.replace_range(range, &updated);
        }
        true
    }

    /// Replace the inner content of the element whose class attribute is
    /// exactly `class`. Only suitable for elements with flat text content,
    /// like the toggle control's label.
    pub fn set_element_content(&mut self, class: &str, content: &str) -> bool {
        let Some(range) = self.open_tag_range(class) else {
            return false;
        };
        let Some(inner_len) = self.html[range.end..].find("</") else {
            return false;
        };
        self.html
            .replace_range(range.end..range.end + inner_len, content);
        true
    }

    /// Mark every rendered diagram figure as click-to-expand.
    pub fn mark_diagrams_expandable(&mut self) {
        self.html = self.html.replace(
            r#"<figure class="diagram" id="#,
            r#"<figure class="diagram expandable" id="#,
        );
    }

    /// Toggle the fullscreen presentation state of the diagram figure with
    /// the given identifier. Returns the new state, or None when no such
    /// diagram exists.
    pub fn toggle_diagram_fullscreen(&mut self, id: &str) -> Option<bool> {
        let range = self.tag_range_by_id(id, "<figure ")?;
        let tag = &self.html[range.clone()];

        let updated = if tag.contains(" fullscreen\"") {
            tag.replacen(" fullscreen\"", "\"", 1)
        } else {
            tag.replacen(
                r#"class="diagram expandable""#,
                r#"class="diagram expandable fullscreen""#,
                1,
            )
        };
        let expanded = updated.contains(" fullscreen\"");
        self.html.replace_range(range, &updated);
        Some(expanded)
    }

    /// Byte range of the opening tag of the element whose class attribute
    /// is exactly `class`.
    fn open_tag_range(&self, class: &str) -> Option<std::ops::Range<usize>> {
        let needle = format!(r#"class="{class}""#);
        let at = self.html.find(&needle)?;
        let start = self.html[..at].rfind('<')?;
        let end = at + self.html[at..].find('>')? + 1;
        Some(start..end)
    }

    /// Byte range of the opening tag starting with `prefix` that carries
    /// `id="{id}"`.
    fn tag_range_by_id(&self, id: &str, prefix: &str) -> Option<std::ops::Range<usize>> {
        let needle = format!(r#" id="{id}""#);
        let at = self.html.find(&needle)?;
        let start = self.html[..at].rfind('<')?;
        if !self.html[start..].starts_with(prefix) {
            return None;
        }
        let end = at + self.html[at..].find('>')? + 1;
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document_with(html: &str) -> LiveDocument {
        let mut doc = LiveDocument::new();
        doc.replace_content(html.to_owned());
        doc
    }

    #[test]
    fn test_replace_placeholder_is_final() {
        let mut body = String::from("<p>a</p>");
        placeholder::emit_code(0, "rust", "let x = 1;", &mut body);
        let mut doc = document_with(&body);

        assert!(doc.has_placeholders(PlaceholderKind::CodeHighlight));
        assert!(doc.replace_placeholder(
            PlaceholderKind::CodeHighlight,
            "fence-0",
            "<pre>done</pre>"
        ));
        assert!(doc.html().contains("<pre>done</pre>"));

        // Already resolved: the identifier no longer matches.
        assert!(!doc.replace_placeholder(PlaceholderKind::CodeHighlight, "fence-0", "<pre>again</pre>"));
        assert!(!doc.has_placeholders(PlaceholderKind::CodeHighlight));
    }

    #[test]
    fn test_replace_out_of_order_survives_offset_shifts() {
        let mut body = String::new();
        placeholder::emit_code(0, "rust", "short", &mut body);
        placeholder::emit_code(1, "rust", "other", &mut body);
        let mut doc = document_with(&body);

        // Replacing the first with something much longer shifts the second.
        let long = "<pre>".to_owned() + &"x".repeat(500) + "</pre>";
        assert!(doc.replace_placeholder(PlaceholderKind::CodeHighlight, "fence-0", &long));
        assert!(doc.replace_placeholder(PlaceholderKind::CodeHighlight, "fence-1", "<pre>two</pre>"));
        assert!(doc.html().contains("<pre>two</pre>"));
    }

    #[test]
    fn test_append_to_body() {
        let mut doc = document_with("<html><body><p>x</p></body></html>");
        doc.append_to_body("<footer>f</footer>");
        assert_eq!(
            doc.html(),
            "<html><body><p>x</p><footer>f</footer></body></html>"
        );
    }

    #[test]
    fn test_set_hidden_round_trip() {
        let original = r#"<body><main class="markdown-body"><p>x</p></main></body>"#;
        let mut doc = document_with(original);

        assert!(doc.set_hidden("markdown-body", true));
        assert!(doc
            .html()
            .contains(r#"<main class="markdown-body" style="display:none">"#));

        // Hiding twice does not stack styles.
        assert!(doc.set_hidden("markdown-body", true));
        assert_eq!(doc.html().matches("display:none").count(), 1);

        assert!(doc.set_hidden("markdown-body", false));
        assert_eq!(doc.html(), original);
    }

    #[test]
    fn test_set_hidden_missing_element() {
        let mut doc = document_with("<body></body>");
        assert!(!doc.set_hidden("raw-source", true));
    }

    #[test]
    fn test_set_element_content() {
        let mut doc =
            document_with(r#"<body><button class="view-toggle" type="button">Source</button></body>"#);
        assert!(doc.set_element_content("view-toggle", "Rendered"));
        assert!(doc.html().contains(">Rendered</button>"));
    }

    #[test]
    fn test_diagram_fullscreen_toggle() {
        let mut doc = document_with(
            r#"<figure class="diagram" id="fence-0"><svg></svg></figure>"#,
        );
        doc.mark_diagrams_expandable();
        assert!(doc.html().contains(r#"class="diagram expandable""#));

        assert_eq!(doc.toggle_diagram_fullscreen("fence-0"), Some(true));
        assert!(doc.html().contains(r#"class="diagram expandable fullscreen""#));

        assert_eq!(doc.toggle_diagram_fullscreen("fence-0"), Some(false));
        assert!(!doc.html().contains("fullscreen"));

        assert_eq!(doc.toggle_diagram_fullscreen("fence-9"), None);
    }
}
