//! Rendered/raw view toggle.

use mdv_renderer::escape_html;

use crate::document::LiveDocument;

/// Which presentation of the document is currently visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    Rendered,
    Raw,
}

/// Two-state control switching between the rendered document and its raw
/// source text.
///
/// The raw display element is materialized lazily on the first switch to
/// [`ViewState::Raw`] and reused afterwards. The toggle only exists once
/// the pipeline has injected the shell, so no transition can observe a
/// half-built document.
#[derive(Debug)]
pub struct ViewToggle {
    state: ViewState,
    raw_installed: bool,
}

impl ViewToggle {
    /// Append the toggle control to the document and start in the rendered
    /// state.
    pub fn install(document: &mut LiveDocument) -> Self {
        document.append_to_body(r#"<button class="view-toggle" type="button">Source</button>"#);
        Self {
            state: ViewState::Rendered,
            raw_installed: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Switch to the other view. `raw_text` is the retained trimmed source,
    /// only consulted the first time the raw view is shown.
    pub fn toggle(&mut self, document: &mut LiveDocument, raw_text: &str) -> ViewState {
        match self.state {
            ViewState::Rendered => {
                if !self.raw_installed {
                    let raw_element = format!(
                        r#"<pre class="raw-source" style="display:none">{}</pre>"#,
                        escape_html(raw_text)
                    );
                    document.append_to_body(&raw_element);
                    self.raw_installed = true;
                }
                document.set_hidden("markdown-body", true);
                document.set_hidden("raw-source", false);
                document.set_element_content("view-toggle", "Rendered");
                self.state = ViewState::Raw;
            }
            ViewState::Raw => {
                document.set_hidden("raw-source", true);
                document.set_hidden("markdown-body", false);
                document.set_element_content("view-toggle", "Source");
                self.state = ViewState::Rendered;
            }
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> LiveDocument {
        let mut doc = LiveDocument::new();
        doc.replace_content(
            r#"<html><body><main class="markdown-body"><p>hi</p></main></body></html>"#.to_owned(),
        );
        doc
    }

    #[test]
    fn test_install_adds_control_in_rendered_state() {
        let mut doc = shell();
        let toggle = ViewToggle::install(&mut doc);
        assert_eq!(toggle.state(), ViewState::Rendered);
        assert!(doc.html().contains(r#"<button class="view-toggle" type="button">Source</button>"#));
    }

    #[test]
    fn test_toggle_to_raw_shows_source() {
        let mut doc = shell();
        let mut toggle = ViewToggle::install(&mut doc);

        let state = toggle.toggle(&mut doc, "# raw <markdown>");
        assert_eq!(state, ViewState::Raw);
        assert!(doc
            .html()
            .contains(r#"<main class="markdown-body" style="display:none">"#));
        assert!(doc.html().contains(r#"<pre class="raw-source">"#));
        assert!(doc.html().contains("# raw &lt;markdown&gt;"));
        assert!(doc.html().contains(">Rendered</button>"));
    }

    #[test]
    fn test_toggle_twice_restores_rendered_view() {
        let mut doc = shell();
        let mut toggle = ViewToggle::install(&mut doc);
        let before = doc.html().to_owned();

        toggle.toggle(&mut doc, "raw");
        toggle.toggle(&mut doc, "raw");

        assert_eq!(toggle.state(), ViewState::Rendered);
        // Rendered body visible again, raw display hidden, label restored.
        assert!(doc.html().contains(r#"<main class="markdown-body">"#));
        assert!(doc
            .html()
            .contains(r#"<pre class="raw-source" style="display:none">"#));
        assert!(doc.html().contains(">Source</button>"));
        assert!(doc.html().starts_with(&before[..before.find("<button").map_or(0, |i| i)]));
    }

    #[test]
    fn test_raw_element_is_reused() {
        let mut doc = shell();
        let mut toggle = ViewToggle::install(&mut doc);

        toggle.toggle(&mut doc, "raw");
        toggle.toggle(&mut doc, "raw");
        toggle.toggle(&mut doc, "raw");

        assert_eq!(doc.html().matches(r#"class="raw-source""#).count(), 1);
    }
}
