//! Document pipeline: from raw text to an enrichable document view.

use std::path::Path;
use std::sync::{Arc, Mutex};

use mdv_diagrams::{DEFAULT_KROKI_URL, DiagramClient};
use mdv_highlight::Highlighter;
use mdv_meta::Frontmatter;
use mdv_renderer::placeholder::PlaceholderKind;
use mdv_renderer::{MarkdownRenderer, escape_html};

use crate::document::LiveDocument;
use crate::enrich::{self, lock};
use crate::error::RenderError;
use crate::source::{RawDocument, SourceKind};
use crate::toggle::{ViewState, ViewToggle};

/// Title used when neither the metadata nor the source name provides one.
const FALLBACK_TITLE: &str = "Markdown";

/// Pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Kroki server used for diagram rendering.
    pub kroki_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kroki_url: DEFAULT_KROKI_URL.to_owned(),
        }
    }
}

/// The rendering pipeline.
///
/// `render` runs the synchronous first pass: metadata extraction, markdown
/// rendering, shell assembly, and atomic injection into a fresh
/// [`LiveDocument`]. The returned [`DocumentView`] owns the live document
/// and drives the asynchronous enrichment passes separately, so the base
/// content is complete before any engine is even constructed.
#[derive(Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Read and render a document from disk.
    pub fn render_file(&self, path: &Path) -> Result<Option<DocumentView>, RenderError> {
        let raw = RawDocument::from_path(path)?;
        self.render(&raw)
    }

    /// Render a raw document.
    ///
    /// Returns `Ok(None)` for a document whose trimmed text is empty (a
    /// valid no-op, nothing to show) and `Err` when the source is not
    /// markdown.
    pub fn render(&self, raw: &RawDocument) -> Result<Option<DocumentView>, RenderError> {
        if SourceKind::from_name(&raw.name).is_none() {
            return Err(RenderError::UnsupportedSource {
                name: raw.name.clone(),
            });
        }

        let trimmed = raw.text.trim();
        if trimmed.is_empty() {
            tracing::debug!(name = %raw.name, "empty document, nothing to render");
            return Ok(None);
        }

        let (frontmatter, body) = mdv_meta::extract(trimmed);
        let content = MarkdownRenderer::new().render_markdown(body);
        tracing::debug!(
            name = %raw.name,
            fences = content.fenced_blocks,
            has_frontmatter = frontmatter.is_some(),
            "rendered document body"
        );

        let title = frontmatter
            .as_ref()
            .and_then(Frontmatter::title)
            .unwrap_or_else(|| {
                let hint = raw.title_hint();
                if hint.is_empty() { FALLBACK_TITLE } else { hint }
            })
            .to_owned();
        let panel = frontmatter
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(mdv_meta::render_panel);

        let shell = assemble_shell(&title, panel.as_deref(), &content.html);

        // Single wholesale replacement: no observer sees a partial shell.
        let mut document = LiveDocument::new();
        document.replace_content(shell);

        // Dispatch decisions come from inspecting the injected document,
        // not from render-pass bookkeeping.
        let needs_code = document.has_placeholders(PlaceholderKind::CodeHighlight);
        let needs_diagrams = document.has_placeholders(PlaceholderKind::Diagram);

        let toggle = ViewToggle::install(&mut document);

        Ok(Some(DocumentView {
            document: Arc::new(Mutex::new(document)),
            raw_text: trimmed.to_owned(),
            toggle,
            needs_code,
            needs_diagrams,
            kroki_url: self.config.kroki_url.clone(),
        }))
    }
}

/// A rendered document plus everything needed to enrich and re-present it.
#[derive(Debug)]
pub struct DocumentView {
    document: Arc<Mutex<LiveDocument>>,
    raw_text: String,
    toggle: ViewToggle,
    needs_code: bool,
    needs_diagrams: bool,
    kroki_url: String,
}

impl DocumentView {
    /// Snapshot of the current document HTML.
    #[must_use]
    pub fn html(&self) -> String {
        lock(&self.document).html().to_owned()
    }

    /// The retained trimmed source text.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.toggle.state()
    }

    /// Whether any enrichment pass has work to do.
    #[must_use]
    pub fn needs_enrichment(&self) -> bool {
        self.needs_code || self.needs_diagrams
    }

    /// The shared live document, for dispatchers and tests.
    #[must_use]
    pub fn document(&self) -> &Arc<Mutex<LiveDocument>> {
        &self.document
    }

    /// Switch between the rendered and raw presentation.
    pub fn toggle_view(&mut self) -> ViewState {
        let mut doc = lock(&self.document);
        self.toggle.toggle(&mut doc, &self.raw_text)
    }

    /// Run both enrichment passes with the default engines.
    ///
    /// Engines are only constructed for kinds that actually have
    /// placeholders, and the two dispatchers run concurrently. Individual
    /// failures resolve to fallbacks inside the dispatchers, so this never
    /// fails as a whole.
    pub async fn enrich(&self) {
        let code = async {
            if !self.needs_code {
                return;
            }
            // Loading the default syntax set is heavyweight enough to keep
            // off the async threads.
            match tokio::task::spawn_blocking(Highlighter::new).await {
                Ok(engine) => enrich::enrich_code(&self.document, Arc::new(engine)).await,
                Err(err) => {
                    tracing::warn!(%err, "failed to construct highlighter, keeping fallbacks");
                }
            }
        };
        let diagrams = async {
            if !self.needs_diagrams {
                return;
            }
            let engine = Arc::new(DiagramClient::new(&self.kroki_url));
            enrich::enrich_diagrams(&self.document, engine).await;
        };
        tokio::join!(code, diagrams);
    }
}

/// Assemble the complete document shell around the rendered content.
fn assemble_shell(title: &str, panel: Option<&str>, body_html: &str) -> String {
    let mut shell = String::with_capacity(body_html.len() + 512);
    shell.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    shell.push_str("<meta charset=\"utf-8\">\n");
    shell.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    shell.push_str("<title>");
    shell.push_str(&escape_html(title));
    shell.push_str("</title>\n</head>\n<body>\n<main class=\"markdown-body\">");
    if let Some(panel) = panel {
        shell.push_str(panel);
    }
    shell.push_str(body_html);
    shell.push_str("</main>\n</body>\n</html>\n");
    shell
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn render(name: &str, text: &str) -> Option<DocumentView> {
        Pipeline::default().render(&RawDocument::new(name, text)).unwrap()
    }

    #[test]
    fn test_renders_heading_and_paragraph() {
        let view = render("hello.md", "# Hello World\n\nSome *text*.").unwrap();
        let html = view.html();
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>Some <em>text</em>.</p>"));
        assert!(!view.needs_enrichment());
    }

    #[test]
    fn test_rejects_non_markdown_source() {
        let err = Pipeline::default()
            .render(&RawDocument::new("notes.txt", "# nope"))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedSource { .. }));
    }

    #[test]
    fn test_empty_document_is_a_silent_no_op() {
        assert!(render("empty.md", "").is_none());
        assert!(render("blank.md", "  \n\t\n").is_none());
    }

    #[test]
    fn test_title_prefers_frontmatter_then_file_name() {
        let view = render("notes.md", "---\ntitle: My Title\n---\nBody").unwrap();
        assert!(view.html().contains("<title>My Title</title>"));

        let view = render("notes.md", "Body only").unwrap();
        assert!(view.html().contains("<title>notes</title>"));
    }

    #[test]
    fn test_shell_contains_metadata_panel_before_content() {
        let view = render("doc.md", "---\ntags:\n  - a\n  - b\ntitle: X\n---\nBody").unwrap();
        let html = view.html();
        let panel_at = html.find("frontmatter").unwrap();
        let body_at = html.find("<p>Body</p>").unwrap();
        assert!(panel_at < body_at);
        assert!(html.contains("<meta charset=\"utf-8\">"));
        assert!(html.contains("<meta name=\"viewport\""));
    }

    #[test]
    fn test_enrichment_needs_follow_placeholders() {
        let view = render("code.md", "```rust\nlet x = 1;\n```").unwrap();
        assert!(view.needs_code);
        assert!(!view.needs_diagrams);

        let view = render("diag.md", "```mermaid\ngraph TD;\n```").unwrap();
        assert!(!view.needs_code);
        assert!(view.needs_diagrams);
    }

    #[test]
    fn test_toggle_round_trip_restores_rendered_view() {
        let mut view = render("doc.md", "# Title\n\nBody").unwrap();
        assert_eq!(view.view_state(), ViewState::Rendered);

        assert_eq!(view.toggle_view(), ViewState::Raw);
        assert!(view.html().contains("# Title"));

        assert_eq!(view.toggle_view(), ViewState::Rendered);
        assert!(view.html().contains(r#"<main class="markdown-body">"#));
        assert!(view.html().contains(">Source</button>"));
    }

    #[test]
    fn test_render_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# From Disk").unwrap();

        let view = Pipeline::default().render_file(&path).unwrap().unwrap();
        assert!(view.html().contains(r#"<h1 id="from-disk">From Disk</h1>"#));
        assert!(view.html().contains("<title>readme</title>"));
    }

    #[test]
    fn test_render_file_missing_path() {
        let err = Pipeline::default()
            .render_file(Path::new("/nonexistent/readme.md"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[tokio::test]
    async fn test_invalid_diagram_falls_back_to_escaped_source() {
        // No Kroki server is listening here, so diagram rendering fails and
        // the escaped source must remain visible.
        let pipeline = Pipeline::new(PipelineConfig {
            kroki_url: String::from("http://127.0.0.1:1"),
        });
        let view = pipeline
            .render(&RawDocument::new("d.md", "```mermaid\ngraph <oops>\n```"))
            .unwrap()
            .unwrap();

        view.enrich().await;

        let html = view.html();
        assert!(html.contains("<pre><code>graph &lt;oops&gt;</code></pre>"));
        assert!(!html.contains("diagram-placeholder"));
    }

    #[tokio::test]
    async fn test_enrich_highlights_code() {
        let view = render("c.md", "```rust\nfn main() {}\n```\n\ntext").unwrap();
        view.enrich().await;

        let html = view.html();
        assert!(html.contains(r#"<pre class="highlight language-rust">"#));
        assert!(!html.contains("highlight-placeholder"));
    }
}
