//! Enrichment dispatchers.
//!
//! A dispatcher resolves every placeholder of one kind by invoking an
//! external engine and substituting the result in place. Dispatchers for
//! different kinds run concurrently and may interleave, but within one
//! dispatcher items are processed strictly in document order, one engine
//! invocation at a time. A failing item resolves to its escaped fallback;
//! it never aborts siblings or the other dispatcher.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mdv_diagrams::{DiagramClient, DiagramError};
use mdv_highlight::{HighlightError, Highlighter};
use mdv_renderer::placeholder::{Placeholder, PlaceholderKind};
use thiserror::Error;

use crate::document::LiveDocument;

/// Error raised by an enrichment engine for one item.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Syntax highlighting engine, as seen by the code dispatcher.
pub trait CodeEngine {
    /// Called once per dispatch with the distinct language tags in the
    /// batch, before any item is highlighted. Lets an engine prepare
    /// grammars for the whole document up front.
    fn prepare(&self, languages: &[String]) {
        let _ = languages;
    }

    fn highlight(&self, language: &str, code: &str) -> Result<String, EngineError>;
}

/// Diagram rendering engine, as seen by the diagram dispatcher.
pub trait DiagramEngine {
    fn render(&self, source: &str) -> Result<String, EngineError>;
}

impl CodeEngine for Highlighter {
    fn prepare(&self, languages: &[String]) {
        let unsupported: Vec<&str> = languages
            .iter()
            .filter(|l| !self.supports(l))
            .map(String::as_str)
            .collect();
        if !unsupported.is_empty() {
            tracing::debug!(languages = ?unsupported, "languages without syntax definitions");
        }
    }

    fn highlight(&self, language: &str, code: &str) -> Result<String, EngineError> {
        Highlighter::highlight(self, language, code)
            .map_err(|err: HighlightError| EngineError(err.to_string()))
    }
}

impl DiagramEngine for DiagramClient {
    fn render(&self, source: &str) -> Result<String, EngineError> {
        self.render_svg(source)
            .map_err(|err: DiagramError| EngineError(err.to_string()))
    }
}

/// Lock the live document, recovering from a poisoned mutex.
pub(crate) fn lock(document: &Mutex<LiveDocument>) -> MutexGuard<'_, LiveDocument> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolve all code-highlight placeholders.
pub async fn enrich_code<E>(document: &Arc<Mutex<LiveDocument>>, engine: Arc<E>)
where
    E: CodeEngine + Send + Sync + 'static,
{
    let placeholders = lock(document).placeholders(PlaceholderKind::CodeHighlight);
    if placeholders.is_empty() {
        return;
    }

    let mut languages: Vec<String> = Vec::new();
    for item in &placeholders {
        if let Some(language) = &item.language
            && !languages.contains(language)
        {
            languages.push(language.clone());
        }
    }
    engine.prepare(&languages);

    for item in placeholders {
        let replacement = run_engine(&item, {
            let engine = Arc::clone(&engine);
            let language = item.language.clone().unwrap_or_else(|| String::from("text"));
            move |source| engine.highlight(&language, &source)
        })
        .await
        .unwrap_or_else(|| item.fallback.clone());

        let mut doc = lock(document);
        if !doc.replace_placeholder(PlaceholderKind::CodeHighlight, &item.id, &replacement) {
            tracing::warn!(id = %item.id, "code placeholder vanished before replacement");
        }
    }
}

/// Resolve all diagram placeholders, then mark the rendered diagrams as
/// click-to-expand.
pub async fn enrich_diagrams<E>(document: &Arc<Mutex<LiveDocument>>, engine: Arc<E>)
where
    E: DiagramEngine + Send + Sync + 'static,
{
    let placeholders = lock(document).placeholders(PlaceholderKind::Diagram);
    if placeholders.is_empty() {
        return;
    }

    for item in placeholders {
        let rendered = run_engine(&item, {
            let engine = Arc::clone(&engine);
            move |source| engine.render(&source)
        })
        .await;

        // Successful renders become figures carrying the placeholder's
        // identifier; fallbacks stay plain preformatted blocks.
        let replacement = match rendered {
            Some(svg) => {
                format!(r#"<figure class="diagram" id="{}">{svg}</figure>"#, item.id)
            }
            None => item.fallback.clone(),
        };

        let mut doc = lock(document);
        if !doc.replace_placeholder(PlaceholderKind::Diagram, &item.id, &replacement) {
            tracing::warn!(id = %item.id, "diagram placeholder vanished before replacement");
        }
    }

    lock(document).mark_diagrams_expandable();
}

/// Decode one placeholder's payload and run the engine on a blocking
/// thread. Returns None on any failure, which the caller resolves to the
/// placeholder's escaped fallback.
async fn run_engine<F>(item: &Placeholder, invoke: F) -> Option<String>
where
    F: FnOnce(String) -> Result<String, EngineError> + Send + 'static,
{
    let source = match item.decode() {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!(id = %item.id, %err, "undecodable payload, keeping fallback");
            return None;
        }
    };

    match tokio::task::spawn_blocking(move || invoke(source)).await {
        Ok(Ok(html)) => Some(html),
        Ok(Err(err)) => {
            tracing::warn!(id = %item.id, %err, "enrichment failed, keeping fallback");
            None
        }
        Err(err) => {
            tracing::warn!(id = %item.id, %err, "enrichment task panicked, keeping fallback");
            None
        }
    }
}
