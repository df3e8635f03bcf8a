//! Raw document input and source-kind gating.

use std::path::Path;

use crate::error::RenderError;

/// Recognized source kinds. The pipeline only runs for markdown sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Markdown,
}

impl SourceKind {
    /// Classify a source by its name. Exactly two extensions are accepted,
    /// matched case-sensitively: `.md` and `.markdown`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".md") || name.ends_with(".markdown") {
            Some(Self::Markdown)
        } else {
            None
        }
    }
}

/// An input document: the full text plus the name it was loaded under.
///
/// Captured once at pipeline start and retained for the lifetime of the
/// view; the raw-view toggle displays this text.
#[derive(Clone, Debug)]
pub struct RawDocument {
    pub name: String,
    pub text: String,
}

impl RawDocument {
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a document from disk, keeping the file name as the source name.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { name, text })
    }

    /// The source name without its markdown extension, for use as a title.
    #[must_use]
    pub fn title_hint(&self) -> &str {
        self.name
            .strip_suffix(".markdown")
            .or_else(|| self.name.strip_suffix(".md"))
            .unwrap_or(&self.name)
    }
}
