use std::path::PathBuf;

use thiserror::Error;

/// Pipeline-level rendering error.
///
/// Per-placeholder enrichment failures are not represented here; they are
/// recovered locally by the dispatchers and never reach the caller.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The source is not a markdown document. This is a precondition
    /// rejection, raised before any rendering is attempted.
    #[error("not a markdown document: {name}")]
    UnsupportedSource { name: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
