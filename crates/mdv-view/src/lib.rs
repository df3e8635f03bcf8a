//! Document pipeline and view layer.
//!
//! Ties the lower crates together: metadata extraction and markdown
//! rendering run synchronously, the assembled shell is injected into a
//! [`LiveDocument`] in one atomic replacement, and enrichment (syntax
//! highlighting, diagram rendering) happens afterwards through per-kind
//! dispatchers that resolve placeholders in place. A [`ViewToggle`]
//! switches the finished document between rendered and raw presentation.

mod document;
mod enrich;
mod error;
mod pipeline;
mod source;
mod toggle;

pub use document::LiveDocument;
pub use enrich::{CodeEngine, DiagramEngine, EngineError, enrich_code, enrich_diagrams};
pub use error::RenderError;
pub use pipeline::{DocumentView, Pipeline, PipelineConfig};
pub use source::{RawDocument, SourceKind};
pub use toggle::{ViewState, ViewToggle};
