//! Mermaid diagram rendering via a Kroki server.
//!
//! Diagram source is POSTed to `{server}/mermaid/svg` and the SVG response
//! returned as a string. Responses are cached in memory under a
//! content-based hash, so repeated renders of the same source (common when
//! a document is re-rendered) skip the network entirely.

mod cache;
mod client;

pub use cache::DiagramKey;
pub use client::{DEFAULT_KROKI_URL, DEFAULT_TIMEOUT, DiagramClient, DiagramError};
