//! Diagram cache key computation.

use sha2::{Digest, Sha256};

/// Diagram parameters for cache key computation.
///
/// Contains everything that affects the rendered output, so a change to any
/// field is a cache miss.
#[derive(Debug)]
pub struct DiagramKey<'a> {
    /// Diagram source code.
    pub source: &'a str,
    /// Kroki endpoint (e.g., "mermaid").
    pub endpoint: &'a str,
    /// Output format ("svg").
    pub format: &'a str,
}

impl DiagramKey<'_> {
    /// SHA-256 of `"{endpoint}:{format}:{source}"`, hex-encoded.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let content = format!("{}:{}:{}", self.endpoint, self.format, self.source);
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}
