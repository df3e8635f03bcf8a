//! HTTP client for the Kroki rendering service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use ureq::Agent;

use crate::cache::DiagramKey;

/// Public Kroki instance used when no server is configured.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENDPOINT: &str = "mermaid";
const FORMAT: &str = "svg";

/// Diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
}

/// Client for rendering mermaid diagrams through a Kroki server.
///
/// Holds a pooled HTTP agent and an in-memory SVG cache keyed by content
/// hash. Rendering is synchronous; callers that need concurrency run it on
/// a blocking thread.
pub struct DiagramClient {
    agent: Agent,
    base_url: String,
    cache: Mutex<HashMap<String, String>>,
}

impl DiagramClient {
    /// Create a client for the given Kroki server URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    #[must_use]
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The configured server URL, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Render mermaid source to SVG.
    ///
    /// Returns the cached SVG when the same source was rendered before;
    /// otherwise POSTs to `{base_url}/mermaid/svg` and caches the result.
    /// A 4xx/5xx response is a [`DiagramError::Http`] carrying the status
    /// and as much of the response body as could be read.
    pub fn render_svg(&self, source: &str) -> Result<String, DiagramError> {
        let key = DiagramKey {
            source,
            endpoint: ENDPOINT,
            format: FORMAT,
        }
        .compute_hash();

        if let Some(svg) = self.cache_get(&key) {
            tracing::debug!(key = %&key[..12], "diagram cache hit");
            return Ok(svg);
        }

        let svg = self.request_svg(source)?;
        self.cache_put(key, svg.clone());
        Ok(svg)
    }

    fn request_svg(&self, source: &str) -> Result<String, DiagramError> {
        let url = format!("{}/{ENDPOINT}/{FORMAT}", self.base_url);
        tracing::debug!(%url, bytes = source.len(), "rendering diagram");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())
            .map_err(|e| DiagramError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(DiagramError::Http(format!("HTTP {status}: {error_body}")));
        }

        body.read_to_string()
            .map_err(|e| DiagramError::Io(e.to_string()))
    }

    fn cache_get(&self, key: &str) -> Option<String> {
        let cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        cache.get(key).cloned()
    }

    fn cache_put(&self, key: String, svg: String) {
        let mut cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        cache.insert(key, svg);
    }
}
