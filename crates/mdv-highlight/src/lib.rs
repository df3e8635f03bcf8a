//! Syntax highlighting for fenced code blocks.
//!
//! Wraps syntect's classed HTML generator: output carries CSS classes
//! instead of inline styles, so themes stay a stylesheet concern. An
//! unrecognized language is an error rather than a silent plain-text
//! render, which lets callers keep their escaped fallback markup instead.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

/// Class prefix applied to every generated syntax span.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syntax-" };

/// Language tokens treated as plain text rather than looked up as a syntax.
const PLAIN_TOKENS: [&str; 4] = ["text", "txt", "plain", "plaintext"];

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no syntax definition for language `{0}`")]
    UnsupportedLanguage(String),
    #[error("highlighting failed for language `{language}`: {message}")]
    Syntax { language: String, message: String },
}

/// Syntax highlighting engine.
///
/// Loading the default syntax set is not free, so construct once and reuse
/// across blocks.
pub struct Highlighter {
    syntax_set: SyntaxSet,
}

impl Highlighter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlight `code` as `language`, returning a `<pre><code>` block with
    /// syntax classes.
    ///
    /// The language token is matched case-insensitively against syntax
    /// names, tokens, and file extensions. Plain-text tokens (`text`,
    /// `txt`, `plain`, `plaintext`) highlight with the plain-text syntax;
    /// any other unmatched token is an error.
    pub fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightError> {
        let token = language.to_ascii_lowercase();
        let syntax = self
            .find_syntax(&token)
            .ok_or_else(|| HighlightError::UnsupportedLanguage(token.clone()))?;

        tracing::debug!(language = %token, bytes = code.len(), "highlighting code block");

        let mut source = code.to_owned();
        if !source.ends_with('\n') {
            source.push('\n');
        }

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(&source) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| HighlightError::Syntax {
                    language: token.clone(),
                    message: err.to_string(),
                })?;
        }

        Ok(format!(
            r#"<pre class="highlight language-{token}"><code>{}</code></pre>"#,
            generator.finalize()
        ))
    }

    /// Check whether a language token has a syntax definition available.
    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        self.find_syntax(&language.to_ascii_lowercase()).is_some()
    }

    fn find_syntax(&self, token: &str) -> Option<&SyntaxReference> {
        if PLAIN_TOKENS.contains(&token) {
            return Some(self.syntax_set.find_syntax_plain_text());
        }
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlights_rust() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("rust", "fn main() {}").unwrap();
        assert!(html.starts_with(r#"<pre class="highlight language-rust"><code>"#));
        assert!(html.ends_with("</code></pre>"));
        assert!(html.contains("syntax-"));
    }

    #[test]
    fn test_language_token_is_case_insensitive() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("Rust", "let x = 1;").unwrap();
        assert!(html.contains("language-rust"));
    }

    #[test]
    fn test_plain_text_tokens() {
        let highlighter = Highlighter::new();
        for token in ["text", "txt", "plain", "plaintext"] {
            let html = highlighter.highlight(token, "just words").unwrap();
            assert!(html.contains("just words"), "token {token}");
        }
    }

    #[test]
    fn test_unknown_language_is_an_error() {
        let highlighter = Highlighter::new();
        let err = highlighter.highlight("notalanguage", "x").unwrap_err();
        assert!(matches!(err, HighlightError::UnsupportedLanguage(_)));
        assert!(err.to_string().contains("notalanguage"));
    }

    #[test]
    fn test_supports() {
        let highlighter = Highlighter::new();
        assert!(highlighter.supports("python"));
        assert!(highlighter.supports("text"));
        assert!(!highlighter.supports("notalanguage"));
    }

    #[test]
    fn test_output_escapes_source() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("text", "<b>&</b>").unwrap();
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&amp;"));
        assert!(!html.contains("<b>"));
    }
}
