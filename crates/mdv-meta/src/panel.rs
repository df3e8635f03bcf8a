//! HTML panel rendering for frontmatter.

use std::fmt::Write;

use mdv_renderer::escape_html;

use crate::{Frontmatter, Value};

/// Render frontmatter as an HTML panel.
///
/// One row per key; list values are joined with `<br>`; values beginning
/// with `http` become links opening in a new tab, everything else is
/// escaped.
#[must_use]
pub fn render_panel(frontmatter: &Frontmatter) -> String {
    let mut rows = String::new();
    for (key, value) in frontmatter.iter() {
        let display = match value {
            Value::Scalar(s) => display_value(s),
            Value::List(items) => items
                .iter()
                .map(|item| display_value(item))
                .collect::<Vec<_>>()
                .join("<br>"),
        };
        write!(
            rows,
            r#"<div class="frontmatter-row"><span class="frontmatter-key">{}</span><span class="frontmatter-value">{}</span></div>"#,
            escape_html(key),
            display
        )
        .unwrap();
    }
    format!(r#"<div class="frontmatter">{rows}</div>"#)
}

fn display_value(value: &str) -> String {
    if value.starts_with("http") {
        let escaped = escape_html(value);
        format!(r#"<a href="{escaped}" target="_blank">{escaped}</a>"#)
    } else {
        escape_html(value)
    }
}
