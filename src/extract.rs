// src/extract.rs
//! Content extraction: markup → flattened plain text.
//!
//! This is layout flattening, not boilerplate detection. All text outside
//! `script`/`style` is kept, lines are trimmed, runs of two spaces split a line
//! into separate fragments, and empty fragments are dropped.

use std::panic;

use scraper::{Html, Node};
use tracing::warn;

pub const NO_CONTENT: &str = "No content available.";
pub const EXTRACTION_ERROR: &str = "Error extracting content.";

const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Readable text from `markup`. Never fails; faults map to [`EXTRACTION_ERROR`].
pub fn extract(markup: Option<&str>) -> String {
    extract_with(markup, flatten)
}

fn extract_with(markup: Option<&str>, flatten: fn(&str) -> String) -> String {
    let Some(markup) = markup.filter(|m| !m.is_empty()) else {
        return NO_CONTENT.to_string();
    };

    match panic::catch_unwind(|| flatten(markup)) {
        Ok(text) => text,
        Err(_) => {
            warn!(len = markup.len(), "html parser panicked while extracting content");
            EXTRACTION_ERROR.to_string()
        }
    }
}

fn flatten(markup: &str) -> String {
    let raw = visible_text(markup);

    raw.split(is_line_boundary)
        .map(str::trim)
        .flat_map(|line| line.split("  ").map(str::trim))
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Concatenated text nodes, in document order, outside skipped elements.
fn visible_text(markup: &str) -> String {
    let doc = Html::parse_document(markup);
    let mut out = String::with_capacity(markup.len() / 2);

    for node in doc.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }

    out
}

// Universal newlines: \n, \r, VT, FF, FS, GS, RS, NEL, LS, PS.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_panic_maps_to_extraction_error() {
        let out = extract_with(Some("<p>fine</p>"), |_| panic!("html5ever blew up"));
        assert_eq!(out, EXTRACTION_ERROR);
        // absent markup short-circuits before the parser runs
        assert_eq!(extract_with(None, |_| panic!("unreachable")), NO_CONTENT);
    }

    #[test]
    fn absent_or_empty_markup_is_no_content() {
        assert_eq!(extract(None), NO_CONTENT);
        assert_eq!(extract(Some("")), NO_CONTENT);
    }

    #[test]
    fn drops_script_and_style_text() {
        let html = r#"<html><head><title>T</title><style>p { color: red }</style></head>
<body><script>var x = 1;</script><p>Hello world</p></body></html>"#;
        assert_eq!(extract(Some(html)), "T\nHello world");
    }

    #[test]
    fn splits_lines_and_double_spaces() {
        let html = "<div>  First line  \n\n   Second  part   here\r\nlast</div>";
        assert_eq!(
            extract(Some(html)),
            "First line\nSecond\npart\nhere\nlast"
        );
    }

    #[test]
    fn single_spaces_are_kept_inside_a_fragment() {
        let html = "<p>one two three</p>";
        assert_eq!(extract(Some(html)), "one two three");
    }

    #[test]
    fn adjacent_inline_text_is_concatenated_without_separator() {
        let html = "<p><b>bold</b><i>italic</i></p>";
        assert_eq!(extract(Some(html)), "bolditalic");
    }

    #[test]
    fn comments_are_not_text() {
        let html = "<p>kept<!-- hidden --></p>";
        assert_eq!(extract(Some(html)), "kept");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(extract(Some("<p>a &amp; b</p>")), "a & b");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(extract(Some("just text")), "just text");
    }
}
