//! Markup stripping: visible text out, tags and scripts gone.

use scraper::Html;

/// Extract the visible text content from an HTML/XML-ish fragment.
///
/// Tags are dropped; text inside `<script>` and `<style>` elements is
/// dropped with them. Whitespace inside text nodes is preserved as the HTML
/// parser sees it, with leading/trailing whitespace trimmed from the result.
/// An empty or tag-only input yields an empty string.
pub fn strip_markup(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(input);
    let mut out = String::new();
    for node in fragment.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| matches!(element.name(), "script" | "style"))
        });
        if !hidden {
            out.push_str(text);
        }
    }
    out.trim().to_string()
}
