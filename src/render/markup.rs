//! Regex-based extraction over the feed's description markup.
//!
//! Assumes the small, well-formed subset of HTML the feed emits: flat tags,
//! quoted attributes, no nesting inside attribute values. No structural
//! parser is involved.

use regex::Regex;
use std::sync::LazyLock;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid image regex")
});
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>").expect("valid break regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([^#\s]+)").expect("valid hashtag regex"));

/// Image URLs referenced by `<img src=...>`, in order of first appearance.
pub fn extract_images(markup: &str) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();
    for cap in IMG_SRC.captures_iter(markup) {
        let src = decode_entities(&cap[1]);
        if !images.contains(&src) {
            images.push(src);
        }
    }
    images
}

/// Decode the entities the feed actually uses.
///
/// `&amp;` goes last so `&amp;lt;` decodes to a literal `&lt;`.
pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Markup stripped down to plain text.
///
/// `<br>` and closing `</p>` become newlines, every other tag is dropped,
/// then entities are decoded and surrounding whitespace trimmed.
pub fn clean_text(markup: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(markup, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    decode_entities(&stripped).trim().to_string()
}

/// Hashtags (`#word`) in `text`, without the marker.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// `text` with every hashtag run removed, trimmed.
pub fn remove_hashtags(text: &str) -> String {
    HASHTAG.replace_all(text, "").trim().to_string()
}
