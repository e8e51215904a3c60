//! Whitespace normalisation, previews, and forgiving UTF-8 decoding.

use std::sync::LazyLock;

use regex::Regex;

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// Shorten text to at most `width` characters on word boundaries.
///
/// Whitespace is collapsed first. When the text does not fit, whole words are
/// kept while they fit alongside `placeholder`, which is appended directly.
/// When not even the first word fits, only the placeholder is returned.
pub fn shorten(text: &str, width: usize, placeholder: &str) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(placeholder.chars().count());
    let mut kept = String::new();
    let mut kept_len = 0;
    for word in collapsed.split(' ') {
        let word_len = word.chars().count();
        let needed = if kept.is_empty() { word_len } else { word_len + 1 };
        if kept_len + needed > budget {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
        kept_len += needed;
    }

    if kept.is_empty() {
        return placeholder.trim_start().to_string();
    }
    kept.push_str(placeholder);
    kept
}

/// Decode bytes as UTF-8, silently dropping invalid sequences.
pub fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut decoded = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        decoded.push_str(chunk.valid());
    }
    decoded
}
