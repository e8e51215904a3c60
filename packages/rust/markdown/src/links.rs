//! Markdown link formatting and capped, deduplicated link lists.

use std::collections::HashSet;
use std::path::Path;

use url::Url;

use crateprov_shared::resolve_path;

/// Label used when neither a name nor a location is known.
const UNKNOWN_LABEL: &str = "(unknown)";

fn scheme_of(location: &str) -> Option<String> {
    Url::parse(location).ok().map(|url| url.scheme().to_string())
}

/// Whether a location is an `http(s)` URL.
pub fn is_web_url(location: &str) -> bool {
    matches!(scheme_of(location).as_deref(), Some("http" | "https"))
}

/// Normalise a location into a URI.
///
/// `http`, `https` and `file` URLs pass through untouched. Anything else is
/// treated as a local path and becomes a `file://` URI of its absolute form;
/// if that fails the location is returned as plain text.
pub fn to_uri(location: &str) -> Option<String> {
    if location.is_empty() {
        return None;
    }
    if matches!(scheme_of(location).as_deref(), Some("http" | "https" | "file")) {
        return Some(location.to_string());
    }
    let absolute = resolve_path(Path::new(location));
    Some(
        Url::from_file_path(&absolute)
            .map(|uri| uri.to_string())
            .unwrap_or_else(|()| location.to_string()),
    )
}

fn label<'a>(name: Option<&'a str>, location: Option<&'a str>) -> &'a str {
    name.filter(|n| !n.is_empty())
        .or(location.filter(|l| !l.is_empty()))
        .unwrap_or(UNKNOWN_LABEL)
}

/// `[name](uri)` for any resolvable location, otherwise just the name.
pub fn make_markdown_link(name: Option<&str>, location: Option<&str>) -> String {
    let label = label(name, location);
    match location.and_then(to_uri) {
        Some(uri) => format!("[{label}]({uri})"),
        None => label.to_string(),
    }
}

/// `[name](url)` only for public `http(s)` URLs; local paths stay plain names
/// so prompts never leak machine-specific locations.
pub fn make_prompt_link(name: Option<&str>, url: Option<&str>) -> String {
    let label = label(name, url);
    match url.filter(|u| is_web_url(u)) {
        Some(url) => format!("[{label}]({url})"),
        None => label.to_string(),
    }
}

/// Overflow marker appended to capped lists.
pub fn more_marker(remaining: usize) -> String {
    format!("… (+{remaining} more)")
}

/// Cap a list at `limit` entries, appending a `… (+N more)` marker whenever
/// `total_count` (defaulting to the list length) exceeds what is kept.
/// A `limit` of zero disables capping.
pub fn limit_list(mut values: Vec<String>, limit: usize, total_count: Option<usize>) -> Vec<String> {
    let total = total_count.unwrap_or(values.len());
    if limit == 0 || values.len() <= limit {
        if total > values.len() {
            let remaining = total - values.len();
            values.push(more_marker(remaining));
        }
        return values;
    }
    values.truncate(limit);
    if total > limit {
        values.push(more_marker(total - limit));
    }
    values
}

/// Order-preserving, deduplicating collector for formatted links.
///
/// Every offered entry counts towards the total, including duplicates, so the
/// overflow marker reflects how many entries the source actually had.
#[derive(Debug, Default)]
pub struct LinkCollector {
    seen: HashSet<String>,
    links: Vec<String>,
    total: usize,
}

impl LinkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a formatted link.
    pub fn push(&mut self, link: String) {
        self.total += 1;
        if self.seen.insert(link.clone()) {
            self.links.push(link);
        }
    }

    /// Finish with the list capped at `limit`.
    pub fn finish(self, limit: usize) -> Vec<String> {
        limit_list(self.links, limit, Some(self.total))
    }
}
