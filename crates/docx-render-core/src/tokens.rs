//! Merge-field token scanner.
//!
//! A token is a literal `{{...}}` placeholder substituted by a downstream
//! templating step. This module only finds tokens, it never resolves them.

use kuchiki::traits::TendrilSink;
use once_cell::sync::Lazy;
use regex::Regex;

/// Non-greedy, non-nested placeholder grammar. The `[[...]]` form shows up
/// in older templates and is tolerated.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[^}]+\}\}|\[\[[^\]]+\]\]").expect("token pattern"));

/// Ordered list of token substrings found in plain text.
pub fn scan_text(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ordered list of token substrings found in the text nodes of `markup`.
///
/// Scanning happens per text node, so a token fragmented across element
/// boundaries is not found. That is the point: the reconciler uses this
/// count to decide whether a rendering still needs repair.
pub fn scan_html(markup: &str) -> Vec<String> {
    let document = kuchiki::parse_html().one(markup);
    let mut found = Vec::new();
    for node in document.descendants() {
        if let Some(text) = node.as_text() {
            found.extend(scan_text(&text.borrow()));
        }
    }
    found
}
