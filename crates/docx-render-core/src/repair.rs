//! Textual repair of merge fields fragmented by the styled renderer.
//!
//! High-fidelity layout engines split text runs into nested inline elements
//! (`span`, `font`, ...), which can land an element boundary in the middle
//! of a `{{...}}` placeholder. Only inline leaf formatting ever splits a
//! token, never block structure, so the repair operates on serialized
//! markup with an ordered list of narrowing passes instead of a full tree
//! transform. Every pass is idempotent and a pass with no matches is a
//! no-op.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Inline formatting tags a layout engine may fragment a text run with.
const INLINE_TAGS: &str = "span|font|b|i|em|strong|u|sub|sup|a";

/// One named repair pass over serialized markup.
pub type RepairPass = (&'static str, fn(&str) -> String);

/// The fixed pass order: narrowest first, most permissive last.
pub const REPAIR_PASSES: &[RepairPass] = &[
    ("single-boundary", merge_single_boundary),
    ("multi-boundary", merge_multi_boundary),
    ("boundary-before-content", merge_boundary_before_content),
    ("strip-inner-markup", strip_inner_markup),
];

/// Run every repair pass, in order, over the serialized markup.
pub fn repair_markup(markup: &str) -> String {
    REPAIR_PASSES
        .iter()
        .fold(markup.to_string(), |acc, (_, pass)| pass(&acc))
}

/// `{{content` + one close/open boundary + `rest}}`.
static SINGLE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\{{\{{([^<>{{}}]*)</(?:{INLINE_TAGS})>\s*<(?:{INLINE_TAGS})(?:\s[^>]*)?>([^<>{{}}]*)\}}\}}"
    ))
    .expect("single-boundary pattern")
});

fn merge_single_boundary(markup: &str) -> String {
    SINGLE_BOUNDARY
        .replace_all(markup, "{{${1}${2}}}")
        .into_owned()
}

/// A token span whose interior is any mix of text and inline tags: collect
/// the text segments between the markers and re-emit one intact token.
static MULTI_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\{{\{{((?:[^<>{{}}]*</?(?:{INLINE_TAGS})(?:\s[^>]*)?>)+[^<>{{}}]*)\}}\}}"
    ))
    .expect("multi-boundary pattern")
});

static INLINE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"</?(?:{INLINE_TAGS})(?:\s[^>]*)?>")).expect("inline-tag pattern")
});

fn merge_multi_boundary(markup: &str) -> String {
    MULTI_BOUNDARY
        .replace_all(markup, |caps: &Captures| {
            format!("{{{{{}}}}}", INLINE_TAG.replace_all(&caps[1], ""))
        })
        .into_owned()
}

/// The split falls between `{{` and the first character of the field name.
static BOUNDARY_BEFORE_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\{{\{{(?:\s*</?(?:{INLINE_TAGS})(?:\s[^>]*)?>)+\s*([^<>{{}}]+)\}}\}}"
    ))
    .expect("boundary-before-content pattern")
});

fn merge_boundary_before_content(markup: &str) -> String {
    BOUNDARY_BEFORE_CONTENT
        .replace_all(markup, "{{${1}}}")
        .into_owned()
}

/// Most permissive pass: any remaining `{{...}}` span still containing
/// markup has all markup stripped from inside the span only.
static TOKEN_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("token-span pattern"));

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("any-tag pattern"));

fn strip_inner_markup(markup: &str) -> String {
    TOKEN_SPAN
        .replace_all(markup, |caps: &Captures| {
            let inner = &caps[1];
            if inner.contains('<') {
                format!("{{{{{}}}}}", ANY_TAG.replace_all(inner, ""))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
