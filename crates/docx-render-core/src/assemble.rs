//! Final document assembly.
//!
//! Wraps a reconciled fragment and its sheet into one self-contained HTML
//! document, or injects the sheet into a document that already has a root.

/// Build a complete HTML document from a fragment and a style sheet.
///
/// A fragment that already begins with a document root marker gets the
/// sheet injected into its head instead of being wrapped a second time.
pub fn assemble_document(fragment: &str, style_sheet: &str) -> String {
    let trimmed = fragment.trim_start();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("<!doctype") || lower.starts_with("<html") {
        return inject_style(fragment, style_sheet);
    }

    let style_block = if style_sheet.trim().is_empty() {
        String::new()
    } else {
        format!("<style>\n{}\n</style>\n", style_sheet.trim())
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{style_block}</head>\n<body>\n{fragment}\n</body>\n</html>\n"
    )
}

fn inject_style(document: &str, style_sheet: &str) -> String {
    if style_sheet.trim().is_empty() {
        return document.to_string();
    }
    let block = format!("<style>\n{}\n</style>", style_sheet.trim());
    let lower = document.to_ascii_lowercase();

    if let Some(insert_at) = tag_open_end(&lower, "head") {
        let mut out = document.to_string();
        out.insert_str(insert_at, &block);
        return out;
    }
    if let Some(insert_at) = tag_open_end(&lower, "html") {
        let mut out = document.to_string();
        out.insert_str(insert_at, &format!("<head>{block}</head>"));
        return out;
    }
    // Degenerate document with a root marker but no html/head open tag.
    format!("{block}\n{document}")
}

/// Byte offset just past the `>` of the first `<name ...>` open tag, if any.
/// Matching requires the tag name to be followed by `>` or whitespace so
/// `<head>` is not confused with `<header>`.
fn tag_open_end(lower: &str, name: &str) -> Option<usize> {
    let open = format!("<{name}");
    for (index, _) in lower.match_indices(&open) {
        let after = index + open.len();
        match lower.as_bytes().get(after) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                let close = lower[after..].find('>')?;
                return Some(after + close + 1);
            }
            _ => continue,
        }
    }
    None
}
