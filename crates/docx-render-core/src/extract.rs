//! Token-faithful DOCX to HTML extraction.
//!
//! Reads `word/document.xml` straight out of the package and emits an HTML
//! fragment with coarse styling only (heading levels, bold/italic/underline,
//! alignment, tables). Styling fidelity is the styled renderer's job; this
//! side exists to carry merge fields through intact.

use std::io::{Cursor, Read};

use roxmltree::Node;
use zip::ZipArchive;

use crate::error::ExtractError;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Convert a DOCX package into an HTML fragment wrapped in
/// `<div class="docx-content">`.
pub fn extract_fragment(document: &[u8]) -> Result<String, ExtractError> {
    let xml = read_part(document, "word/document.xml")?;
    let doc = roxmltree::Document::parse(&xml)?;

    let mut html = String::from("<div class=\"docx-content\">");
    if let Some(body) = doc
        .descendants()
        .find(|n| n.tag_name().name() == "body")
    {
        render_block_children(body, &mut html);
    }
    html.push_str("</div>");
    Ok(html)
}

/// Read one XML part from the DOCX ZIP archive.
fn read_part(document: &[u8], part: &'static str) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(document))?;
    let mut entry = archive.by_name(part).map_err(|err| match err {
        zip::result::ZipError::FileNotFound => ExtractError::MissingPart(part),
        other => ExtractError::Archive(other),
    })?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

fn render_block_children(container: Node, out: &mut String) {
    for child in container.children() {
        match child.tag_name().name() {
            "p" => render_paragraph(child, out),
            "tbl" => render_table(child, out),
            _ => {}
        }
    }
}

fn render_paragraph(p: Node, out: &mut String) {
    let (tag, align) = paragraph_shape(p);
    out.push('<');
    out.push_str(tag);
    if let Some(align) = align {
        out.push_str(" style=\"text-align:");
        out.push_str(align);
        out.push('"');
    }
    out.push('>');
    for run in coalesce_runs(p) {
        render_run(&run, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Heading level and justification from `<w:pPr>`.
fn paragraph_shape(p: Node) -> (&'static str, Option<&'static str>) {
    let mut tag = "p";
    let mut align = None;
    if let Some(ppr) = p.children().find(|n| n.tag_name().name() == "pPr") {
        for prop in ppr.children() {
            match prop.tag_name().name() {
                "pStyle" => {
                    tag = match val_attribute(prop) {
                        Some("Heading1") => "h1",
                        Some("Heading2") => "h2",
                        Some("Heading3") => "h3",
                        Some("Heading4") => "h4",
                        Some("Heading5") => "h5",
                        Some("Heading6") => "h6",
                        _ => "p",
                    };
                }
                "jc" => {
                    align = match val_attribute(prop) {
                        Some("center") => Some("center"),
                        Some("right") | Some("end") => Some("right"),
                        Some("both") | Some("distribute") => Some("justify"),
                        _ => None,
                    };
                }
                _ => {}
            }
        }
    }
    (tag, align)
}

#[derive(Debug, PartialEq, Eq)]
struct RunText {
    bold: bool,
    italic: bool,
    underline: bool,
    text: String,
}

/// Collect the runs of a paragraph, merging consecutive runs that carry the
/// same formatting. Authoring applications split runs arbitrarily (spell
/// check, revision tracking), which would otherwise split merge fields.
fn coalesce_runs(p: Node) -> Vec<RunText> {
    let mut runs: Vec<RunText> = Vec::new();
    for child in p.children() {
        match child.tag_name().name() {
            "r" => push_run(child, &mut runs),
            // Runs nested one level down keep their paragraph position.
            "hyperlink" | "smartTag" => {
                for nested in child.children().filter(|n| n.tag_name().name() == "r") {
                    push_run(nested, &mut runs);
                }
            }
            _ => {}
        }
    }
    runs
}

fn push_run(r: Node, runs: &mut Vec<RunText>) {
    let (bold, italic, underline) = run_flags(r);
    let mut text = String::new();
    for child in r.children() {
        match child.tag_name().name() {
            "t" => {
                if let Some(t) = child.text() {
                    text.push_str(t);
                }
            }
            "br" => text.push('\n'),
            "tab" => text.push('\t'),
            _ => {}
        }
    }
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.bold == bold && last.italic == italic && last.underline == underline => {
            last.text.push_str(&text);
        }
        _ => runs.push(RunText {
            bold,
            italic,
            underline,
            text,
        }),
    }
}

fn run_flags(r: Node) -> (bool, bool, bool) {
    let Some(rpr) = r.children().find(|n| n.tag_name().name() == "rPr") else {
        return (false, false, false);
    };
    (flag_on(rpr, "b"), flag_on(rpr, "i"), flag_on(rpr, "u"))
}

/// A toggle property is on when present, unless its value negates it.
fn flag_on(rpr: Node, name: &str) -> bool {
    rpr.children()
        .find(|n| n.tag_name().name() == name)
        .map(|n| !matches!(val_attribute(n), Some("false") | Some("0") | Some("none")))
        .unwrap_or(false)
}

fn render_run(run: &RunText, out: &mut String) {
    if run.bold {
        out.push_str("<b>");
    }
    if run.italic {
        out.push_str("<i>");
    }
    if run.underline {
        out.push_str("<u>");
    }
    out.push_str(&escape_text(&run.text).replace('\n', "<br>"));
    if run.underline {
        out.push_str("</u>");
    }
    if run.italic {
        out.push_str("</i>");
    }
    if run.bold {
        out.push_str("</b>");
    }
}

fn render_table(tbl: Node, out: &mut String) {
    out.push_str("<table>");
    for tr in tbl.children().filter(|n| n.tag_name().name() == "tr") {
        out.push_str("<tr>");
        for tc in tr.children().filter(|n| n.tag_name().name() == "tc") {
            let span = grid_span(tc);
            if span > 1 {
                out.push_str("<td colspan=\"");
                out.push_str(&span.to_string());
                out.push_str("\">");
            } else {
                out.push_str("<td>");
            }
            render_block_children(tc, out);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}

fn grid_span(tc: Node) -> usize {
    for tcpr in tc.children().filter(|n| n.tag_name().name() == "tcPr") {
        for prop in tcpr.children() {
            if prop.tag_name().name() == "gridSpan" {
                return val_attribute(prop)
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1);
            }
        }
    }
    1
}

/// Namespaced lookup with a prefixed fallback for non-conforming producers.
fn val_attribute<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((WORD_NS, "val"))
        .or_else(|| node.attribute("w:val"))
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
