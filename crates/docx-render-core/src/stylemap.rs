//! Style capture and positional transplant between the two renderings.
//!
//! The styled renderer and the extractor produce structurally independent
//! trees, so there is no stable cross-tree element identity. The only join
//! key available is the element's position among same-tag elements in
//! document order. That matching is a documented best-effort approximation:
//! when the extractor tree has more elements of a tag than the styled tree,
//! the first captured record of that tag is reused; when the styled tree has
//! none, the element is left unstyled.

use std::collections::HashMap;

use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;

/// Attributes carried over from the styled tree besides `style` and `class`.
pub const COPIED_ATTRIBUTES: &[&str] = &[
    "align", "valign", "width", "height", "colspan", "rowspan", "bgcolor",
];

/// Structural wrappers that carry no transferable per-element styling.
const SKIP_TAGS: &[&str] = &[
    "html", "head", "body", "style", "script", "title", "meta", "link",
];

/// Visual attributes of one element in the styled tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRecord {
    pub style: Option<String>,
    pub class: Option<String>,
    pub attrs: Vec<(String, String)>,
}

/// Everything captured from the styled renderer's output: per-tag ordered
/// style records, the concatenated `<style>` sheet, and the serialized body
/// fragment.
#[derive(Debug, Default)]
pub struct StyleMap {
    records: HashMap<String, Vec<StyleRecord>>,
    pub style_sheet: String,
    pub body_fragment: String,
}

impl StyleMap {
    pub fn capture(styled_markup: &str) -> Self {
        let document = kuchiki::parse_html().one(styled_markup);
        let mut records: HashMap<String, Vec<StyleRecord>> = HashMap::new();

        for node in document.descendants() {
            let Some(element) = node.as_element() else {
                continue;
            };
            let tag = element.name.local.as_ref().to_ascii_lowercase();
            if SKIP_TAGS.contains(&tag.as_str()) {
                continue;
            }
            let attrs = element.attributes.borrow();
            let mut record = StyleRecord {
                style: attrs.get("style").map(str::to_string),
                class: attrs.get("class").map(str::to_string),
                attrs: Vec::new(),
            };
            for name in COPIED_ATTRIBUTES {
                if let Some(value) = attrs.get(*name) {
                    record.attrs.push((name.to_string(), value.to_string()));
                }
            }
            records.entry(tag).or_default().push(record);
        }

        StyleMap {
            records,
            style_sheet: collect_style_sheet(&document),
            body_fragment: serialize_body(&document),
        }
    }

    /// Number of captured records for a tag.
    pub fn captured(&self, tag: &str) -> usize {
        self.records.get(tag).map(Vec::len).unwrap_or(0)
    }

    /// True when the styled tree yielded no elements to capture at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy captured styling onto the extractor tree, element by element,
    /// matching on (tag, running index among same-tag elements). Text
    /// content is never touched.
    pub fn apply(&self, fragment_markup: &str) -> String {
        let document = kuchiki::parse_html().one(fragment_markup);
        let mut cursor: HashMap<String, usize> = HashMap::new();

        for node in document.descendants() {
            let Some(element) = node.as_element() else {
                continue;
            };
            let tag = element.name.local.as_ref().to_ascii_lowercase();
            if SKIP_TAGS.contains(&tag.as_str()) {
                continue;
            }
            let index = cursor.entry(tag.clone()).or_insert(0);
            let record = self
                .records
                .get(&tag)
                .and_then(|list| list.get(*index).or_else(|| list.first()));
            *index += 1;

            let Some(record) = record else {
                continue;
            };
            let mut attrs = element.attributes.borrow_mut();
            if let Some(style) = &record.style {
                attrs.insert("style", style.clone());
            }
            if let Some(class) = &record.class {
                attrs.insert("class", class.clone());
            }
            for (name, value) in &record.attrs {
                attrs.insert(name.as_str(), value.clone());
            }
        }

        serialize_body(&document)
    }
}

/// Serialize the children of `<body>` without the enclosing document shell
/// kuchiki adds on parse.
pub(crate) fn serialize_body(document: &NodeRef) -> String {
    let mut out = String::new();
    if let Ok(body) = document.select_first("body") {
        for child in body.as_node().children() {
            out.push_str(&child.to_string());
        }
    }
    out
}

fn collect_style_sheet(document: &NodeRef) -> String {
    let mut sheet = String::new();
    if let Ok(styles) = document.select("style") {
        for style in styles {
            let text = style.as_node().text_contents();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !sheet.is_empty() {
                sheet.push('\n');
            }
            sheet.push_str(trimmed);
        }
    }
    sheet
}
