//! Reconciliation of the two renderings into one output.
//!
//! State machine, first success is terminal:
//! 1. CheckStyledIntact: the styled rendering already carries every token
//!    the extractor found.
//! 2. RepairStyled: textual repair of split tokens recovers them all.
//! 3. TransplantExtractor: extractor text (token-faithful) takes the styled
//!    tree's visual attributes.
//! 4. FallbackExtractor: the extractor fragment verbatim under a minimal
//!    generated sheet. Always succeeds.
//!
//! Control flow depends only on token counts. The trace record is emitted
//! through logs for diagnosis and never feeds back into decisions.

use serde::Serialize;
use tracing::debug;

use crate::repair::repair_markup;
use crate::stylemap::StyleMap;
use crate::tokens::scan_html;

/// Sheet used when falling back to the extractor fragment. The styled
/// renderer's sheet targets a tree with different structure and class
/// names, so a neutral document sheet is generated instead.
pub const FALLBACK_STYLE_SHEET: &str = "\
body { font-family: 'Helvetica Neue', Arial, sans-serif; font-size: 12pt; line-height: 1.4; }
h1 { font-size: 20pt; } h2 { font-size: 16pt; } h3 { font-size: 14pt; }
table { border-collapse: collapse; width: 100%; }
td { border: 1px solid #999; padding: 4px 8px; vertical-align: top; }";

/// Which state produced the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    StyledIntact,
    StyledRepaired,
    Transplanted,
    ExtractorFallback,
}

/// Per-request diagnostic record. Logged, never consulted.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileTrace {
    pub extractor_tokens: usize,
    pub styled_tokens: usize,
    pub repaired_tokens: Option<usize>,
    pub transplanted_tokens: Option<usize>,
    pub strategy: Strategy,
}

/// The reconciled fragment plus the sheet it should ship with.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub html: String,
    pub style_sheet: String,
    pub token_count: usize,
    pub strategy: Strategy,
    pub trace: ReconcileTrace,
}

/// Produce one HTML fragment with both correct merge fields and the best
/// styling the inputs allow.
///
/// `extractor_fragment` is the token-faithful rendering; `styled_document`
/// is the styled renderer's full output document. States 1-3 succeed only
/// when their token list equals the extractor's: a looser "any tokens at
/// all" predicate could terminate on a styled tree that silently dropped
/// fields the extractor preserved.
pub fn reconcile(extractor_fragment: &str, styled_document: &str) -> ReconcileOutcome {
    let extractor_tokens = scan_html(extractor_fragment);
    let styled_tokens = scan_html(styled_document);
    let styled = StyleMap::capture(styled_document);

    // No placeholders in the source document: styling fidelity is the only
    // goal and the styled rendering is used directly.
    if extractor_tokens.is_empty() {
        debug!(styled_tokens = styled_tokens.len(), "no extractor tokens, using styled output");
        let trace = ReconcileTrace {
            extractor_tokens: 0,
            styled_tokens: styled_tokens.len(),
            repaired_tokens: None,
            transplanted_tokens: None,
            strategy: Strategy::StyledIntact,
        };
        return ReconcileOutcome {
            html: styled.body_fragment.clone(),
            style_sheet: styled.style_sheet.clone(),
            token_count: styled_tokens.len(),
            strategy: Strategy::StyledIntact,
            trace,
        };
    }

    // 1. CheckStyledIntact
    if styled_tokens == extractor_tokens {
        debug!(tokens = extractor_tokens.len(), "styled rendering intact");
        let trace = ReconcileTrace {
            extractor_tokens: extractor_tokens.len(),
            styled_tokens: styled_tokens.len(),
            repaired_tokens: None,
            transplanted_tokens: None,
            strategy: Strategy::StyledIntact,
        };
        return ReconcileOutcome {
            html: styled.body_fragment.clone(),
            style_sheet: styled.style_sheet.clone(),
            token_count: styled_tokens.len(),
            strategy: Strategy::StyledIntact,
            trace,
        };
    }

    // 2. RepairStyled
    let repaired = repair_markup(styled_document);
    let repaired_tokens = scan_html(&repaired);
    if repaired_tokens == extractor_tokens {
        debug!(tokens = repaired_tokens.len(), "split tokens repaired in styled rendering");
        let repaired_body = StyleMap::capture(&repaired).body_fragment;
        let trace = ReconcileTrace {
            extractor_tokens: extractor_tokens.len(),
            styled_tokens: styled_tokens.len(),
            repaired_tokens: Some(repaired_tokens.len()),
            transplanted_tokens: None,
            strategy: Strategy::StyledRepaired,
        };
        return ReconcileOutcome {
            html: repaired_body,
            style_sheet: styled.style_sheet.clone(),
            token_count: repaired_tokens.len(),
            strategy: Strategy::StyledRepaired,
            trace,
        };
    }

    // 3. TransplantExtractor. A styled tree that yielded nothing to capture
    // has no styling to transplant; the verbatim fallback is strictly better
    // than reserializing the extractor tree for no gain.
    let mut transplanted_tokens = None;
    if !styled.is_empty() {
        let transplanted = styled.apply(extractor_fragment);
        let found = scan_html(&transplanted);
        if found == extractor_tokens {
            debug!(tokens = found.len(), "extractor content transplanted into styled structure");
            let trace = ReconcileTrace {
                extractor_tokens: extractor_tokens.len(),
                styled_tokens: styled_tokens.len(),
                repaired_tokens: Some(repaired_tokens.len()),
                transplanted_tokens: Some(found.len()),
                strategy: Strategy::Transplanted,
            };
            return ReconcileOutcome {
                html: transplanted,
                style_sheet: styled.style_sheet.clone(),
                token_count: found.len(),
                strategy: Strategy::Transplanted,
                trace,
            };
        }
        transplanted_tokens = Some(found.len());
    }

    // 4. FallbackExtractor
    debug!(
        tokens = extractor_tokens.len(),
        "styled rendering unrecoverable, falling back to extractor fragment"
    );
    let trace = ReconcileTrace {
        extractor_tokens: extractor_tokens.len(),
        styled_tokens: styled_tokens.len(),
        repaired_tokens: Some(repaired_tokens.len()),
        transplanted_tokens,
        strategy: Strategy::ExtractorFallback,
    };
    ReconcileOutcome {
        html: extractor_fragment.to_string(),
        style_sheet: FALLBACK_STYLE_SHEET.to_string(),
        token_count: extractor_tokens.len(),
        strategy: Strategy::ExtractorFallback,
        trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intact_styled_rendering_wins() {
        let extractor = "<div class=\"docx-content\"><p>{{Name}}</p></div>";
        let styled = "<html><head><style>p{color:red}</style></head>\
                      <body><p style=\"color:red\">{{Name}}</p></body></html>";
        let outcome = reconcile(extractor, styled);
        assert_eq!(outcome.strategy, Strategy::StyledIntact);
        assert_eq!(outcome.token_count, 1);
        assert_eq!(outcome.html, "<p style=\"color:red\">{{Name}}</p>");
        assert_eq!(outcome.style_sheet, "p{color:red}");
    }

    #[test]
    fn zero_extractor_tokens_uses_styled_directly() {
        let extractor = "<div class=\"docx-content\"><p>plain prose</p></div>";
        let styled = "<html><body><p style=\"color:red\">styled prose</p></body></html>";
        let outcome = reconcile(extractor, styled);
        assert_eq!(outcome.strategy, Strategy::StyledIntact);
        assert_eq!(outcome.token_count, 0);
        assert!(outcome.html.contains("styled prose"));
    }

    #[test]
    fn trace_matches_terminal_state() {
        let extractor = "<div><p>{{A}}</p></div>";
        let styled = "<html><body><p>{{A}}</p></body></html>";
        let outcome = reconcile(extractor, styled);
        assert_eq!(outcome.trace.strategy, outcome.strategy);
        assert_eq!(outcome.trace.extractor_tokens, 1);
        assert!(outcome.trace.repaired_tokens.is_none());
    }
}
