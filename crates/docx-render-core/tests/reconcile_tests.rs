use docx_render_core::{
    assemble_document, reconcile, repair_markup, scan_html, scan_text, ReconcileOutcome, Strategy,
    StyleMap, FALLBACK_STYLE_SHEET, REPAIR_PASSES,
};
use pretty_assertions::assert_eq;
use rstest::*;

fn styled_document(body: &str, sheet: &str) -> String {
    format!("<html><head><style>{sheet}</style></head><body>{body}</body></html>")
}

#[fixture]
fn two_token_extractor() -> &'static str {
    "<div class=\"docx-content\"><p>Dear {{Client.Name}},</p><p>Ref {{Case.Ref}}</p></div>"
}

// Scenario A: the styled rendering already carries the tokens intact.
#[rstest]
fn styled_intact_is_returned_unchanged() {
    let extractor = "<div class=\"docx-content\"><p>{{Name}}</p></div>";
    let styled = styled_document("<p style='color:red'>{{Name}}</p>", "p{color:red}");

    let outcome = reconcile(extractor, &styled);

    assert_eq!(outcome.strategy, Strategy::StyledIntact);
    assert_eq!(outcome.token_count, 1);
    assert_eq!(outcome.html, "<p style=\"color:red\">{{Name}}</p>");
    assert_eq!(outcome.style_sheet, "p{color:red}");
}

// Scenario B: a token split across inline elements is merged back and the
// enclosing block keeps its own attributes.
#[rstest]
fn split_token_is_repaired_in_place() {
    let extractor = "<div class=\"docx-content\"><p>{{Name}}</p></div>";
    let styled = styled_document(
        "<p class=\"P1\">{{</span><span>Name</span><span>}}</p>",
        ".P1{font-weight:bold}",
    );

    let outcome = reconcile(extractor, &styled);

    assert_eq!(outcome.strategy, Strategy::StyledRepaired);
    assert_eq!(outcome.token_count, 1);
    assert_eq!(scan_html(&outcome.html), vec!["{{Name}}"]);
    assert!(outcome.html.contains("class=\"P1\""));
    assert_eq!(outcome.style_sheet, ".P1{font-weight:bold}");
}

// Scenario C: nothing recoverable on the styled side; the two-token
// extractor fragment comes back verbatim under the generated sheet.
#[rstest]
fn unrecoverable_styled_tree_falls_back_to_extractor(two_token_extractor: &str) {
    // The styled renderer produced an empty shell: no tokens, and no
    // elements to transplant styling from.
    let styled = "<html><head></head><body></body></html>";

    let outcome = reconcile(two_token_extractor, styled);

    assert_eq!(outcome.strategy, Strategy::ExtractorFallback);
    assert_eq!(outcome.token_count, 2);
    assert_eq!(outcome.html, two_token_extractor);
    assert_eq!(outcome.style_sheet, FALLBACK_STYLE_SHEET);
}

#[rstest]
fn transplant_injects_extractor_text_into_styled_attributes(two_token_extractor: &str) {
    // Tokens survive only partially on the styled side: one of two intact,
    // and the damage is not an inline split the repairer can merge (the
    // second field's text was replaced outright).
    let styled = styled_document(
        "<div><p class=\"P1\" style=\"color:red\">Dear {{Client.Name}},</p>\
         <p class=\"P2\" style=\"color:blue\">Ref lost</p></div>",
        ".P1{font-size:14pt}",
    );

    let outcome = reconcile(two_token_extractor, &styled);

    assert_eq!(outcome.strategy, Strategy::Transplanted);
    assert_eq!(outcome.token_count, 2);
    let tokens = scan_html(&outcome.html);
    assert_eq!(tokens, vec!["{{Client.Name}}", "{{Case.Ref}}"]);
    // Positional transplant: first extractor <p> gets the first styled <p>'s
    // attributes, second gets the second's.
    assert!(outcome.html.contains("color:red"));
    assert!(outcome.html.contains("color:blue"));
}

// Token-preservation invariant: N extractor tokens in, exactly N out, same text.
#[rstest]
#[case::intact("<p>{{A}}</p><p>{{B}}</p>")]
#[case::split("<p>{{</span><span>A</span><span>}}</p><p>{{B}}</p>")]
#[case::dropped("<p>no fields here</p>")]
fn token_count_is_never_lost(#[case] styled_body: &str) {
    let extractor = "<div><p>{{A}}</p><p>{{B}}</p></div>";
    let styled = styled_document(styled_body, "");

    let outcome = reconcile(extractor, &styled);

    assert_eq!(outcome.token_count, 2);
    assert_eq!(scan_html(&outcome.html), vec!["{{A}}", "{{B}}"]);
}

#[rstest]
fn zero_token_documents_never_fabricate_tokens() {
    let extractor = "<div><p>prose only</p></div>";
    let styled = styled_document("<p style=\"color:red\">prose only</p>", "");

    let outcome = reconcile(extractor, &styled);

    assert_eq!(outcome.token_count, 0);
    assert!(scan_html(&outcome.html).is_empty());
}

#[rstest]
fn repair_passes_are_individually_idempotent() {
    let samples = [
        "<p>{{A</span><span>B}}</p>",
        "<p>{{<span>A</span><span>B</span>}}</p>",
        "<p>{{</span><span>Name}}</p>",
        "<p>{{Na<br>me}}</p>",
        "<p>intact {{Token}} text</p>",
    ];
    for sample in samples {
        for (name, pass) in REPAIR_PASSES {
            let once = pass(sample);
            let twice = pass(&once);
            assert_eq!(once, twice, "pass '{name}' not idempotent on {sample}");
        }
    }
}

#[rstest]
fn style_matcher_copies_attributes_but_never_text() {
    let map = StyleMap::capture(&styled_document(
        "<p style=\"color:red\" align=\"center\">other words entirely</p>",
        "",
    ));
    let out = map.apply("<p>{{Exact}} text kept</p>");

    assert!(out.contains("style=\"color:red\""));
    assert!(out.contains("align=\"center\""));
    assert!(out.contains("{{Exact}} text kept"));
    assert!(!out.contains("other words"));
}

#[rstest]
fn assembled_document_keeps_the_reconciled_token_count(two_token_extractor: &str) {
    let styled = styled_document("<p>mangled</p>", "");
    let outcome: ReconcileOutcome = reconcile(two_token_extractor, &styled);
    let document = assemble_document(&outcome.html, &outcome.style_sheet);

    assert_eq!(scan_html(&document).len(), outcome.token_count);
    assert!(document.starts_with("<!DOCTYPE html>"));
}

#[rstest]
fn repair_then_scan_agrees_with_plain_scan() {
    let styled = "<p>{{First</span><span>Name}}</p>";
    let repaired = repair_markup(styled);
    assert_eq!(scan_html(&repaired), scan_text("{{FirstName}}"));
}
