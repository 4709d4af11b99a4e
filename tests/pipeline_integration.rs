//! Integration tests for the full review pipeline.
//!
//! Drives recorded model output through the analyzer end-to-end and checks
//! every view of the result: BIO tokens, inline highlighting, the category
//! summary, and the CSV export.

use rozmitka::{
    Analyzer, BioTag, Category, EntitySpan, Error, LabelConfig, MockExtractor, OverlapPolicy,
    Review, TagPolicy,
};

// "Президент Володимир Зеленський відвідав Київ" - character offsets:
// "Президент"  = chars 0..9
// "Володимир"  = chars 10..19
// "Зеленський" = chars 20..30
// "відвідав"   = chars 31..39
// "Київ"       = chars 40..44
const TEXT: &str = "Президент Володимир Зеленський відвідав Київ";

fn person_span() -> EntitySpan {
    EntitySpan::new("LABEL_1", 10, 30, 0.99, "Володимир Зеленський")
}

fn location_span() -> EntitySpan {
    EntitySpan::new("LABEL_5", 40, 44, 0.97, "Київ")
}

fn analyze(spans: Vec<EntitySpan>) -> Review {
    Analyzer::new(MockExtractor::new("recorded").with_spans(spans))
        .analyze(TEXT)
        .expect("analysis should succeed")
}

fn labels(review: &Review) -> Vec<String> {
    review.tokens.iter().map(|t| t.tag.label()).collect()
}

// =============================================================================
// Core Pipeline
// =============================================================================

#[test]
fn test_pipeline_labels_highlight_and_summary() {
    let review = analyze(vec![person_span(), location_span()]);

    assert_eq!(labels(&review), ["O", "B-PER", "I-PER", "O", "B-LOC"]);

    let html = review.highlighted_html();
    let expected = "Президент \
         <span title=\"Score: 0.99\" style=\"background-color:#ffd8d8; \
         padding:2px 4px; border-radius:4px\">Володимир Зеленський</span> \
         відвідав \
         <span title=\"Score: 0.97\" style=\"background-color:#d8fdd8; \
         padding:2px 4px; border-radius:4px\">Київ</span>";
    assert_eq!(html, expected);

    assert_eq!(
        review.summary.lines(),
        ["PER: Володимир Зеленський", "ORG: –", "LOC: Київ"]
    );

    // Well-formed output never carries BIO diagnostics
    assert!(review.validation().is_empty());
}

#[test]
fn test_pipeline_csv_export() {
    let review = analyze(vec![person_span(), location_span()]);
    let csv = review.to_csv().expect("CSV rendering should succeed");

    assert_eq!(
        csv,
        "word,label\n\
         Президент,O\n\
         Володимир,B-PER\n\
         Зеленський,I-PER\n\
         відвідав,O\n\
         Київ,B-LOC\n"
    );
}

#[test]
fn test_pipeline_summary_cleans_punctuation_edges() {
    // "Компанія «Нафтогаз» оголосила тендер" - character offsets:
    // "Компанія"   = chars 0..8
    // "«Нафтогаз»" = chars 9..19
    // "оголосила"  = chars 20..29
    // "тендер"     = chars 30..36
    let text = "Компанія «Нафтогаз» оголосила тендер";
    let span = EntitySpan::new("LABEL_3", 9, 19, 0.88, "«Нафтогаз»");

    let review = Analyzer::new(MockExtractor::new("recorded").with_spans(vec![span]))
        .analyze(text)
        .expect("analysis should succeed");

    assert_eq!(labels(&review), ["O", "B-ORG", "O", "O"]);
    // Guillemets stay in the highlight but are stripped from the summary
    assert!(review
        .highlighted_html()
        .contains("border-radius:4px\">«Нафтогаз»</span>"));
    assert_eq!(review.summary.forms(Category::Organization), ["Нафтогаз"]);
    assert!(review.to_csv().unwrap().contains("«Нафтогаз»,B-ORG"));
}

// =============================================================================
// Threshold
// =============================================================================

#[test]
fn test_sub_threshold_span_dropped_everywhere() {
    let mut weak = person_span();
    weak.score = 0.40;
    let review = analyze(vec![weak]);

    assert!(review.is_empty());
    assert!(review.tokens.iter().all(|t| t.tag == BioTag::Outside));
    assert_eq!(review.highlighted_html(), TEXT);
    assert!(review.summary.forms(Category::Person).is_empty());
    assert_eq!(review.summary.lines(), ["PER: –", "ORG: –", "LOC: –"]);
}

#[test]
fn test_boundary_score_kept() {
    let mut boundary = person_span();
    boundary.score = 0.55;
    let review = analyze(vec![boundary]);

    assert_eq!(review.spans.len(), 1);
    assert_eq!(labels(&review), ["O", "B-PER", "I-PER", "O", "O"]);
}

#[test]
fn test_custom_threshold_applies() {
    let config = LabelConfig::default().with_threshold(0.995);
    let review = Analyzer::new(
        MockExtractor::new("recorded").with_spans(vec![person_span(), location_span()]),
    )
    .with_config(config)
    .analyze(TEXT)
    .expect("analysis should succeed");

    // 0.99 and 0.97 both fall below the raised bar
    assert!(review.is_empty());
}

// =============================================================================
// Label Table Misses
// =============================================================================

#[test]
fn test_unmapped_code_silently_dropped() {
    let stray = EntitySpan::new("LABEL_9", 10, 30, 0.99, "Володимир Зеленський");
    let review = analyze(vec![stray, location_span()]);

    // LABEL_9 maps to no category: gone without an error
    assert_eq!(review.spans.len(), 1);
    assert_eq!(labels(&review), ["O", "O", "O", "O", "B-LOC"]);
}

#[test]
fn test_id2label_miss_fails_reconciliation() {
    let config = LabelConfig::default().without_label(5);
    let err = Analyzer::new(MockExtractor::new("recorded").with_spans(vec![location_span()]))
        .with_config(config)
        .analyze(TEXT)
        .expect_err("missing id2label entry should fail the analysis");

    assert!(matches!(err, Error::LabelLookup(_)));
}

// =============================================================================
// Bad Offsets
// =============================================================================

#[test]
fn test_out_of_bounds_span_skipped_others_survive() {
    let ghost = EntitySpan::new("LABEL_5", 100, 110, 0.90, "привид");
    let review = analyze(vec![ghost, location_span()]);

    assert_eq!(review.spans.len(), 1);
    assert_eq!(review.spans[0].start, 40);
    assert!(review
        .highlighted_html()
        .contains("border-radius:4px\">Київ</span>"));
}

// =============================================================================
// Overlap Policies
// =============================================================================

// "Служба безпеки України затримала агента" - character offsets:
// "Служба"    = chars 0..6
// "безпеки"   = chars 7..14
// "України"   = chars 15..22
// "затримала" = chars 23..32
// "агента"    = chars 33..39
const OVERLAP_TEXT: &str = "Служба безпеки України затримала агента";

fn overlapping_spans() -> Vec<EntitySpan> {
    vec![
        EntitySpan::new("LABEL_3", 0, 22, 0.80, "Служба безпеки України"),
        EntitySpan::new("LABEL_5", 15, 22, 0.95, "України"),
    ]
}

fn analyze_overlap(policy: OverlapPolicy) -> Review {
    Analyzer::new(MockExtractor::new("recorded").with_spans(overlapping_spans()))
        .with_overlap_policy(policy)
        .analyze(OVERLAP_TEXT)
        .expect("analysis should succeed")
}

#[test]
fn test_overlap_highest_score_wins_by_default() {
    let review = analyze(vec![person_span(), location_span()]);
    assert_eq!(review.spans.len(), 2, "disjoint spans are untouched");

    let review = analyze_overlap(OverlapPolicy::HighestScore);
    assert_eq!(review.spans.len(), 1);
    assert_eq!(review.spans[0].label, "LABEL_5");
    assert_eq!(labels(&review), ["O", "O", "B-LOC", "O", "O"]);
}

#[test]
fn test_overlap_keep_first() {
    let review = analyze_overlap(OverlapPolicy::KeepFirst);
    assert_eq!(review.spans.len(), 1);
    assert_eq!(review.spans[0].label, "LABEL_3");
}

#[test]
fn test_overlap_longest_span() {
    let review = analyze_overlap(OverlapPolicy::LongestSpan);
    assert_eq!(review.spans.len(), 1);
    assert_eq!(review.spans[0].label, "LABEL_3");
    assert_eq!(labels(&review), ["B-ORG", "I-ORG", "I-ORG", "O", "O"]);
}

// =============================================================================
// Tag Policies
// =============================================================================

#[test]
fn test_verbatim_policy_surfaces_dangling_inside() {
    // A span whose code is an inside label: the raw view keeps the defect
    let inside_coded = EntitySpan::new("LABEL_2", 10, 30, 0.90, "Володимир Зеленський");

    let verbatim = Analyzer::new(
        MockExtractor::new("recorded").with_spans(vec![inside_coded.clone()]),
    )
    .with_tag_policy(TagPolicy::Verbatim)
    .analyze(TEXT)
    .expect("analysis should succeed");

    assert_eq!(labels(&verbatim), ["O", "I-PER", "I-PER", "O", "O"]);
    assert_eq!(verbatim.validation().len(), 1);

    let wellformed = Analyzer::new(
        MockExtractor::new("recorded").with_spans(vec![inside_coded]),
    )
    .analyze(TEXT)
    .expect("analysis should succeed");

    assert_eq!(labels(&wellformed), ["O", "B-PER", "I-PER", "O", "O"]);
    assert!(wellformed.validation().is_empty());
}

// =============================================================================
// Recorded JSON Replay
// =============================================================================

#[test]
fn test_replay_of_pipeline_json() {
    // "Олег Синєгубов повідомив про обстріл Харкова" - character offsets:
    // "Олег"      = chars 0..4
    // "Синєгубов" = chars 5..14
    // "Харкова"   = chars 37..44
    let text = "Олег Синєгубов повідомив про обстріл Харкова";
    let recorded = r#"[
        {"entity_group": "LABEL_1", "score": 0.995, "word": "Олег Синєгубов", "start": 0, "end": 14},
        {"entity_group": "LABEL_5", "score": 0.99, "word": "Харкова", "start": 37, "end": 44}
    ]"#;

    let spans: Vec<EntitySpan> =
        serde_json::from_str(recorded).expect("pipeline JSON should deserialize as-is");
    let review = Analyzer::new(MockExtractor::new("recorded").with_spans(spans))
        .analyze(text)
        .expect("analysis should succeed");

    assert_eq!(labels(&review), ["B-PER", "I-PER", "O", "O", "O", "B-LOC"]);
    assert_eq!(
        review.summary.forms(Category::Person),
        ["Олег Синєгубов"]
    );
    assert_eq!(review.summary.forms(Category::Location), ["Харкова"]);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_review_json_round_trip() {
    let review = analyze(vec![person_span(), location_span()]);
    let json = review.to_json().expect("JSON rendering should succeed");

    let restored: Review = serde_json::from_str(&json).expect("review JSON should round-trip");
    assert_eq!(restored.text, review.text);
    assert_eq!(restored.spans, review.spans);
    assert_eq!(restored.tokens, review.tokens);
    assert_eq!(restored.summary, review.summary);
}

#[test]
fn test_html_report_structure() {
    let review = analyze(vec![person_span(), location_span()]);
    let page = review.to_html();

    assert!(page.starts_with("<!DOCTYPE html>"));
    // Highlight block is embedded raw
    assert!(page.contains("border-radius:4px\">Володимир Зеленський</span>"));
    // Token table carries the BIO labels
    assert!(page.contains("B-LOC"));
    assert!(page.ends_with("</html>\n") || page.ends_with("</html>"));
}
