//! Typed BIO tags and token-level label reconciliation.
//!
//! Reconciliation turns span-level model output into per-token training
//! labels: each whitespace token gets the label of the first span that fully
//! contains it, everything else is `O`. The model behind this workflow
//! reports span-level codes whose numeric part indexes an external id2label
//! table, so the per-token label is recovered by table lookup, not carried
//! on the span.
//!
//! Two tag policies exist because the upstream pipeline is sloppy about
//! prefixes. A span coded as "inside" stamps `I-` on every token it covers,
//! including the first one of the sentence; a span coded as "begin" stamps
//! `B-` on all of its tokens, splitting one mention into several. Training
//! data wants neither, so the default policy derives prefixes from span
//! structure instead. The verbatim policy reproduces the raw behavior for
//! byte-level comparison against older exports.
//!
//! # Example
//!
//! ```rust
//! use rozmitka::{reconcile, EntitySpan, LabelConfig, TagPolicy};
//!
//! let text = "Зустріч у Києві";
//! let spans = vec![EntitySpan::new("LABEL_5", 10, 15, 0.97, "Києві")];
//! let labeled = reconcile(text, &spans, &LabelConfig::default(), TagPolicy::WellFormed).unwrap();
//!
//! let tags: Vec<String> = labeled.iter().map(|t| t.tag.label()).collect();
//! assert_eq!(tags, ["O", "O", "B-LOC"]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{Category, EntitySpan};
use crate::error::{Error, Result};
use crate::label::LabelConfig;
use crate::token::tokenize;

// =============================================================================
// Tags
// =============================================================================

/// One BIO tag (IOB2 flavor: `B-` always opens an entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BioTag {
    /// Token is outside every entity.
    Outside,
    /// Token opens an entity of the given category.
    Begin(Category),
    /// Token continues the entity opened by a preceding `Begin`.
    Inside(Category),
}

impl BioTag {
    /// Render the tag as its label string (`"O"`, `"B-PER"`, `"I-LOC"`, ...).
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            BioTag::Outside => "O".to_string(),
            BioTag::Begin(cat) => format!("B-{}", cat.as_label()),
            BioTag::Inside(cat) => format!("I-{}", cat.as_label()),
        }
    }

    /// Parse a label string. Accepts `O`, `B-XXX`, `I-XXX` (case-insensitive
    /// prefix) for the reviewable categories; anything else is `None`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("o") {
            return Some(BioTag::Outside);
        }
        let prefix = label.get(0..2)?;
        let rest = label.get(2..)?;
        if prefix.eq_ignore_ascii_case("b-") {
            return Category::from_label(rest).map(BioTag::Begin);
        }
        if prefix.eq_ignore_ascii_case("i-") {
            return Category::from_label(rest).map(BioTag::Inside);
        }
        None
    }

    /// The tag's category, `None` for `Outside`.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        match self {
            BioTag::Outside => None,
            BioTag::Begin(cat) | BioTag::Inside(cat) => Some(*cat),
        }
    }

    /// True for `Inside`.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        matches!(self, BioTag::Inside(_))
    }
}

impl fmt::Display for BioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<BioTag> for String {
    fn from(tag: BioTag) -> String {
        tag.label()
    }
}

impl TryFrom<String> for BioTag {
    type Error = String;

    fn try_from(label: String) -> std::result::Result<Self, String> {
        BioTag::parse(&label).ok_or_else(|| format!("not a BIO label: '{label}'"))
    }
}

/// One token with its reconciled tag. The `(word, label)` row of the
/// CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledToken {
    /// Token text, exactly as tokenized.
    pub text: String,
    /// Reconciled tag.
    pub tag: BioTag,
}

impl LabeledToken {
    /// Create a labeled token.
    #[must_use]
    pub fn new(text: impl Into<String>, tag: BioTag) -> Self {
        Self {
            text: text.into(),
            tag,
        }
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// How to derive tag prefixes from raw span codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagPolicy {
    /// Derive `B-`/`I-` from span structure: the first token a span covers
    /// opens the entity, the rest continue it. Output always validates.
    #[default]
    WellFormed,

    /// Reproduce the upstream normalization exactly: a raw `B-` label is
    /// emitted on every covered token, a raw `I-` label is emitted even with
    /// no opening `B-` (the known dangling-`I` case), a bare category name
    /// is promoted to `B-`. For diffing against legacy exports.
    Verbatim,
}

/// Reconcile span-level model output into per-token BIO labels.
///
/// Tokenizes `text`, then tags each token from the FIRST span (input order)
/// that fully contains it. Partial overlap is not containment: a token
/// straddling a span boundary stays `O`. The span's raw code is resolved
/// through the id2label table; any code the table cannot resolve aborts the
/// whole call with [`Error::LabelLookup`].
///
/// Callers normally pass filtered spans, but nothing here assumes it:
/// unfiltered spans just mean the lookup can fail on codes filtering would
/// have dropped.
pub fn reconcile(
    text: &str,
    spans: &[EntitySpan],
    config: &LabelConfig,
    policy: TagPolicy,
) -> Result<Vec<LabeledToken>> {
    let tokens = tokenize(text);
    let mut labeled = Vec::with_capacity(tokens.len());
    // Index of the span that tagged the previous token. Distinguishes "next
    // token of the same mention" from "first token of an adjacent mention".
    let mut prev_owner: Option<usize> = None;

    for token in tokens {
        let owner = spans.iter().position(|span| token.within(span));

        let tag = match owner {
            None => {
                prev_owner = None;
                BioTag::Outside
            }
            Some(idx) => {
                let span = &spans[idx];
                let raw = config.raw_label_of(&span.label)?;

                let tag = if raw.eq_ignore_ascii_case("o") {
                    BioTag::Outside
                } else {
                    let category = Category::from_label(raw).ok_or_else(|| {
                        Error::label_lookup(format!(
                            "label '{raw}' (code '{}') names no reviewable category",
                            span.label
                        ))
                    })?;
                    match policy {
                        TagPolicy::Verbatim => {
                            if raw
                                .get(0..2)
                                .is_some_and(|p| p.eq_ignore_ascii_case("i-"))
                            {
                                BioTag::Inside(category)
                            } else {
                                // Raw B- stays B-; a bare name is promoted.
                                BioTag::Begin(category)
                            }
                        }
                        TagPolicy::WellFormed => {
                            if prev_owner == Some(idx) {
                                BioTag::Inside(category)
                            } else {
                                BioTag::Begin(category)
                            }
                        }
                    }
                };

                prev_owner = if tag == BioTag::Outside { None } else { Some(idx) };
                tag
            }
        };

        labeled.push(LabeledToken::new(token.text, tag));
    }

    Ok(labeled)
}

// =============================================================================
// Validation
// =============================================================================

/// Check a tag sequence for BIO violations.
///
/// Returns one diagnostic per violation: an `Inside` with no opening tag, or
/// an `Inside` whose category differs from the run it continues. Empty means
/// the sequence is well-formed.
#[must_use]
pub fn validate(tags: &[BioTag]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut prev = BioTag::Outside;

    for (i, tag) in tags.iter().enumerate() {
        if let BioTag::Inside(cat) = tag {
            match prev.category() {
                None => {
                    errors.push(format!(
                        "position {i}: I-{} follows O (should be B-{})",
                        cat.as_label(),
                        cat.as_label()
                    ));
                }
                Some(prev_cat) if prev_cat != *cat => {
                    errors.push(format!(
                        "position {i}: I-{} follows {} (category switch)",
                        cat.as_label(),
                        prev.label()
                    ));
                }
                Some(_) => {}
            }
        }
        prev = *tag;
    }

    errors
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::token::tokenize;
    use proptest::prelude::*;

    fn arb_known_spans() -> impl Strategy<Value = Vec<EntitySpan>> {
        proptest::collection::vec(
            (0u32..7, 0usize..30, 1usize..10, 0.0f64..1.0),
            0..8,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .map(|(id, start, len, score)| {
                    EntitySpan::new(format!("LABEL_{id}"), start, start + len, score, "")
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn output_length_equals_token_count(
            text in "[ а-яіїєґА-ЯІЇЄҐ.,]{0,40}",
            spans in arb_known_spans(),
        ) {
            let config = LabelConfig::default();
            for policy in [TagPolicy::WellFormed, TagPolicy::Verbatim] {
                let labeled = reconcile(&text, &spans, &config, policy).unwrap();
                prop_assert_eq!(labeled.len(), tokenize(&text).len());
            }
        }

        #[test]
        fn wellformed_always_validates(
            text in "[ а-яіїєґА-ЯІЇЄҐ]{0,40}",
            spans in arb_known_spans(),
        ) {
            let config = LabelConfig::default();
            let labeled = reconcile(&text, &spans, &config, TagPolicy::WellFormed).unwrap();
            let tags: Vec<BioTag> = labeled.iter().map(|t| t.tag).collect();
            prop_assert!(validate(&tags).is_empty());
        }

        #[test]
        fn uncovered_tokens_stay_outside(text in "[ а-яa-z]{0,40}") {
            let config = LabelConfig::default();
            let labeled = reconcile(&text, &[], &config, TagPolicy::WellFormed).unwrap();
            prop_assert!(labeled.iter().all(|t| t.tag == BioTag::Outside));
        }

        #[test]
        fn tag_parse_display_roundtrip(id in 0usize..7) {
            let tag = match id {
                0 => BioTag::Outside,
                1 => BioTag::Begin(Category::Person),
                2 => BioTag::Inside(Category::Person),
                3 => BioTag::Begin(Category::Organization),
                4 => BioTag::Inside(Category::Organization),
                5 => BioTag::Begin(Category::Location),
                _ => BioTag::Inside(Category::Location),
            };
            prop_assert_eq!(BioTag::parse(&tag.to_string()), Some(tag));
        }
    }
}
