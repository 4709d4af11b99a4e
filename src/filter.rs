//! Entity filtering and overlap resolution.
//!
//! Filtering is the only gate between raw model output and everything
//! downstream (highlighting, reconciliation, summary). Three per-span
//! checks, each independent of the others:
//!
//! 1. the raw code must be in the category map (silent drop otherwise —
//!    the model emits codes this workflow does not review);
//! 2. the score must reach the threshold (silent drop);
//! 3. the offsets must be valid for the analyzed text (drop with a
//!    warning — a malformed span is worth a log line, but never aborts
//!    the pipeline).
//!
//! Overlap resolution is separate and explicit: raw pipelines occasionally
//! emit overlapping spans, and the renderer needs disjoint input. The
//! policy decides who wins; nothing panics regardless of how tangled the
//! input is.

use log::{debug, warn};

use crate::entity::EntitySpan;
use crate::label::LabelConfig;

/// Keep the spans worth reviewing.
///
/// Pure and order-preserving: the input is untouched, surviving spans come
/// back in their original order, and running the filter over its own output
/// changes nothing.
#[must_use]
pub fn filter_spans(text: &str, spans: &[EntitySpan], config: &LabelConfig) -> Vec<EntitySpan> {
    let char_len = text.chars().count();
    let mut kept = Vec::new();

    for span in spans {
        if config.category_of(&span.label).is_none() {
            continue;
        }
        if span.score < config.threshold() {
            continue;
        }
        if !span.in_bounds(char_len) {
            warn!(
                "skipping span '{}' ({}): offsets [{}, {}) invalid for text of {} chars",
                span.text, span.label, span.start, span.end, char_len
            );
            continue;
        }
        kept.push(span.clone());
    }

    debug!("filter kept {} of {} spans", kept.len(), spans.len());
    kept
}

/// Precedence rule for overlapping spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Higher score wins; ties go to the span seen first.
    #[default]
    HighestScore,

    /// First span in input order wins. Simple and predictable.
    KeepFirst,

    /// Wider span wins ("Нова пошта" over "пошта"); equal widths fall back
    /// to the higher score.
    LongestSpan,
}

impl OverlapPolicy {
    /// Resolve a conflict between an accepted span and a newcomer.
    fn resolve(&self, existing: &EntitySpan, candidate: &EntitySpan) -> Resolution {
        match self {
            OverlapPolicy::HighestScore => {
                if candidate.score > existing.score {
                    Resolution::Replace
                } else {
                    Resolution::KeepExisting
                }
            }

            OverlapPolicy::KeepFirst => Resolution::KeepExisting,

            OverlapPolicy::LongestSpan => {
                if candidate.len() > existing.len()
                    || (candidate.len() == existing.len() && candidate.score > existing.score)
                {
                    Resolution::Replace
                } else {
                    Resolution::KeepExisting
                }
            }
        }
    }
}

#[derive(Debug)]
enum Resolution {
    KeepExisting,
    Replace,
}

/// Reduce spans to a pairwise-disjoint set under the given policy.
///
/// A candidate overlapping several accepted spans is admitted only when it
/// beats every one of them; the losers are all evicted. Output is sorted by
/// `(start, end)`.
#[must_use]
pub fn resolve_overlaps(spans: Vec<EntitySpan>, policy: OverlapPolicy) -> Vec<EntitySpan> {
    let mut accepted: Vec<EntitySpan> = Vec::new();

    for candidate in spans {
        let overlapping: Vec<usize> = accepted
            .iter()
            .enumerate()
            .filter(|(_, e)| candidate.overlaps(e))
            .map(|(idx, _)| idx)
            .collect();

        if overlapping.is_empty() {
            accepted.push(candidate);
            continue;
        }

        let candidate_wins = overlapping
            .iter()
            .all(|&idx| matches!(policy.resolve(&accepted[idx], &candidate), Resolution::Replace));

        if candidate_wins {
            for &idx in overlapping.iter().rev() {
                accepted.remove(idx);
            }
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|e| (e.start, e.end));
    accepted
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_spans() -> impl Strategy<Value = Vec<EntitySpan>> {
        proptest::collection::vec(
            (0u32..8, 0usize..40, 1usize..12, 0.0f64..1.0),
            0..12,
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
        fn filter_is_idempotent(spans in arb_spans()) {
            let text = "а".repeat(60);
            let config = LabelConfig::default();
            let once = filter_spans(&text, &spans, &config);
            let twice = filter_spans(&text, &once, &config);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn filtered_spans_satisfy_every_gate(spans in arb_spans()) {
            let text = "б".repeat(60);
            let config = LabelConfig::default();
            for span in filter_spans(&text, &spans, &config) {
                prop_assert!(config.category_of(&span.label).is_some());
                prop_assert!(span.score >= config.threshold());
                prop_assert!(span.in_bounds(60));
            }
        }

        #[test]
        fn resolved_spans_are_disjoint_and_sorted(spans in arb_spans()) {
            for policy in [
                OverlapPolicy::HighestScore,
                OverlapPolicy::KeepFirst,
                OverlapPolicy::LongestSpan,
            ] {
                let resolved = resolve_overlaps(spans.clone(), policy);
                for pair in resolved.windows(2) {
                    prop_assert!(pair[0].start <= pair[1].start);
                    prop_assert!(!pair[0].overlaps(&pair[1]));
                }
            }
        }

        #[test]
        fn resolution_never_invents_spans(spans in arb_spans()) {
            let resolved = resolve_overlaps(spans.clone(), OverlapPolicy::default());
            for kept in &resolved {
                prop_assert!(spans.iter().any(|s| s == kept));
            }
        }
    }
}
