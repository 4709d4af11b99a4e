//! Grouped, deduplicated category summary.
//!
//! The third view of an analysis: one line per category listing the distinct
//! surface forms, in the order they first appear in the text. Surface forms
//! are cleaned at the edges only (stray punctuation the span dragged in),
//! interior characters are untouched so hyphenated and apostrophized
//! Ukrainian names survive intact.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entity::{Category, EntitySpan};
use crate::label::LabelConfig;
use crate::offset::slice_chars;

// Word characters plus the two apostrophes Ukrainian orthography uses;
// everything else is trimmed from both edges of a surface form.
static CLEAN_EDGES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\w’ʼА-Яа-яІіЇїЄєҐґA-Za-z0-9]+|[^\w’ʼА-Яа-яІіЇїЄєҐґA-Za-z0-9]+$")
        .expect("clean-edges regex is valid")
});

/// Placeholder shown for a category with no surface forms.
pub const EMPTY_GROUP: &str = "–";

/// Trim non-word characters from both edges of a surface form.
#[must_use]
pub fn clean_surface(word: &str) -> String {
    CLEAN_EDGES.replace_all(word, "").into_owned()
}

/// Per-category deduplicated surface forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    groups: BTreeMap<Category, Vec<String>>,
}

impl Summary {
    /// Surface forms for one category, first-seen order.
    #[must_use]
    pub fn forms(&self, category: Category) -> &[String] {
        self.groups.get(&category).map_or(&[], Vec::as_slice)
    }

    /// True when no category has any surface form.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// One display line per category, fixed PER, ORG, LOC order:
    /// `"PER: Володимир Зеленський"` or `"PER: –"` when empty.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        Category::ALL
            .iter()
            .map(|cat| {
                let forms = self.forms(*cat);
                if forms.is_empty() {
                    format!("{}: {EMPTY_GROUP}", cat.as_label())
                } else {
                    format!("{}: {}", cat.as_label(), forms.join(", "))
                }
            })
            .collect()
    }

    /// Iterate categories with their forms, fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.groups
            .iter()
            .map(|(cat, forms)| (*cat, forms.as_slice()))
    }
}

/// Group accepted spans by category and deduplicate their surface forms.
///
/// Spans are visited in text order (by start offset). The surface form is
/// the span's reported snippet, falling back to the offset slice of `text`
/// when the snippet is empty. Forms that clean down to nothing are dropped;
/// duplicates keep their first position. Unmapped codes contribute nothing.
#[must_use]
pub fn summarize(text: &str, spans: &[EntitySpan], config: &LabelConfig) -> Summary {
    let mut collected: Vec<(Category, usize, &EntitySpan)> = spans
        .iter()
        .filter_map(|span| {
            config
                .category_of(&span.label)
                .map(|cat| (cat, span.start, span))
        })
        .collect();
    collected.sort_by_key(|(_, start, _)| *start);

    let mut groups: BTreeMap<Category, Vec<String>> =
        Category::ALL.iter().map(|cat| (*cat, Vec::new())).collect();

    for (category, _, span) in collected {
        let surface = if span.text.is_empty() {
            slice_chars(text, span.start, span.end).unwrap_or_default()
        } else {
            span.text.as_str()
        };
        let cleaned = clean_surface(surface);
        if cleaned.is_empty() {
            continue;
        }
        let forms = groups.entry(category).or_default();
        if !forms.contains(&cleaned) {
            forms.push(cleaned);
        }
    }

    Summary { groups }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cleaning_is_idempotent(word in "[ а-яіїєґА-ЯІЇЄҐa-z0-9’ʼ().,«»!?-]{0,20}") {
            let once = clean_surface(&word);
            let twice = clean_surface(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn cleaned_form_never_longer(word in "[а-яА-Я().,«»]{0,20}") {
            prop_assert!(clean_surface(&word).chars().count() <= word.chars().count());
        }

        #[test]
        fn forms_are_unique_per_category(
            words in proptest::collection::vec("[а-я]{1,6}", 0..10),
        ) {
            let config = LabelConfig::default();
            let spans: Vec<EntitySpan> = words
                .iter()
                .enumerate()
                .map(|(i, w)| EntitySpan::new("LABEL_1", i * 10, i * 10 + 5, 0.9, w.clone()))
                .collect();
            let summary = summarize("", &spans, &config);
            let forms = summary.forms(Category::Person);
            let mut seen = std::collections::HashSet::new();
            for form in forms {
                prop_assert!(seen.insert(form.clone()));
            }
        }
    }
}
