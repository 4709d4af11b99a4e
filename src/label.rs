//! Label configuration: category map, id2label table, score threshold.
//!
//! The model this tooling reviews ships without human-readable label names,
//! so two external tables drive interpretation:
//!
//! - the CATEGORY MAP collapses raw codes to reviewable categories
//!   (`LABEL_1`/`LABEL_2` are person begin/inside, both map to PER);
//! - the ID2LABEL table recovers the per-token BIO label from the numeric
//!   part of the raw code.
//!
//! The two tables fail differently on purpose: a category-map miss means
//! "not a category we review" and the span is silently dropped, while an
//! id2label miss means the configuration does not match the model and the
//! whole reconciliation aborts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::Category;
use crate::error::{Error, Result};

/// Minimum score an entity span needs to survive filtering.
///
/// Spans scoring exactly at the threshold are kept.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.55;

/// External label tables plus the score threshold.
///
/// `Default` carries the production setup for the Ukrainian media model;
/// `with_*` builders adjust individual pieces for other checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    category_map: HashMap<String, Category>,
    id2label: HashMap<u32, String>,
    threshold: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        let mut category_map = HashMap::new();
        for code in ["LABEL_1", "LABEL_2"] {
            category_map.insert(code.to_string(), Category::Person);
        }
        for code in ["LABEL_3", "LABEL_4"] {
            category_map.insert(code.to_string(), Category::Organization);
        }
        for code in ["LABEL_5", "LABEL_6"] {
            category_map.insert(code.to_string(), Category::Location);
        }

        let id2label = [
            (0, "O"),
            (1, "B-PER"),
            (2, "I-PER"),
            (3, "B-ORG"),
            (4, "I-ORG"),
            (5, "B-LOC"),
            (6, "I-LOC"),
        ]
        .into_iter()
        .map(|(id, label)| (id, label.to_string()))
        .collect();

        Self {
            category_map,
            id2label,
            threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl LabelConfig {
    /// Create a config from explicit tables.
    #[must_use]
    pub fn new(
        category_map: HashMap<String, Category>,
        id2label: HashMap<u32, String>,
        threshold: f64,
    ) -> Self {
        Self {
            category_map,
            id2label,
            threshold,
        }
    }

    /// Replace the score threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Add or replace one category-map entry.
    #[must_use]
    pub fn with_category(mut self, raw_code: impl Into<String>, category: Category) -> Self {
        self.category_map.insert(raw_code.into(), category);
        self
    }

    /// Add or replace one id2label entry.
    #[must_use]
    pub fn with_label(mut self, id: u32, label: impl Into<String>) -> Self {
        self.id2label.insert(id, label.into());
        self
    }

    /// Remove one id2label entry. Mostly useful for exercising the fatal
    /// lookup path against a known-good text.
    #[must_use]
    pub fn without_label(mut self, id: u32) -> Self {
        self.id2label.remove(&id);
        self
    }

    /// The score threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve a raw category code to a reviewable category.
    ///
    /// `None` for unmapped codes; never an error.
    #[must_use]
    pub fn category_of(&self, raw_code: &str) -> Option<Category> {
        self.category_map.get(raw_code).copied()
    }

    /// Resolve a raw category code to its per-token BIO label.
    ///
    /// Parses the numeric id out of the code (a `LABEL_` prefix is stripped,
    /// bare digits are accepted) and looks it up in id2label. Both a
    /// non-numeric code and a missing table entry are fatal
    /// [`Error::LabelLookup`] failures.
    pub fn raw_label_of(&self, raw_code: &str) -> Result<&str> {
        let id = Self::numeric_id(raw_code).ok_or_else(|| {
            Error::label_lookup(format!("category code '{raw_code}' carries no numeric id"))
        })?;
        self.id2label
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::label_lookup(format!(
                    "id2label has no entry for id {id} (category code '{raw_code}')"
                ))
            })
    }

    /// Extract the numeric id from a raw category code.
    #[must_use]
    pub fn numeric_id(raw_code: &str) -> Option<u32> {
        raw_code
            .strip_prefix("LABEL_")
            .unwrap_or(raw_code)
            .trim()
            .parse()
            .ok()
    }

    /// Category-map entries, sorted by raw code. For display.
    #[must_use]
    pub fn category_entries(&self) -> Vec<(&str, Category)> {
        let mut entries: Vec<_> = self
            .category_map
            .iter()
            .map(|(code, cat)| (code.as_str(), *cat))
            .collect();
        entries.sort();
        entries
    }

    /// id2label entries, sorted by id. For display.
    #[must_use]
    pub fn label_entries(&self) -> Vec<(u32, &str)> {
        let mut entries: Vec<_> = self
            .id2label
            .iter()
            .map(|(id, label)| (*id, label.as_str()))
            .collect();
        entries.sort();
        entries
    }
}
