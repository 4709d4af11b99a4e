//! Entity span and category types.
//!
//! All offsets in this crate are CHARACTER offsets (half-open `[start, end)`)
//! into the analyzed text. Upstream pipelines report character positions and
//! Ukrainian text is multi-byte in UTF-8, so byte offsets are never exposed;
//! the `offset` module converts internally where slicing is needed.

use serde::{Deserialize, Serialize};

/// Reviewable entity category.
///
/// The three categories the review workflow cares about. Raw model codes map
/// onto these via [`LabelConfig::category_of`](crate::LabelConfig::category_of);
/// codes outside the mapping are dropped during filtering, so the enum has no
/// catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Person name (PER)
    Person,
    /// Organization name (ORG)
    Organization,
    /// Location/Place (LOC)
    Location,
}

impl Category {
    /// All categories in the fixed presentation order (PER, ORG, LOC).
    pub const ALL: [Category; 3] = [
        Category::Person,
        Category::Organization,
        Category::Location,
    ];

    /// Convert to the canonical label string.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Category::Person => "PER",
            Category::Organization => "ORG",
            Category::Location => "LOC",
        }
    }

    /// Parse from a canonical label string, with or without a BIO prefix.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "PER" | "PERSON" | "B-PER" | "I-PER" => Some(Category::Person),
            "ORG" | "ORGANIZATION" | "B-ORG" | "I-ORG" => Some(Category::Organization),
            "LOC" | "LOCATION" | "B-LOC" | "I-LOC" => Some(Category::Location),
            _ => None,
        }
    }

    /// Human-readable category name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Category::Person => "Person",
            Category::Organization => "Organization",
            Category::Location => "Location",
        }
    }

    /// Highlight background color for this category.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Category::Person => "#ffd8d8",
            Category::Organization => "#d8eafd",
            Category::Location => "#d8fdd8",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// One raw span as reported by an upstream NER model.
///
/// Deserializes both this crate's field names and the upstream pipeline
/// names (`entity_group` for the label, `word` for the snippet), so model
/// output JSON can be ingested without a shim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Raw category code (e.g. `"LABEL_3"`), untouched by this crate.
    #[serde(alias = "entity_group")]
    pub label: String,
    /// Start position (character offset in the analyzed text).
    pub start: usize,
    /// End position (character offset, exclusive).
    pub end: usize,
    /// Model confidence score (0.0-1.0).
    pub score: f64,
    /// Surface form as reported by the model.
    ///
    /// Informational only: rendering always slices the analyzed text by
    /// offsets rather than trusting this field.
    #[serde(alias = "word", default)]
    pub text: String,
}

impl EntitySpan {
    /// Create a new span. The score is clamped to `[0,1]`; offsets are not
    /// validated here (bounds are checked against the actual text at use
    /// sites, where a bad span can be skipped with a warning).
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        start: usize,
        end: usize,
        score: f64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            score: score.clamp(0.0, 1.0),
            text: text.into(),
        }
    }

    /// Span length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if this span overlaps another (half-open intervals).
    #[must_use]
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }

    /// True when the span fits inside a text of `char_len` characters.
    #[must_use]
    pub fn in_bounds(&self, char_len: usize) -> bool {
        self.start < self.end && self.end <= char_len
    }
}
