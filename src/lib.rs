//! # rozmitka
//!
//! Review toolkit for token-classification output over Ukrainian media text.
//!
//! A fine-tuned NER model hands back raw spans with `LABEL_n` codes,
//! character offsets, and confidence scores. This crate turns that output
//! into something a human reviewer can work with:
//!
//! - **Filtering**: category mapping, confidence threshold, bounds checks
//! - **Overlap resolution**: one winner per overlapping region, by policy
//! - **BIO labeling**: whitespace tokens reconciled against entity spans
//! - **Highlighting**: inline HTML with per-category colors
//! - **Summary**: deduplicated surface forms grouped by category
//! - **Export**: `word,label` CSV for annotation handoff
//!
//! ## Quick Start
//!
//! ```rust
//! use rozmitka::{Analyzer, EntitySpan, MockExtractor};
//!
//! let extractor = MockExtractor::new("demo").with_spans(vec![
//!     EntitySpan::new("LABEL_1", 0, 14, 0.99, "Олена Шевченко"),
//!     EntitySpan::new("LABEL_5", 27, 34, 0.97, "Харкові"),
//! ]);
//!
//! let review = Analyzer::new(extractor)
//!     .analyze("Олена Шевченко виступила у Харкові")
//!     .unwrap();
//!
//! let labels: Vec<String> = review.tokens.iter().map(|t| t.tag.label()).collect();
//! assert_eq!(labels, ["B-PER", "I-PER", "O", "O", "B-LOC"]);
//! ```
//!
//! ## Label Scheme
//!
//! The default [`LabelConfig`] mirrors the seven-code scheme of the
//! underlying model:
//!
//! | Code | BIO label | Category |
//! |------|-----------|----------|
//! | `LABEL_0` | `O` | — |
//! | `LABEL_1` / `LABEL_2` | `B-PER` / `I-PER` | Person |
//! | `LABEL_3` / `LABEL_4` | `B-ORG` / `I-ORG` | Organization |
//! | `LABEL_5` / `LABEL_6` | `B-LOC` / `I-LOC` | Location |
//!
//! Both tables are configurable; a span whose code maps to no category is
//! silently dropped at the filter stage, while a code the id2label table
//! cannot resolve during labeling is a hard error.
//!
//! ## Ingesting Recorded Model Output
//!
//! [`EntitySpan`] deserializes the JSON shape of a Hugging Face
//! `token-classification` pipeline directly (`entity_group` and `word` are
//! accepted as aliases for `label` and `text`), so a recorded run can be
//! replayed through [`MockExtractor`] without any massaging:
//!
//! ```rust
//! use rozmitka::EntitySpan;
//!
//! let spans: Vec<EntitySpan> = serde_json::from_str(
//!     r#"[{"entity_group": "LABEL_5", "score": 0.98, "word": "Київ", "start": 0, "end": 4}]"#,
//! ).unwrap();
//! assert_eq!(spans[0].label, "LABEL_5");
//! assert_eq!(spans[0].text, "Київ");
//! ```
//!
//! ## Design Philosophy
//!
//! - **Offsets are characters**: model output counts chars, not bytes, so
//!   Cyrillic text never lands mid-codepoint
//! - **Inference stays outside**: anything that produces spans plugs in
//!   through the [`Extractor`] trait
//! - **Byte-for-byte highlighting**: concatenating highlight segments
//!   reproduces the input text exactly; no escaping inside the text flow
//! - **No partial credit**: a token is labeled only when a span fully
//!   contains it

#![warn(missing_docs)]

pub mod bio;
mod entity;
mod error;
pub mod export;
pub mod filter;
pub mod highlight;
mod label;
pub mod offset;
mod review;
pub mod summary;
mod token;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use rozmitka::prelude::*;
    //!
    //! let review = Analyzer::new(MockExtractor::new("demo"))
    //!     .analyze("Текст без жодної сутності")
    //!     .unwrap();
    //! assert!(review.is_empty());
    //! ```
    pub use crate::bio::{reconcile, validate, BioTag, LabeledToken, TagPolicy};
    pub use crate::entity::{Category, EntitySpan};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{filter_spans, resolve_overlaps, OverlapPolicy};
    pub use crate::label::{LabelConfig, DEFAULT_SCORE_THRESHOLD};
    pub use crate::review::{Analyzer, Extractor, MockExtractor, Review};
    pub use crate::summary::{summarize, Summary};
    pub use crate::token::{tokenize, Token};
}

// Re-exports
pub use bio::{reconcile, validate, BioTag, LabeledToken, TagPolicy};
pub use entity::{Category, EntitySpan};
pub use error::{Error, Result};
pub use export::{
    to_csv_string, write_csv, write_csv_file, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME,
};
pub use filter::{filter_spans, resolve_overlaps, OverlapPolicy};
pub use highlight::{highlight, highlight_segments, Segment, FALLBACK_COLOR};
pub use label::{LabelConfig, DEFAULT_SCORE_THRESHOLD};
pub use offset::{slice_chars, CharMap};
pub use review::{Analyzer, Extractor, MockExtractor, Review};
pub use summary::{clean_surface, summarize, Summary, EMPTY_GROUP};
pub use token::{tokenize, Token};
