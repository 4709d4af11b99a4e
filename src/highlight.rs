//! Offset-safe inline highlighting.
//!
//! The annotated rendition is built as an append-only segment list: walk the
//! spans in start order with a cursor, copy the untouched text between
//! entities, and wrap each entity slice in its fragment. Nothing is ever
//! spliced into a partially built string, so one bad span cannot shift the
//! offsets of the spans after it.
//!
//! Two guarantees drive everything here:
//!
//! - text outside fragments is byte-for-byte identical to the input;
//! - the text inside a fragment is the literal substring covered by the
//!   span's offsets (the span's own `text` field is never trusted).
//!
//! Consequently NOTHING is HTML-escaped. The output is a review artifact
//! whose fidelity to the input is the whole point; embedding layers that
//! need escaping apply it to their own portions.

use serde::{Deserialize, Serialize};

use crate::entity::{Category, EntitySpan};
use crate::label::LabelConfig;
use crate::offset::CharMap;

/// Background color for a span whose code maps to no reviewable category.
///
/// Filtered input never hits this; it only shows up when a caller renders
/// raw spans directly.
pub const FALLBACK_COLOR: &str = "#eeeeee";

/// One piece of the annotated rendition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// Literal input text between entities, untouched.
    Text(String),
    /// One highlighted entity.
    Entity {
        /// The literal substring covered by the span's offsets.
        text: String,
        /// Resolved category, `None` for unmapped codes.
        category: Option<Category>,
        /// Model score, carried into the fragment title.
        score: f64,
    },
}

impl Segment {
    /// The literal text of this segment.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Segment::Text(text) | Segment::Entity { text, .. } => text,
        }
    }
}

/// Build the segment list for `text` with the given spans.
///
/// Spans are processed in ascending start order (ties: wider span first). A
/// span starting before the cursor is skipped, so overlapping input degrades
/// to fewer highlights instead of corrupt output; run
/// [`resolve_overlaps`](crate::filter::resolve_overlaps) first to make the
/// precedence explicit. Offsets past the end of the text are clamped.
#[must_use]
pub fn highlight_segments(
    text: &str,
    spans: &[EntitySpan],
    config: &LabelConfig,
) -> Vec<Segment> {
    let map = CharMap::new(text);
    let char_len = map.char_len();

    let mut ordered: Vec<&EntitySpan> = spans.iter().collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    let mut segments = Vec::new();
    let mut cursor = 0usize;

    for span in ordered {
        let start = span.start.min(char_len);
        let end = span.end.min(char_len);

        // Overlapping or degenerate after clamping: resolution is the
        // caller's job, skipping keeps the output splice-free.
        if start < cursor || start >= end {
            continue;
        }

        if start > cursor {
            let gap = map.slice(text, cursor..start).unwrap_or_default();
            segments.push(Segment::Text(gap.to_string()));
        }

        let slice = map.slice(text, start..end).unwrap_or_default();
        segments.push(Segment::Entity {
            text: slice.to_string(),
            category: config.category_of(&span.label),
            score: span.score,
        });
        cursor = end;
    }

    if cursor < char_len {
        let tail = map.slice(text, cursor..char_len).unwrap_or_default();
        segments.push(Segment::Text(tail.to_string()));
    }

    segments
}

/// Render the annotated rendition of `text` as inline HTML.
///
/// Each entity becomes
/// `<span title="Score: 0.97" style="background-color:#d8fdd8; padding:2px 4px; border-radius:4px">Київ</span>`
/// with the category's color; everything between fragments is the input
/// text, byte for byte.
#[must_use]
pub fn highlight(text: &str, spans: &[EntitySpan], config: &LabelConfig) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in highlight_segments(text, spans, config) {
        match segment {
            Segment::Text(literal) => out.push_str(&literal),
            Segment::Entity {
                text,
                category,
                score,
            } => out.push_str(&render_fragment(&text, category, score)),
        }
    }
    out
}

fn render_fragment(text: &str, category: Option<Category>, score: f64) -> String {
    let color = category.map_or(FALLBACK_COLOR, |c| c.color());
    format!(
        r#"<span title="Score: {score:.2}" style="background-color:{color}; padding:2px 4px; border-radius:4px">{text}</span>"#
    )
}
