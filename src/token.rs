//! Whitespace span tokenizer.
//!
//! Tokens are maximal runs of non-whitespace characters, each carrying its
//! character span in the source text. No normalization happens here:
//! punctuation stays attached ("Києві." is one token), case is preserved,
//! and the original whitespace shape is recoverable from the gaps between
//! spans. Reconciliation and export both key off these offsets, so the
//! tokenizer is deliberately dumb.

use serde::{Deserialize, Serialize};

use crate::entity::EntitySpan;

/// One whitespace-delimited token with its character span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token text, exactly as it appears in the source.
    pub text: String,
    /// Start position (character offset).
    pub start: usize,
    /// End position (character offset, exclusive).
    pub end: usize,
}

impl Token {
    /// Token length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for a zero-length token (never produced by [`tokenize`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when the token lies fully inside the span's `[start, end)`.
    ///
    /// Partial overlap does not count: a token straddling a span boundary is
    /// not within the span.
    #[must_use]
    pub fn within(&self, span: &EntitySpan) -> bool {
        span.start <= self.start && self.end <= span.end
    }
}

/// Split `text` into whitespace-delimited tokens with character offsets.
///
/// Whitespace is `char::is_whitespace` (Unicode White_Space, so NBSP and
/// friends separate tokens too). Empty and all-whitespace input produce an
/// empty vector.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut pos = 0;

    for (idx, ch) in text.chars().enumerate() {
        pos = idx + 1;
        if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    start,
                    end: idx,
                });
            }
        } else {
            if current.is_empty() {
                start = idx;
            }
            current.push(ch);
        }
    }

    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            start,
            end: pos,
        });
    }

    tokens
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn token_count_matches_split_whitespace(text in "[ \t\nа-яіїєґА-ЯІЇЄҐa-zA-Z0-9.,!?–]{0,60}") {
            let tokens = tokenize(&text);
            prop_assert_eq!(tokens.len(), text.split_whitespace().count());
        }

        #[test]
        fn token_texts_match_split_whitespace(text in "[ \t\nа-яіїєґa-z0-9.,]{0,60}") {
            let tokens: Vec<String> = tokenize(&text).into_iter().map(|t| t.text).collect();
            let expected: Vec<String> =
                text.split_whitespace().map(str::to_owned).collect();
            prop_assert_eq!(tokens, expected);
        }

        #[test]
        fn spans_are_ordered_and_disjoint(text in "[ \tа-яa-z0-9]{0,60}") {
            let tokens = tokenize(&text);
            for pair in tokens.windows(2) {
                // At least one whitespace char sits between adjacent tokens
                prop_assert!(pair[0].end < pair[1].start);
            }
            for token in &tokens {
                prop_assert!(token.start < token.end);
                prop_assert_eq!(token.len(), token.text.chars().count());
            }
        }
    }
}
