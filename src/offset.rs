//! Character/byte offset conversion.
//!
//! Span offsets in this crate count CHARACTERS, but `&str` slices by BYTES,
//! and Ukrainian text makes the two disagree on every Cyrillic letter:
//!
//! ```text
//! Text:  "у Києві"
//!
//! chars:  у   ' '  К   и   є   в   і
//!         0    1   2   3   4   5   6
//! bytes:  0-1  2   3-4 5-6 7-8 9-10 11-12
//! ```
//!
//! Slicing `&text[2..6]` by bytes lands mid-codepoint and panics. Everything
//! here converts char ranges to byte ranges first, so span arithmetic stays
//! in character space end to end.

use std::ops::Range;

/// Precomputed char-index to byte-index table for one text.
///
/// Build once per analyzed text, then convert many spans. Index `char_len()`
/// maps to `text.len()` so half-open end offsets work without special cases.
#[derive(Debug, Clone)]
pub struct CharMap {
    byte_of: Vec<usize>,
}

impl CharMap {
    /// Build the table in one pass over `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut byte_of: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_of.push(text.len());
        Self { byte_of }
    }

    /// Number of characters in the mapped text.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.byte_of.len() - 1
    }

    /// Byte offset of the given character index.
    ///
    /// `char_idx == char_len()` is valid and returns the byte length.
    #[must_use]
    pub fn byte_of(&self, char_idx: usize) -> Option<usize> {
        self.byte_of.get(char_idx).copied()
    }

    /// Convert a char range to the corresponding byte range.
    #[must_use]
    pub fn byte_range(&self, chars: Range<usize>) -> Option<Range<usize>> {
        if chars.start > chars.end {
            return None;
        }
        let start = self.byte_of(chars.start)?;
        let end = self.byte_of(chars.end)?;
        Some(start..end)
    }

    /// Slice `text` by a char range.
    ///
    /// `text` must be the same string the map was built from.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str, chars: Range<usize>) -> Option<&'a str> {
        let bytes = self.byte_range(chars)?;
        text.get(bytes)
    }
}

/// One-shot char-range slice without building a map.
///
/// Fine for a handful of spans; prefer [`CharMap`] when converting many spans
/// from the same text.
#[must_use]
pub fn slice_chars(text: &str, char_start: usize, char_end: usize) -> Option<&str> {
    if char_start > char_end {
        return None;
    }
    if text.is_ascii() {
        return text.get(char_start..char_end);
    }
    let mut iter = text.char_indices();
    let start = if char_start == 0 {
        0
    } else {
        iter.by_ref().nth(char_start - 1).map(|(b, c)| b + c.len_utf8())?
    };
    let remaining = char_end - char_start;
    let end = if remaining == 0 {
        start
    } else {
        match iter.by_ref().nth(remaining - 1) {
            Some((b, c)) => b + c.len_utf8(),
            None => return None,
        }
    };
    text.get(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identity() {
        let text = "Hello world";
        let map = CharMap::new(text);
        assert_eq!(map.char_len(), 11);
        for i in 0..=11 {
            assert_eq!(map.byte_of(i), Some(i));
        }
        assert_eq!(map.slice(text, 6..11), Some("world"));
    }

    #[test]
    fn test_cyrillic_two_bytes_per_letter() {
        let text = "у Києві";
        let map = CharMap::new(text);
        assert_eq!(map.char_len(), 7);
        // "Києві" starts at char 2, byte 3
        assert_eq!(map.byte_of(2), Some(3));
        assert_eq!(map.slice(text, 2..7), Some("Києві"));
        assert_eq!(slice_chars(text, 2, 7), Some("Києві"));
    }

    #[test]
    fn test_end_sentinel() {
        let text = "Київ";
        let map = CharMap::new(text);
        assert_eq!(map.byte_of(4), Some(8));
        assert_eq!(map.byte_of(5), None);
        assert_eq!(map.slice(text, 0..4), Some("Київ"));
    }

    #[test]
    fn test_mixed_scripts() {
        let text = "ЗСУ (AFU) — ok";
        let map = CharMap::new(text);
        assert_eq!(map.slice(text, 0..3), Some("ЗСУ"));
        assert_eq!(map.slice(text, 5..8), Some("AFU"));
        assert_eq!(slice_chars(text, 10, 11), Some("—"));
    }

    #[test]
    fn test_empty_and_degenerate() {
        let map = CharMap::new("");
        assert_eq!(map.char_len(), 0);
        assert_eq!(map.byte_of(0), Some(0));
        assert_eq!(map.slice("", 0..0), Some(""));

        assert_eq!(slice_chars("абв", 1, 1), Some(""));
        assert_eq!(slice_chars("абв", 2, 1), None);
        assert_eq!(slice_chars("абв", 0, 4), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn map_slice_matches_char_iteration(
            text in "[ а-яіїєґА-ЯІЇЄҐa-z0-9]{0,40}",
            start in 0usize..40,
            len in 0usize..40,
        ) {
            let map = CharMap::new(&text);
            let end = start + len;
            let expected: Option<String> = if end <= map.char_len() {
                Some(text.chars().skip(start).take(len).collect())
            } else {
                None
            };
            let got = map.slice(&text, start..end).map(str::to_owned);
            prop_assert_eq!(got.clone(), expected);
            // One-shot helper agrees with the map
            prop_assert_eq!(slice_chars(&text, start, end).map(str::to_owned), got);
        }

        #[test]
        fn byte_of_is_monotonic(text in "[ а-яіїєґa-z]{0,40}") {
            let map = CharMap::new(&text);
            let mut prev = 0;
            for i in 0..=map.char_len() {
                let b = map.byte_of(i).unwrap();
                prop_assert!(b >= prev);
                prev = b;
            }
            prop_assert_eq!(prev, text.len());
        }
    }
}
