//! Word boundaries over a single line, in character indices.

use crate::unicode::class::is_word_char;
use unicode_segmentation::UnicodeSegmentation;

/// A word-bound segment in character indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    start: usize,
    end: usize,
    is_word: bool,
}

fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut char_pos = 0;
    for (_, piece) in text.split_word_bound_indices() {
        let len = piece.chars().count();
        out.push(Segment {
            start: char_pos,
            end: char_pos + len,
            is_word: piece.chars().any(is_word_char),
        });
        char_pos += len;
    }
    out
}

/// Start of the word at or before `index`; `0` if there is none.
#[must_use]
pub fn prev_word_start(text: &str, index: usize) -> usize {
    segments(text)
        .into_iter()
        .filter(|seg| seg.is_word && seg.start < index)
        .map(|seg| seg.start)
        .next_back()
        .unwrap_or(0)
}

/// End of the word at or after `index`; the text length if there is none.
#[must_use]
pub fn next_word_end(text: &str, index: usize) -> usize {
    let segs = segments(text);
    let len = segs.last().map_or(0, |seg| seg.end);
    segs.into_iter()
        .find(|seg| seg.is_word && seg.end > index)
        .map_or(len, |seg| seg.end)
}

/// Character range of the word touching `index`, if any.
///
/// A caret sitting right after a word still selects that word.
#[must_use]
pub fn word_at(text: &str, index: usize) -> Option<std::ops::Range<usize>> {
    let segs = segments(text);
    segs.iter()
        .find(|seg| seg.is_word && seg.start <= index && index < seg.end)
        .or_else(|| segs.iter().find(|seg| seg.is_word && seg.end == index))
        .map(|seg| seg.start..seg.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prev_word_start() {
        let text = "let foo_bar = 42;";
        assert_eq!(prev_word_start(text, 17), 14);
        assert_eq!(prev_word_start(text, 14), 4);
        assert_eq!(prev_word_start(text, 6), 4);
        assert_eq!(prev_word_start(text, 4), 0);
        assert_eq!(prev_word_start(text, 0), 0);
    }

    #[test]
    fn test_next_word_end() {
        let text = "let foo_bar = 42;";
        assert_eq!(next_word_end(text, 0), 3);
        assert_eq!(next_word_end(text, 3), 11);
        assert_eq!(next_word_end(text, 11), 16);
        assert_eq!(next_word_end(text, 16), 17);
    }

    #[test]
    fn test_word_at() {
        let text = "alpha beta";
        assert_eq!(word_at(text, 7), Some(6..10));
        assert_eq!(word_at(text, 5), Some(0..5));
        assert_eq!(word_at("  ", 1), None);
    }

    #[test]
    fn test_non_ascii_indices_are_chars() {
        let text = "héllo wörld";
        assert_eq!(next_word_end(text, 0), 5);
        assert_eq!(prev_word_start(text, 11), 6);
    }
}
