//! Flattened text for regex search.
//!
//! The regex engine works on one linear string while edits are addressed by
//! line and display column. [`FlatText`] carries both: the string, and for
//! every character the [`Place`] it came from. Line terminators between
//! lines are part of the string and map to the end of the line they follow.

use crate::text::line::Line;
use crate::text::place::Place;
use crate::text::tabs::prefix_widths;
use regex::Regex;

/// A run of string indices `from..to` on one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub line: usize,
    pub from: usize,
    pub to: usize,
}

/// Text of a range plus an offset-to-place table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatText {
    text: String,
    /// Byte offset of every character, ascending.
    offsets: Vec<usize>,
    /// Place of every character, parallel to `offsets`.
    places: Vec<Place>,
    end: Place,
}

impl FlatText {
    /// Flatten `segments`, joining consecutive ones with the terminator of
    /// the line each one ends on (LF for a line without one).
    pub(crate) fn build<'a>(
        segments: &[Segment],
        mut line_at: impl FnMut(usize) -> &'a Line,
        tab_length: usize,
    ) -> Self {
        let mut flat = Self::default();
        for (n, seg) in segments.iter().enumerate() {
            let line = line_at(seg.line);
            let columns = prefix_widths(line.chars(), tab_length);
            for (k, c) in line.chars().enumerate().take(seg.to).skip(seg.from) {
                flat.push(c, Place::new(columns[k], seg.line));
            }
            let end = Place::new(columns[seg.to], seg.line);
            if n + 1 < segments.len() {
                let eol = if line.eol().is_none() {
                    "\n"
                } else {
                    line.eol().as_str()
                };
                for c in eol.chars() {
                    flat.push(c, end);
                }
            }
            flat.end = end;
        }
        flat
    }

    fn push(&mut self, c: char, place: Place) {
        self.offsets.push(self.text.len());
        self.places.push(place);
        self.text.push(c);
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Place of the character at char index `index`, or the end place.
    #[must_use]
    pub fn place(&self, index: usize) -> Place {
        self.places.get(index).copied().unwrap_or(self.end)
    }

    /// Place of byte offset `offset`; the text length maps to the end place.
    #[must_use]
    pub fn place_at_byte(&self, offset: usize) -> Place {
        let index = self.offsets.partition_point(|&o| o < offset);
        self.place(index)
    }

    /// Every match of `regex` as (start, end) places.
    ///
    /// A named group `range` narrows each match to that group.
    #[must_use]
    pub fn find(&self, regex: &Regex) -> Vec<(Place, Place)> {
        let group = regex.capture_names().flatten().any(|name| name == "range");
        regex
            .captures_iter(&self.text)
            .filter_map(|caps| {
                let m = if group { caps.name("range") } else { caps.get(0) }?;
                Some((self.place_at_byte(m.start()), self.place_at_byte(m.end())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::store::LineStore;

    fn flatten(store: &LineStore, segments: &[Segment]) -> FlatText {
        FlatText::build(segments, |i| &store[i], 4)
    }

    #[test]
    fn test_places_and_terminators() {
        let store = LineStore::from_text("ab\r\n\tc");
        let flat = flatten(
            &store,
            &[
                Segment { line: 0, from: 1, to: 2 },
                Segment { line: 1, from: 0, to: 2 },
            ],
        );
        assert_eq!(flat.as_str(), "b\r\n\tc");
        assert_eq!(flat.place(0), Place::new(1, 0));
        assert_eq!(flat.place(1), Place::new(2, 0));
        assert_eq!(flat.place(2), Place::new(2, 0));
        assert_eq!(flat.place(3), Place::new(0, 1));
        assert_eq!(flat.place(4), Place::new(4, 1));
        assert_eq!(flat.place(5), Place::new(5, 1));
    }

    #[test]
    fn test_byte_offsets_of_multibyte_text() {
        let store = LineStore::from_text("é漢x");
        let flat = flatten(&store, &[Segment { line: 0, from: 0, to: 3 }]);
        assert_eq!(flat.place_at_byte(2), Place::new(1, 0));
        assert_eq!(flat.place_at_byte(5), Place::new(2, 0));
        assert_eq!(flat.place_at_byte(6), Place::new(3, 0));
    }

    #[test]
    fn test_find_with_range_group() {
        let store = LineStore::from_text("let x = 1;\nlet yy = 2;");
        let flat = flatten(
            &store,
            &[
                Segment { line: 0, from: 0, to: 10 },
                Segment { line: 1, from: 0, to: 11 },
            ],
        );
        let re = Regex::new(r"let (?P<range>\w+)").unwrap();
        assert_eq!(
            flat.find(&re),
            vec![
                (Place::new(4, 0), Place::new(5, 0)),
                (Place::new(4, 1), Place::new(6, 1)),
            ]
        );
    }

    #[test]
    fn test_match_across_terminator() {
        let store = LineStore::from_text("foo\nbar");
        let flat = flatten(
            &store,
            &[
                Segment { line: 0, from: 0, to: 3 },
                Segment { line: 1, from: 0, to: 3 },
            ],
        );
        let re = Regex::new(r"o\nb").unwrap();
        assert_eq!(flat.find(&re), vec![(Place::new(2, 0), Place::new(1, 1))]);
    }
}
