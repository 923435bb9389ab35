//! Ranges, selections and caret movement.
//!
//! A [`Range`] is a pair of [`Place`]s. `start` is the caret, `end` is the
//! anchor; the pair is unordered, so the direction records which way the
//! selection grew. A range in column mode covers the rectangle spanned by its
//! two corners: on every line between them it selects the same display-column
//! interval.
//!
//! Ranges do not own or borrow the buffer. Queries take a [`BufferRef`], the
//! line store plus the tab length in effect.
//!
//! # Examples
//!
//! ```
//! use richtext_core::text::{BufferRef, LineStore, Place, Range};
//!
//! let store = LineStore::from_text("fn main() {\r\n    body\r\n}");
//! let buf = BufferRef::new(&store, 4);
//!
//! let range = Range::new(Place::new(3, 0), Place::new(8, 1));
//! assert_eq!(range.text(buf).unwrap(), "main() {\r\n    body");
//!
//! let found = Range::all(buf).find_ranges(buf, r"\bbody\b").unwrap();
//! assert_eq!(found[0].start(), Place::new(4, 1));
//! ```

use crate::error::Result;
use crate::style::StyleIndex;
use crate::text::line::Line;
use crate::text::place::Place;
use crate::text::search::{FlatText, Segment};
use crate::text::store::LineStore;
use crate::text::tabs::{self, TabSnap};
use crate::unicode::{next_word_end, prev_word_start};
use regex::Regex;
use std::cell::RefCell;
use std::rc::Rc;

/// Read access to a buffer for coordinate-sensitive range queries.
#[derive(Clone, Copy, Debug)]
pub struct BufferRef<'a> {
    pub store: &'a LineStore,
    pub tab_length: usize,
}

impl<'a> BufferRef<'a> {
    /// `tab_length` below 1 is treated as 1.
    #[must_use]
    pub const fn new(store: &'a LineStore, tab_length: usize) -> Self {
        Self {
            store,
            tab_length: if tab_length == 0 { 1 } else { tab_length },
        }
    }

    fn line(self, index: usize) -> Result<&'a Line> {
        self.store.line(index)
    }

    fn width(self, index: usize) -> Result<usize> {
        self.store.display_width(index, self.tab_length)
    }

    /// Place at the end of the last line.
    fn last_place(self) -> Place {
        let last = self.store.len().saturating_sub(1);
        let width = self.width(last).unwrap_or(0);
        Place::new(width, last)
    }
}

#[derive(Clone, Debug)]
struct FlatCache {
    version: u64,
    tab_length: usize,
    flat: Rc<FlatText>,
}

/// A caret or selection.
#[derive(Clone, Debug, Default)]
pub struct Range {
    start: Place,
    end: Place,
    column_mode: bool,
    preferred_column: Option<usize>,
    cache: RefCell<Option<FlatCache>>,
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.column_mode == other.column_mode
    }
}

impl Eq for Range {}

impl Range {
    #[must_use]
    pub fn new(start: Place, end: Place) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    /// An empty range at `place`.
    #[must_use]
    pub fn caret(place: Place) -> Self {
        Self::new(place, place)
    }

    /// A column-mode range with corners `start` and `end`.
    #[must_use]
    pub fn column(start: Place, end: Place) -> Self {
        Self {
            column_mode: true,
            ..Self::new(start, end)
        }
    }

    /// The whole buffer, caret at the end.
    #[must_use]
    pub fn all(buf: BufferRef<'_>) -> Self {
        Self::new(buf.last_place(), Place::new(0, 0))
    }

    fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }

    /// The caret.
    #[must_use]
    pub fn start(&self) -> Place {
        self.start
    }

    /// The anchor.
    #[must_use]
    pub fn end(&self) -> Place {
        self.end
    }

    /// Collapse the range to a caret at `place`.
    pub fn set_start(&mut self, place: Place) {
        self.start = place;
        self.end = place;
        self.preferred_column = None;
        self.invalidate();
    }

    /// Move the anchor, keeping the caret.
    pub fn set_end(&mut self, place: Place) {
        self.end = place;
        self.invalidate();
    }

    /// Set both corners.
    pub fn set(&mut self, start: Place, end: Place) {
        self.start = start;
        self.end = end;
        self.preferred_column = None;
        self.invalidate();
    }

    #[must_use]
    pub fn is_column_mode(&self) -> bool {
        self.column_mode
    }

    pub fn set_column_mode(&mut self, enabled: bool) {
        self.column_mode = enabled;
        self.invalidate();
    }

    /// Column remembered across vertical caret moves.
    #[must_use]
    pub fn preferred_column(&self) -> Option<usize> {
        self.preferred_column
    }

    /// Earlier corner.
    #[must_use]
    pub fn from(&self) -> Place {
        self.start.min(self.end)
    }

    /// Later corner.
    #[must_use]
    pub fn to(&self) -> Place {
        self.start.max(self.end)
    }

    /// Left display column. In column mode this is the smaller corner
    /// column, otherwise the column of [`Self::from`].
    #[must_use]
    pub fn from_x(&self) -> usize {
        if self.column_mode {
            self.start.column.min(self.end.column)
        } else {
            self.from().column
        }
    }

    #[must_use]
    pub fn to_x(&self) -> usize {
        if self.column_mode {
            self.start.column.max(self.end.column)
        } else {
            self.to().column
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        if self.column_mode {
            self.start.column == self.end.column
        } else {
            self.start == self.end
        }
    }

    /// Order the corners so that `start <= end`.
    pub fn normalize(&mut self) {
        if self.start > self.end {
            self.inverse();
        }
    }

    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut range = self.clone();
        range.normalize();
        range
    }

    /// Swap caret and anchor.
    pub fn inverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
        self.invalidate();
    }

    /// Whether `place` lies inside the range, bounds included.
    #[must_use]
    pub fn contains(&self, place: Place) -> bool {
        if self.column_mode {
            let (top, bottom) = (self.from().line, self.to().line);
            (top..=bottom).contains(&place.line)
                && (self.from_x()..=self.to_x()).contains(&place.column)
        } else {
            (self.from()..=self.to()).contains(&place)
        }
    }

    /// Overlap of two ranges, or an empty range at this range's caret.
    ///
    /// A column-mode range intersects only with a range confined to a single
    /// line.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let empty = Self::caret(self.start);
        if self.column_mode {
            let line = other.start.line;
            if other.end.line != line || !(self.from().line..=self.to().line).contains(&line) {
                return empty;
            }
            let row = Self::new(
                Place::new(self.from_x(), line),
                Place::new(self.to_x(), line),
            );
            return row.intersection(other);
        }
        let from = self.from().max(other.from());
        let to = self.to().min(other.to());
        if to < from {
            return empty;
        }
        Self::new(from, to)
    }

    /// Smallest range covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.from().min(other.from()), self.to().max(other.to()))
    }

    /// Per-line display-column spans `(line, from, to)`.
    fn spans(&self, buf: BufferRef<'_>) -> Result<Vec<(usize, usize, usize)>> {
        let (from, to) = (self.from(), self.to());
        if self.column_mode {
            buf.store.check_line(from.line)?;
            buf.store.check_line(to.line)?;
            let (x0, x1) = (self.from_x(), self.to_x());
            return Ok((from.line..=to.line).map(|line| (line, x0, x1)).collect());
        }
        buf.store.check_place(from, buf.tab_length)?;
        buf.store.check_place(to, buf.tab_length)?;
        (from.line..=to.line)
            .map(|line| {
                let left = if line == from.line { from.column } else { 0 };
                let right = if line == to.line {
                    to.column
                } else {
                    buf.width(line)?
                };
                Ok((line, left, right))
            })
            .collect()
    }

    /// Per-line string-index runs. Column mode keeps partially covered tabs.
    pub(crate) fn segments(&self, buf: BufferRef<'_>) -> Result<Vec<Segment>> {
        let (left, right) = if self.column_mode {
            (TabSnap::Before, TabSnap::After)
        } else {
            (TabSnap::Nearest, TabSnap::Nearest)
        };
        self.spans(buf)?
            .into_iter()
            .map(|(index, x0, x1)| {
                let line = buf.line(index)?;
                let from = line.display_to_string(x0, buf.tab_length, left);
                if x0 == x1 {
                    return Ok(Segment {
                        line: index,
                        from,
                        to: from,
                    });
                }
                let to = line.display_to_string(x1, buf.tab_length, right);
                Ok(Segment {
                    line: index,
                    from,
                    to: to.max(from),
                })
            })
            .collect()
    }

    /// Flattened text of the range, cached until the text version or tab
    /// length changes.
    pub fn flat(&self, buf: BufferRef<'_>) -> Result<Rc<FlatText>> {
        let version = buf.store.version();
        if let Some(cache) = self.cache.borrow().as_ref() {
            if cache.version == version && cache.tab_length == buf.tab_length {
                return Ok(Rc::clone(&cache.flat));
            }
        }
        let mut segments = self.segments(buf)?;
        if self.is_empty() {
            segments.truncate(1);
        }
        let flat = Rc::new(FlatText::build(
            &segments,
            |i| &buf.store[i],
            buf.tab_length,
        ));
        *self.cache.borrow_mut() = Some(FlatCache {
            version,
            tab_length: buf.tab_length,
            flat: Rc::clone(&flat),
        });
        Ok(flat)
    }

    /// Spanned text, lines joined by their terminators.
    pub fn text(&self, buf: BufferRef<'_>) -> Result<String> {
        Ok(self.flat(buf)?.as_str().to_owned())
    }

    /// One range per covered line, bounded by the column interval in column
    /// mode. Empty rows are dropped unless `include_empty`.
    pub fn sub_ranges(&self, buf: BufferRef<'_>, include_empty: bool) -> Result<Vec<Self>> {
        let mut out = Vec::new();
        for seg in self.segments(buf)? {
            if seg.from == seg.to && !include_empty {
                continue;
            }
            let line = buf.line(seg.line)?;
            let from = line.string_to_display(seg.from, buf.tab_length);
            let to = line.string_to_display(seg.to, buf.tab_length);
            out.push(Self::new(
                Place::new(from, seg.line),
                Place::new(to, seg.line),
            ));
        }
        Ok(out)
    }

    /// Grow to whole lines.
    pub fn expand(&mut self, buf: BufferRef<'_>) -> Result<()> {
        let (from, to) = (self.from(), self.to());
        let width = buf.width(to.line)?;
        buf.store.check_line(from.line)?;
        self.set(Place::new(0, from.line), Place::new(width, to.line));
        Ok(())
    }

    /// Select the whole buffer, caret at the end.
    pub fn select_all(&mut self, buf: BufferRef<'_>) {
        self.column_mode = false;
        self.set(buf.last_place(), Place::new(0, 0));
    }

    /// Character left of the caret; `None` at the start of a line.
    pub fn char_before_start(&self, buf: BufferRef<'_>) -> Result<Option<char>> {
        let index = buf.store.string_index(self.start, buf.tab_length)?;
        Ok(index
            .checked_sub(1)
            .and_then(|i| buf.store[self.start.line].get(i))
            .map(|cell| cell.c))
    }

    /// Character right of the caret; `None` at the end of a line.
    pub fn char_after_start(&self, buf: BufferRef<'_>) -> Result<Option<char>> {
        let index = buf.store.string_index(self.start, buf.tab_length)?;
        Ok(buf.store[self.start.line].get(index).map(|cell| cell.c))
    }

    // ------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------

    /// Add `mask` to every character in the range. A partially covered tab
    /// counts as covered. Places outside the text are rejected; in column
    /// mode, rows shorter than the rectangle are styled up to their end.
    pub fn set_style(&self, store: &mut LineStore, tab_length: usize, mask: StyleIndex) -> Result<()> {
        let spans = self.spans(BufferRef::new(store, tab_length))?;
        for (line, from, to) in spans {
            let target = store.line_mut(line)?;
            let (start, end) = target.covered_span(from, to, tab_length);
            target.apply_style(start, end, mask)?;
        }
        Ok(())
    }

    /// Remove `mask` from every character in the range.
    pub fn clear_style(&self, store: &mut LineStore, tab_length: usize, mask: StyleIndex) -> Result<()> {
        let spans = self.spans(BufferRef::new(store, tab_length))?;
        for (line, from, to) in spans {
            let target = store.line_mut(line)?;
            let (start, end) = target.covered_span(from, to, tab_length);
            target.clear_style(start, end, mask)?;
        }
        Ok(())
    }

    /// Add `mask` to every match of `pattern` inside the range. Returns the
    /// number of matches.
    pub fn set_style_by_pattern(
        &self,
        store: &mut LineStore,
        tab_length: usize,
        pattern: &str,
        mask: StyleIndex,
    ) -> Result<usize> {
        let found = self.find_ranges(BufferRef::new(store, tab_length), pattern)?;
        for range in &found {
            range.set_style(store, tab_length, mask)?;
        }
        Ok(found.len())
    }

    /// Style layers of the character right of `place`.
    pub fn style_at(buf: BufferRef<'_>, place: Place) -> Result<StyleIndex> {
        let index = buf.store.string_index(place, buf.tab_length)?;
        Ok(buf.store[place.line]
            .get(index)
            .map_or(StyleIndex::NONE, |cell| cell.style))
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Ranges matching `pattern` inside this range.
    pub fn find_ranges(&self, buf: BufferRef<'_>, pattern: &str) -> Result<Vec<Self>> {
        let regex = Regex::new(pattern)?;
        self.find_ranges_regex(buf, &regex)
    }

    /// Ranges matching `regex`. A named group `range` narrows each match.
    pub fn find_ranges_regex(&self, buf: BufferRef<'_>, regex: &Regex) -> Result<Vec<Self>> {
        let flat = self.flat(buf)?;
        Ok(flat
            .find(regex)
            .into_iter()
            .map(|(start, end)| Self::new(start, end))
            .collect())
    }

    /// Like [`Self::find_ranges_regex`] but matching one line at a time, so
    /// the whole range is never materialized. Matches cannot span lines.
    pub fn find_ranges_by_lines(&self, buf: BufferRef<'_>, regex: &Regex) -> Result<Vec<Self>> {
        let mut out = Vec::new();
        for seg in self.segments(buf)? {
            let flat = FlatText::build(&[seg], |i| &buf.store[i], buf.tab_length);
            out.extend(
                flat.find(regex)
                    .into_iter()
                    .map(|(start, end)| Self::new(start, end)),
            );
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Caret movement
    // ------------------------------------------------------------------

    fn move_caret(&mut self, to: Place, shift: bool) {
        self.start = to;
        if !shift {
            self.end = to;
        }
        self.invalidate();
    }

    fn leave_column_mode(&mut self, buf: BufferRef<'_>) -> Result<()> {
        if !self.column_mode {
            return Ok(());
        }
        let snap = |place: Place| -> Result<Place> {
            let line = buf.line(place.line)?;
            let column = tabs::snap_column(line.chars(), place.column, buf.tab_length);
            Ok(Place::new(column, place.line))
        };
        let (start, end) = (snap(self.start)?, snap(self.end)?);
        self.column_mode = false;
        self.set(start, end);
        Ok(())
    }

    fn collapse_selection(&mut self, to: Place) -> bool {
        if self.start == self.end {
            return false;
        }
        self.set_start(to);
        true
    }

    pub fn go_left(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.preferred_column = None;
        if self.column_mode {
            self.start.column = self.start.column.saturating_sub(1);
            self.invalidate();
            return Ok(());
        }
        if !shift && self.collapse_selection(self.from()) {
            return Ok(());
        }
        let Place { line, .. } = self.start;
        let index = buf.store.string_index(self.start, buf.tab_length)?;
        let target = if index > 0 {
            buf.store.place_of(line, index - 1, buf.tab_length)?
        } else if line > 0 {
            Place::new(buf.width(line - 1)?, line - 1)
        } else {
            self.start
        };
        self.move_caret(target, shift);
        Ok(())
    }

    pub fn go_right(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.preferred_column = None;
        if self.column_mode {
            self.start.column += 1;
            self.invalidate();
            return Ok(());
        }
        if !shift && self.collapse_selection(self.to()) {
            return Ok(());
        }
        let Place { line, .. } = self.start;
        let index = buf.store.string_index(self.start, buf.tab_length)?;
        let target = if index < buf.line(line)?.len() {
            buf.store.place_of(line, index + 1, buf.tab_length)?
        } else if line + 1 < buf.store.len() {
            Place::new(0, line + 1)
        } else {
            self.start
        };
        self.move_caret(target, shift);
        Ok(())
    }

    fn go_vertical(&mut self, buf: BufferRef<'_>, line: usize, shift: bool) -> Result<()> {
        let target_line = buf.line(line)?;
        let column = *self.preferred_column.get_or_insert(self.start.column);
        let column = tabs::snap_column(target_line.chars(), column, buf.tab_length);
        self.move_caret(Place::new(column, line), shift);
        Ok(())
    }

    /// Move up one line, keeping the preferred column.
    pub fn go_up(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        if self.column_mode {
            self.start.line = self.start.line.saturating_sub(1);
            self.invalidate();
            return Ok(());
        }
        match self.start.line.checked_sub(1) {
            Some(line) => self.go_vertical(buf, line, shift),
            None => Ok(()),
        }
    }

    /// Move down one line, keeping the preferred column.
    pub fn go_down(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        let line = self.start.line + 1;
        if line >= buf.store.len() {
            return Ok(());
        }
        if self.column_mode {
            self.start.line = line;
            self.invalidate();
            return Ok(());
        }
        self.go_vertical(buf, line, shift)
    }

    pub fn go_home(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.leave_column_mode(buf)?;
        self.preferred_column = None;
        self.move_caret(Place::new(0, self.start.line), shift);
        Ok(())
    }

    pub fn go_end(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.leave_column_mode(buf)?;
        self.preferred_column = None;
        let width = buf.width(self.start.line)?;
        self.move_caret(Place::new(width, self.start.line), shift);
        Ok(())
    }

    /// Caret to the start of the buffer.
    pub fn go_first(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.leave_column_mode(buf)?;
        self.preferred_column = None;
        self.move_caret(Place::new(0, 0), shift);
        Ok(())
    }

    /// Caret to the end of the buffer.
    pub fn go_last(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.leave_column_mode(buf)?;
        self.preferred_column = None;
        self.move_caret(buf.last_place(), shift);
        Ok(())
    }

    /// Caret to the start of the previous word, or the end of the previous
    /// line from column 0.
    pub fn go_word_left(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.leave_column_mode(buf)?;
        self.preferred_column = None;
        let Place { line, .. } = self.start;
        let index = buf.store.string_index(self.start, buf.tab_length)?;
        let target = if index == 0 && line > 0 {
            Place::new(buf.width(line - 1)?, line - 1)
        } else {
            let text = buf.line(line)?.text();
            buf.store
                .place_of(line, prev_word_start(&text, index), buf.tab_length)?
        };
        self.move_caret(target, shift);
        Ok(())
    }

    /// Caret to the end of the next word, or the start of the next line from
    /// the end of a line.
    pub fn go_word_right(&mut self, buf: BufferRef<'_>, shift: bool) -> Result<()> {
        self.leave_column_mode(buf)?;
        self.preferred_column = None;
        let Place { line, .. } = self.start;
        let index = buf.store.string_index(self.start, buf.tab_length)?;
        let current = buf.line(line)?;
        let target = if index == current.len() && line + 1 < buf.store.len() {
            Place::new(0, line + 1)
        } else {
            let text = current.text();
            buf.store
                .place_of(line, next_word_end(&text, index), buf.tab_length)?
        };
        self.move_caret(target, shift);
        Ok(())
    }

    /// Reject a range whose corners lie outside the buffer.
    pub fn validate(&self, buf: BufferRef<'_>) -> Result<()> {
        self.spans(buf).map(|_| ())
    }
}
