//! A single line of styled characters.
//!
//! Lines are created by a [`LineStore`](super::LineStore), which stamps each
//! one with a [`LineId`] that never changes and is never handed out again.
//! All addressing here is by string index; display columns enter only through
//! the style helpers and the tab-aware queries, which take the caller's tab
//! length.

use crate::cell::Char;
use crate::error::{Error, Result};
use crate::style::StyleIndex;
use crate::text::eol::EolFormat;
use crate::text::tabs::{self, TabSnap};
use std::time::Instant;

/// Stable identity of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(pub(crate) u64);

impl LineId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A line of character cells plus per-line metadata.
#[derive(Clone, Debug)]
pub struct Line {
    cells: Vec<Char>,
    eol: EolFormat,
    fold_start: Option<String>,
    fold_end: Option<String>,
    id: LineId,
    changed: bool,
    last_visit: Option<Instant>,
    auto_indent: usize,
}

impl Line {
    pub(crate) fn new(id: LineId) -> Self {
        Self {
            cells: Vec::new(),
            eol: EolFormat::None,
            fold_start: None,
            fold_end: None,
            id,
            changed: false,
            last_visit: None,
            auto_indent: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Number of characters (EOL excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn cells(&self) -> &[Char] {
        &self.cells
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Char> {
        self.cells.get(index).copied()
    }

    /// Write a cell back after a read-modify-write.
    pub fn set(&mut self, index: usize, cell: Char) -> Result<()> {
        let len = self.len();
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *slot = cell;
        Ok(())
    }

    pub fn chars(&self) -> impl DoubleEndedIterator<Item = char> + Clone + '_ {
        self.cells.iter().map(|cell| cell.c)
    }

    /// Line text without terminator.
    #[must_use]
    pub fn text(&self) -> String {
        self.chars().collect()
    }

    /// Length of the leading run of spaces.
    #[must_use]
    pub fn start_spaces_count(&self) -> usize {
        self.cells.iter().take_while(|cell| cell.c == ' ').count()
    }

    /// Leading spaces and tabs.
    #[must_use]
    pub fn indent_text(&self) -> String {
        self.cells
            .iter()
            .take_while(|cell| cell.is_blank())
            .map(|cell| cell.c)
            .collect()
    }

    #[must_use]
    pub fn eol(&self) -> EolFormat {
        self.eol
    }

    pub fn set_eol(&mut self, eol: EolFormat) {
        self.eol = eol;
    }

    fn check_index(&self, index: usize, inclusive: bool) -> Result<()> {
        let len = self.len();
        let ok = if inclusive { index <= len } else { index < len };
        if ok {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange { index, len })
        }
    }

    /// Insert a cell before `index` (`index == len` appends).
    pub fn insert_at(&mut self, index: usize, cell: Char) -> Result<()> {
        self.check_index(index, true)?;
        self.cells.insert(index, cell);
        self.changed = true;
        Ok(())
    }

    /// Insert several cells before `index`.
    pub fn insert_range(&mut self, index: usize, cells: &[Char]) -> Result<()> {
        self.check_index(index, true)?;
        self.cells.splice(index..index, cells.iter().copied());
        self.changed = true;
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Char> {
        self.check_index(index, false)?;
        self.changed = true;
        Ok(self.cells.remove(index))
    }

    /// Remove `count` cells starting at `index`, returning them.
    pub fn remove_range(&mut self, index: usize, count: usize) -> Result<Vec<Char>> {
        let len = self.len();
        let end = index
            .checked_add(count)
            .filter(|&end| end <= len)
            .ok_or(Error::IndexOutOfRange {
                index: index.saturating_add(count),
                len,
            })?;
        self.changed = true;
        Ok(self.cells.drain(index..end).collect())
    }

    pub fn append_range(&mut self, cells: impl IntoIterator<Item = Char>) {
        self.cells.extend(cells);
        self.changed = true;
    }

    /// Cut the line at `index`, returning the tail.
    pub fn split_off(&mut self, index: usize) -> Result<Vec<Char>> {
        self.check_index(index, true)?;
        self.changed = true;
        Ok(self.cells.split_off(index))
    }

    /// Width of the line in display columns.
    #[must_use]
    pub fn display_width(&self, tab_length: usize) -> usize {
        tabs::display_width(self.chars(), tab_length)
    }

    #[must_use]
    pub fn string_to_display(&self, index: usize, tab_length: usize) -> usize {
        tabs::string_to_display(self.chars(), index, tab_length)
    }

    #[must_use]
    pub fn display_to_string(&self, column: usize, tab_length: usize, snap: TabSnap) -> usize {
        tabs::display_to_string(self.chars(), column, tab_length, snap)
    }

    /// String-index span covering display columns `from..to`, including any
    /// partially covered tab. Columns past the end map to the line length.
    #[must_use]
    pub fn covered_span(&self, from: usize, to: usize, tab_length: usize) -> (usize, usize) {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let start = self.display_to_string(from, tab_length, TabSnap::Before);
        let end = self.display_to_string(to, tab_length, TabSnap::After);
        (start, end)
    }

    fn cells_in(&mut self, start: usize, end: usize) -> Result<&mut [Char]> {
        let len = self.len();
        if start > end || end > len {
            return Err(Error::IndexOutOfRange {
                index: start.max(end),
                len,
            });
        }
        Ok(&mut self.cells[start..end])
    }

    /// Add style layers to cells `start..end`.
    pub fn apply_style(&mut self, start: usize, end: usize, mask: StyleIndex) -> Result<()> {
        for cell in self.cells_in(start, end)? {
            cell.style |= mask;
        }
        Ok(())
    }

    /// Remove style layers from cells `start..end`.
    pub fn clear_style(&mut self, start: usize, end: usize, mask: StyleIndex) -> Result<()> {
        for cell in self.cells_in(start, end)? {
            cell.style &= !mask;
        }
        Ok(())
    }

    /// Remove style layers from every cell.
    pub fn clear_style_all(&mut self, mask: StyleIndex) {
        for cell in &mut self.cells {
            cell.style &= !mask;
        }
    }

    #[must_use]
    pub fn fold_start(&self) -> Option<&str> {
        self.fold_start.as_deref()
    }

    #[must_use]
    pub fn fold_end(&self) -> Option<&str> {
        self.fold_end.as_deref()
    }

    pub fn set_fold_start(&mut self, marker: Option<String>) {
        self.fold_start = marker;
    }

    pub fn set_fold_end(&mut self, marker: Option<String>) {
        self.fold_end = marker;
    }

    /// Whether the line was edited since the flag was last cleared.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    #[must_use]
    pub fn last_visit(&self) -> Option<Instant> {
        self.last_visit
    }

    /// Record a caret visit for navigation history.
    pub fn mark_visited(&mut self) {
        self.last_visit = Some(Instant::now());
    }

    /// Spaces an auto-indenting editor put at the start of this line.
    #[must_use]
    pub fn auto_indent(&self) -> usize {
        self.auto_indent
    }

    pub fn set_auto_indent(&mut self, spaces: usize) {
        self.auto_indent = spaces;
    }

    /// Copy the content and metadata of `other`, keeping this line's identity.
    pub(crate) fn take_content(&mut self, other: &Self) {
        self.cells.clone_from(&other.cells);
        self.eol = other.eol;
        self.fold_start.clone_from(&other.fold_start);
        self.fold_end.clone_from(&other.fold_end);
        self.auto_indent = other.auto_indent;
        self.changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line {
        let mut line = Line::new(LineId(1));
        line.append_range(text.chars().map(Char::new));
        line
    }

    #[test]
    fn test_basic_queries() {
        let l = line("  foo bar");
        assert_eq!(l.len(), 9);
        assert!(!l.is_empty());
        assert_eq!(l.start_spaces_count(), 2);
        assert_eq!(l.text(), "  foo bar");
        assert!(line("").is_empty());
    }

    #[test]
    fn test_indent_text_includes_tabs() {
        assert_eq!(line("\t  x").indent_text(), "\t  ");
        assert_eq!(line("\t  x").start_spaces_count(), 0);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut l = line("ac");
        l.insert_at(1, Char::new('b')).unwrap();
        l.insert_at(3, Char::new('d')).unwrap();
        assert_eq!(l.text(), "abcd");
        assert_eq!(l.remove_at(0).unwrap().c, 'a');
        let removed = l.remove_range(1, 2).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(l.text(), "b");
        assert!(l.is_changed());
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut l = line("ab");
        assert!(matches!(
            l.insert_at(3, Char::new('x')),
            Err(Error::IndexOutOfRange { index: 3, len: 2 })
        ));
        assert!(l.remove_at(2).is_err());
        assert!(l.remove_range(1, 2).is_err());
        assert!(l.remove_range(usize::MAX, 2).is_err());
        assert!(l.split_off(3).is_err());
        assert!(l.set(2, Char::new('z')).is_err());
        assert_eq!(l.text(), "ab");
    }

    #[test]
    fn test_split_off() {
        let mut l = line("hello world");
        let tail = l.split_off(5).unwrap();
        assert_eq!(l.text(), "hello");
        assert_eq!(tail.iter().map(|c| c.c).collect::<String>(), " world");
    }

    #[test]
    fn test_display_width() {
        assert_eq!(line("a\tb").display_width(4), 5);
        assert_eq!(line("a\tb").string_to_display(3, 4), 5);
        assert_eq!(line("a\tb").display_to_string(3, 4, TabSnap::Nearest), 2);
    }

    #[test]
    fn test_style_over_display_columns_keeps_partial_tab() {
        let mut l = line("a\tb");
        let mask = StyleIndex::layer(0);
        // Columns 2..3 lie entirely inside the tab.
        let (start, end) = l.covered_span(2, 3, 4);
        assert_eq!((start, end), (1, 2));
        l.apply_style(start, end, mask).unwrap();
        assert!(!l.cells()[0].style.has_layer(0));
        assert!(l.cells()[1].style.has_layer(0));
        assert!(!l.cells()[2].style.has_layer(0));

        l.apply_style(0, 3, StyleIndex::layer(1)).unwrap();
        assert!(l.cells().iter().all(|c| c.style.has_layer(1)));

        let (start, end) = l.covered_span(5, 4, 4);
        l.clear_style(start, end, StyleIndex::layer(1)).unwrap();
        assert!(!l.cells()[2].style.has_layer(1));
        assert!(l.cells()[1].style.has_layer(1));

        l.clear_style_all(StyleIndex::all());
        assert!(l.cells().iter().all(|c| c.style.is_empty()));
    }

    #[test]
    fn test_style_past_end_is_rejected() {
        let mut l = line("ab");
        assert!(matches!(
            l.apply_style(1, 10, StyleIndex::layer(2)),
            Err(Error::IndexOutOfRange { index: 10, len: 2 })
        ));
        assert!(l.cells().iter().all(|c| c.style.is_empty()));
        assert_eq!(l.covered_span(1, 10, 4), (1, 2));
    }

    #[test]
    fn test_fold_markers_and_metadata() {
        let mut l = line("{");
        l.set_fold_start(Some("{".into()));
        assert_eq!(l.fold_start(), Some("{"));
        assert_eq!(l.fold_end(), None);
        assert!(l.last_visit().is_none());
        l.mark_visited();
        assert!(l.last_visit().is_some());
        l.set_auto_indent(4);
        assert_eq!(l.auto_indent(), 4);
    }
}
