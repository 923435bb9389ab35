//! The editing surface: a line store, a selection, settings and history.
//!
//! Every mutation goes through [`CommandManager::execute`], so everything
//! done here can be undone. A document always holds at least one line.
//!
//! # Examples
//!
//! ```
//! use richtext_core::text::{Document, EolFormat, Place, Range};
//!
//! let mut doc = Document::new();
//! doc.insert_text("foo\r\nbar").unwrap();
//! assert_eq!(doc.line_count(), 2);
//! assert_eq!(doc.store()[0].eol(), EolFormat::CrLf);
//!
//! doc.set_selection(Range::new(Place::new(0, 1), Place::new(3, 1))).unwrap();
//! doc.insert_text("baz").unwrap();
//! assert_eq!(doc.text(), "foo\r\nbaz");
//!
//! doc.undo().unwrap();
//! assert_eq!(doc.text(), "foo\r\nbar");
//! ```

use crate::error::Result;
use crate::event::{ListenerId, TextChanging, TextEvent};
use crate::style::{Style, StyleCapacity, StyleIndex};
use crate::text::command::{ColumnAction, Command, EditContext};
use crate::text::encoding::TextEncoding;
use crate::text::eol::{DEFAULT_DETECT_LINES, EolFormat};
use crate::text::history::CommandManager;
use crate::text::place::Place;
use crate::text::range::{BufferRef, Range};
use crate::text::settings::EditorSettings;
use crate::text::store::LineStore;
use crate::unicode::word_at;
use std::path::Path;
use tracing::debug;

/// A buffer with a selection and undo history.
#[derive(Debug)]
pub struct Document {
    store: LineStore,
    selection: Range,
    settings: EditorSettings,
    history: CommandManager,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: EditorSettings) -> Self {
        Self::with_style_capacity(settings, StyleCapacity::default())
    }

    #[must_use]
    pub fn with_style_capacity(settings: EditorSettings, capacity: StyleCapacity) -> Self {
        let mut store = LineStore::with_style_capacity(capacity);
        store.replace_lines("");
        Self {
            store,
            selection: Range::default(),
            settings,
            history: CommandManager::new(settings.max_history),
        }
    }

    /// Document holding `text`, with an empty history.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.set_text(text);
        doc
    }

    #[must_use]
    pub fn store(&self) -> &LineStore {
        &self.store
    }

    /// Read access for range queries.
    #[must_use]
    pub fn buf(&self) -> BufferRef<'_> {
        BufferRef::new(&self.store, self.settings.tab_length())
    }

    #[must_use]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Replace the settings. Layout is recomputed lazily if wrapping or the
    /// tab length changed.
    pub fn set_settings(&mut self, settings: EditorSettings) {
        if settings.wrap != self.settings.wrap || settings.tab_length() != self.settings.tab_length()
        {
            self.store.invalidate_layout();
        }
        self.history.set_max_history(settings.max_history);
        self.settings = settings;
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.store.text()
    }

    /// Replace the whole content, reset the caret and forget the history.
    pub fn set_text(&mut self, text: &str) {
        self.store.replace_lines(text);
        self.selection = Range::default();
        self.history.clear_history();
        debug!(lines = self.store.len(), "text replaced");
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn selection(&self) -> &Range {
        &self.selection
    }

    /// Replace the selection. Corners outside the buffer are rejected.
    pub fn set_selection(&mut self, range: Range) -> Result<()> {
        range.validate(self.buf())?;
        self.selection = range;
        Ok(())
    }

    pub fn select_all(&mut self) {
        let buf = BufferRef::new(&self.store, self.settings.tab_length());
        self.selection.select_all(buf);
    }

    /// Select the word under `place`, as on a double click. Returns `false`
    /// and leaves the selection alone when no word touches `place`.
    pub fn select_word_at(&mut self, place: Place) -> Result<bool> {
        let tab = self.settings.tab_length();
        let index = self.store.string_index(place, tab)?;
        let text = self.store[place.line].text();
        let Some(word) = word_at(&text, index) else {
            return Ok(false);
        };
        let anchor = self.store.place_of(place.line, word.start, tab)?;
        let caret = self.store.place_of(place.line, word.end, tab)?;
        self.selection = Range::new(caret, anchor);
        Ok(true)
    }

    /// Move the caret with one of the [`Range`] movement operations.
    ///
    /// ```
    /// use richtext_core::text::{Document, Place};
    ///
    /// let mut doc = Document::from_text("ab\ncd");
    /// doc.navigate(|sel, buf| sel.go_down(buf, false)).unwrap();
    /// doc.navigate(|sel, buf| sel.go_end(buf, true)).unwrap();
    /// assert_eq!(doc.selection().start(), Place::new(2, 1));
    /// assert_eq!(doc.selection().end(), Place::new(0, 1));
    /// ```
    pub fn navigate<F>(&mut self, movement: F) -> Result<()>
    where
        F: FnOnce(&mut Range, BufferRef<'_>) -> Result<()>,
    {
        let buf = BufferRef::new(&self.store, self.settings.tab_length());
        movement(&mut self.selection, buf)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Execute a command through the history.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        let mut ctx = EditContext::new(&mut self.store, &mut self.selection, &self.settings);
        self.history.execute(command, &mut ctx)
    }

    /// Run `command` after clearing a non-empty selection, as one undo step.
    fn replace_selection(&mut self, command: Command) -> Result<()> {
        if self.selection.is_empty() {
            self.execute(command)
        } else {
            self.execute(Command::group(vec![Command::clear_selected(), command]))
        }
    }

    /// Type `text` over the selection.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        if self.selection.is_column_mode() {
            return self.execute(Command::multi_range(ColumnAction::InsertText(text.to_owned())));
        }
        self.replace_selection(Command::insert_text(text))
    }

    /// Type one character over the selection.
    pub fn insert_char(&mut self, c: char) -> Result<()> {
        if self.selection.is_column_mode() {
            return self.execute(Command::multi_range(ColumnAction::InsertChar(c)));
        }
        self.replace_selection(Command::insert_char(c))
    }

    /// Delete the selection, or the character left of the caret.
    pub fn backspace(&mut self) -> Result<()> {
        if self.selection.is_column_mode() {
            return self.execute(Command::multi_range(ColumnAction::InsertChar('\u{8}')));
        }
        if self.selection.is_empty() {
            self.execute(Command::insert_char('\u{8}'))
        } else {
            self.execute(Command::clear_selected())
        }
    }

    /// Delete the selection, or the character right of the caret. At the end
    /// of a line this joins the next line.
    pub fn delete_forward(&mut self) -> Result<()> {
        if self.selection.is_column_mode() {
            if self.selection.is_empty() {
                let (top, bottom) = (self.selection.from().line, self.selection.to().line);
                let x = self.selection.from_x();
                self.selection = Range::column(Place::new(x + 1, bottom), Place::new(x, top));
            }
            return self.execute(Command::multi_range(ColumnAction::Clear));
        }
        if !self.selection.is_empty() {
            return self.execute(Command::clear_selected());
        }
        let mut extended = self.selection.clone();
        extended.go_right(self.buf(), true)?;
        if extended == self.selection {
            return Ok(());
        }
        self.execute(Command::group(vec![
            Command::select(extended),
            Command::clear_selected(),
        ]))
    }

    /// Delete the selection.
    pub fn clear_selected(&mut self) -> Result<()> {
        if self.selection.is_column_mode() {
            return self.execute(Command::multi_range(ColumnAction::Clear));
        }
        self.execute(Command::clear_selected())
    }

    /// Remove whole lines.
    pub fn remove_lines(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<()> {
        self.execute(Command::remove_lines(indices))
    }

    /// Lines touched by the selection. A multi-line selection ending at
    /// column 0 does not include its last line.
    fn selected_lines(&self) -> std::ops::RangeInclusive<usize> {
        let (from, to) = (self.selection.from(), self.selection.to());
        let last = if to.line > from.line && to.column == 0 {
            to.line - 1
        } else {
            to.line
        };
        from.line..=last
    }

    fn select_lines(&mut self, lines: std::ops::RangeInclusive<usize>) -> Result<()> {
        let (first, last) = (*lines.start(), *lines.end());
        let width = self.store.display_width(last, self.settings.tab_length())?;
        self.selection = Range::new(Place::new(width, last), Place::new(0, first));
        Ok(())
    }

    /// Indent the selected lines by one tab stop. With an empty selection
    /// this types a tab.
    pub fn increase_indent(&mut self) -> Result<()> {
        if self.selection.is_empty() {
            return self.insert_char('\t');
        }
        self.selection.validate(self.buf())?;
        let lines = self.selected_lines();
        let mut members = Vec::new();
        for line in lines.clone() {
            if self.store.line(line)?.is_empty() {
                continue;
            }
            members.push(Command::select(Range::caret(Place::new(0, line))));
            members.push(Command::insert_text("\t"));
        }
        if !members.is_empty() {
            self.execute(Command::group(members))?;
        }
        self.select_lines(lines)
    }

    /// Remove up to one tab stop of leading whitespace from the selected
    /// lines (or the caret line).
    pub fn decrease_indent(&mut self) -> Result<()> {
        self.selection.validate(self.buf())?;
        let tab = self.settings.tab_length();
        let lines = self.selected_lines();
        let mut members = Vec::new();
        for index in lines.clone() {
            let line = self.store.line(index)?;
            let count = if line.get(0).is_some_and(|cell| cell.is_tab()) {
                1
            } else {
                line.start_spaces_count().min(tab)
            };
            if count == 0 {
                continue;
            }
            let end = line.string_to_display(count, tab);
            members.push(Command::select(Range::new(
                Place::new(0, index),
                Place::new(end, index),
            )));
            members.push(Command::clear_selected());
        }
        if members.is_empty() {
            return Ok(());
        }
        let keep_caret = self.selection.is_empty();
        self.execute(Command::group(members))?;
        if keep_caret {
            return Ok(());
        }
        self.select_lines(lines)
    }

    /// Mark fold boundaries on lines matching the two patterns.
    pub fn set_folding_markers(&mut self, start: &str, end: &str) -> Result<()> {
        self.execute(Command::set_folding_markers(start, end))
    }

    /// Replace every range with `text` as one undo step.
    pub fn replace_ranges(&mut self, ranges: Vec<Range>, text: &str) -> Result<()> {
        if ranges.is_empty() {
            return Ok(());
        }
        self.execute(Command::replace(ranges, text))
    }

    /// Replace every match of `pattern` with the literal `replacement`.
    /// Returns the number of matches.
    pub fn replace_all(&mut self, pattern: &str, replacement: &str) -> Result<usize> {
        let found = self.find_all(pattern)?;
        let count = found.len();
        self.replace_ranges(found, replacement)?;
        Ok(count)
    }

    /// Every match of `pattern` in the document.
    pub fn find_all(&self, pattern: &str) -> Result<Vec<Range>> {
        let buf = self.buf();
        Range::all(buf).find_ranges(buf, pattern)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<bool> {
        let mut ctx = EditContext::new(&mut self.store, &mut self.selection, &self.settings);
        self.history.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let mut ctx = EditContext::new(&mut self.store, &mut self.selection, &self.settings);
        self.history.redo(&mut ctx)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
    }

    /// Open a transaction: commands until the matching [`Self::end_group`]
    /// undo together.
    pub fn begin_group(&mut self) {
        self.history.begin_group();
    }

    pub fn end_group(&mut self) {
        self.history.end_group();
    }

    /// Coalesce change notifications until the matching [`Self::end_update`].
    pub fn begin_update(&mut self) {
        self.store.begin_update();
    }

    pub fn end_update(&mut self) {
        self.store.end_update();
    }

    #[must_use]
    pub fn history(&self) -> &CommandManager {
        &self.history
    }

    // ------------------------------------------------------------------
    // Styles and notifications
    // ------------------------------------------------------------------

    /// Register a style layer, returning its slot.
    pub fn add_style(&mut self, style: Style) -> Result<usize> {
        self.store.add_style(style)
    }

    /// Add style layers to every character of `range`.
    pub fn set_style(&mut self, range: &Range, mask: StyleIndex) -> Result<()> {
        range.set_style(&mut self.store, self.settings.tab_length(), mask)
    }

    /// Combined style of the character right of `place`. Later layers win
    /// for colors; attributes accumulate.
    pub fn style_at(&self, place: Place) -> Result<Style> {
        let mask = Range::style_at(self.buf(), place)?;
        Ok(self.store.merged_style(mask))
    }

    pub fn clear_style(&mut self, range: &Range, mask: StyleIndex) -> Result<()> {
        range.clear_style(&mut self.store, self.settings.tab_length(), mask)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TextEvent) + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn set_text_changing_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut TextChanging) + 'static,
    {
        self.store.set_text_changing_handler(handler);
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Recompute wrap cut-offs of every stale line.
    pub fn relayout(&mut self) -> Option<(usize, usize)> {
        self.store
            .recalc_word_wrap(self.settings.tab_length(), &self.settings.wrap)
    }

    /// Total number of display rows.
    pub fn row_count(&mut self) -> usize {
        self.relayout();
        (0..self.store.len())
            .filter_map(|i| self.store.line_info(i).ok())
            .map(|info| info.rows())
            .sum()
    }

    /// Wrapped row of `place` within its line, and its column within that
    /// row.
    pub fn wrapped_position(&mut self, place: Place) -> Result<(usize, usize)> {
        self.relayout();
        let tab = self.settings.tab_length();
        let index = self.store.string_index(place, tab)?;
        let info = self.store.line_info(place.line)?;
        let row = info.row_of(index);
        let row_start = info.row_start(row);
        let line = &self.store[place.line];
        Ok((
            row,
            line.string_to_display(index, tab) - line.string_to_display(row_start, tab),
        ))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Most common terminator among the first lines.
    #[must_use]
    pub fn detect_eol(&self) -> EolFormat {
        self.store.detect_eol(DEFAULT_DETECT_LINES)
    }

    /// Load a file, replacing the content and history.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        encoding: Option<TextEncoding>,
    ) -> Result<TextEncoding> {
        let encoding = self.store.load_from_file(path, encoding)?;
        self.selection = Range::default();
        self.history.clear_history();
        Ok(encoding)
    }

    /// Save one record per line. Lines without a terminator (other than the
    /// last) get the configured default.
    pub fn save_file(&self, path: impl AsRef<Path>, encoding: TextEncoding) -> Result<()> {
        self.store
            .save_to_file(path, encoding, self.settings.default_eol)
    }
}
