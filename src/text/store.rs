//! Ordered, identity-stable collection of lines.
//!
//! [`LineStore`] owns the lines of a buffer together with:
//!
//! - the style-layer table (slot `n` ↔ bit `n` of every cell's mask),
//! - the text version, bumped on every mutation and used to invalidate
//!   caches such as a range's flattened text,
//! - per-line wrap layout ([`LineInfo`]) kept parallel to the lines,
//! - the listener registry that receives structural notifications.
//!
//! # Examples
//!
//! ```
//! use richtext_core::text::{EolFormat, LineStore};
//!
//! let store = LineStore::from_text("one\r\ntwo\nthree");
//! assert_eq!(store.len(), 3);
//! assert_eq!(store[0].eol(), EolFormat::CrLf);
//! assert_eq!(store[1].eol(), EolFormat::Lf);
//! assert_eq!(store.text(), "one\r\ntwo\nthree");
//! ```

use crate::cell::Char;
use crate::error::{Error, Result};
use crate::event::{ListenerId, Listeners, TextChanging, TextEvent};
use crate::style::{Style, StyleCapacity, StyleIndex};
use crate::text::encoding::TextEncoding;
use crate::text::eol::{self, EolFormat};
use crate::text::line::{Line, LineId};
use crate::text::place::Place;
use crate::text::tabs::TabSnap;
use crate::text::wrap::{self, LineInfo, WrapOptions};
use std::ops::Index;
use std::path::Path;
use tracing::{debug, trace};

/// Lines of a buffer plus the state shared by everything that edits them.
#[derive(Debug)]
pub struct LineStore {
    lines: Vec<Line>,
    infos: Vec<LineInfo>,
    styles: Vec<Option<Style>>,
    capacity: StyleCapacity,
    version: u64,
    next_id: u64,
    listeners: Listeners,
    update_depth: usize,
    pending_change: Option<(usize, usize)>,
    pending_recalc: Option<(usize, usize)>,
}

const fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn widen(span: Option<(usize, usize)>, from: usize, to: usize) -> (usize, usize) {
    span.map_or((from, to), |(f, t)| (f.min(from), t.max(to)))
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStore {
    /// Create an empty store with a 32-layer style table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_style_capacity(StyleCapacity::default())
    }

    /// Create an empty store with the given style table size.
    #[must_use]
    pub fn with_style_capacity(capacity: StyleCapacity) -> Self {
        Self {
            lines: Vec::new(),
            infos: Vec::new(),
            styles: vec![None; capacity.slots()],
            capacity,
            version: 0,
            next_id: 0,
            listeners: Listeners::default(),
            update_depth: 0,
            pending_change: None,
            pending_recalc: None,
        }
    }

    /// Build a store from text, keeping each line's terminator.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut store = Self::new();
        store.replace_lines(text);
        store
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    pub(crate) fn check_line(&self, index: usize) -> Result<()> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(Error::LineOutOfRange {
                line: index,
                count: self.lines.len(),
            })
        }
    }

    /// Line at `index`, or a range error.
    pub fn line(&self, index: usize) -> Result<&Line> {
        self.check_line(index)?;
        Ok(&self.lines[index])
    }

    /// Mutable line access. Counts as a mutation: the text version advances
    /// and the line's wrap layout is marked stale.
    pub fn line_mut(&mut self, index: usize) -> Result<&mut Line> {
        self.check_line(index)?;
        self.bump_version();
        self.infos[index].mark_dirty();
        Ok(&mut self.lines[index])
    }

    /// Current text version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Hand out the next line identity. Identities are never reused.
    pub fn generate_unique_id(&mut self) -> LineId {
        self.next_id += 1;
        LineId(self.next_id)
    }

    /// Create a detached empty line with a fresh identity.
    pub fn create_line(&mut self) -> Line {
        let id = self.generate_unique_id();
        Line::new(id)
    }

    /// Insert a line before `index` (`index == len` appends).
    pub fn insert_line(&mut self, index: usize, line: Line) -> Result<()> {
        self.insert_lines(index, vec![line])
    }

    /// Insert several lines before `index`.
    pub fn insert_lines(&mut self, index: usize, lines: Vec<Line>) -> Result<()> {
        if index > self.lines.len() {
            return Err(Error::LineOutOfRange {
                line: index,
                count: self.lines.len(),
            });
        }
        let count = lines.len();
        if count == 0 {
            return Ok(());
        }
        self.infos
            .splice(index..index, (0..count).map(|_| LineInfo::new_dirty()));
        self.lines.splice(index..index, lines);
        self.bump_version();
        trace!(index, count, "lines inserted");
        self.listeners
            .emit(&TextEvent::LineInserted { index, count });
        Ok(())
    }

    /// Remove `count` lines starting at `index`, returning them.
    pub fn remove_lines(&mut self, index: usize, count: usize) -> Result<Vec<Line>> {
        let end = index
            .checked_add(count)
            .filter(|&end| end <= self.lines.len())
            .ok_or(Error::LineOutOfRange {
                line: index.saturating_add(count),
                count: self.lines.len(),
            })?;
        if count == 0 {
            return Ok(Vec::new());
        }
        self.infos.drain(index..end);
        let removed: Vec<Line> = self.lines.drain(index..end).collect();
        self.bump_version();
        let removed_ids = removed.iter().map(Line::id).collect();
        trace!(index, count, "lines removed");
        self.listeners.emit(&TextEvent::LineRemoved {
            index,
            count,
            removed_ids,
        });
        Ok(removed)
    }

    /// Replace every line with the content of `text`.
    ///
    /// Fires `LineRemoved` for the old lines and `LineInserted` for the new
    /// ones. Empty text yields a single empty line.
    pub fn replace_lines(&mut self, text: &str) {
        let old = self.lines.len();
        // Removing everything that exists cannot fail.
        let _ = self.remove_lines(0, old);
        let lines: Vec<Line> = eol::split_lines(text)
            .into_iter()
            .map(|(content, eol)| {
                let mut line = self.create_line();
                line.append_range(content.chars().map(Char::new));
                line.set_eol(eol);
                line.set_changed(false);
                line
            })
            .collect();
        let _ = self.insert_lines(0, lines);
    }

    /// Full text with every line's own terminator. A line other than the
    /// last one that has no terminator is joined with LF.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        let last = self.lines.len().saturating_sub(1);
        for (i, line) in self.lines.iter().enumerate() {
            out.extend(line.chars());
            if i < last && line.eol().is_none() {
                out.push('\n');
            } else {
                out.push_str(line.eol().as_str());
            }
        }
        out
    }

    /// Majority-vote terminator over the first `max_lines` lines.
    #[must_use]
    pub fn detect_eol(&self, max_lines: usize) -> EolFormat {
        EolFormat::vote(self.lines.iter().take(max_lines).map(Line::eol))
    }

    // ------------------------------------------------------------------
    // Coordinates
    // ------------------------------------------------------------------

    /// Display width of a line.
    pub fn display_width(&self, line: usize, tab_length: usize) -> Result<usize> {
        Ok(self.line(line)?.display_width(tab_length))
    }

    /// Reject places outside the buffer.
    pub fn check_place(&self, place: Place, tab_length: usize) -> Result<()> {
        let width = self.display_width(place.line, tab_length)?;
        if place.column > width {
            return Err(Error::ColumnOutOfRange {
                line: place.line,
                column: place.column,
                width,
            });
        }
        Ok(())
    }

    /// String index of a place, resolving columns inside tabs with the
    /// center-of-tab rule.
    pub fn string_index(&self, place: Place, tab_length: usize) -> Result<usize> {
        self.check_place(place, tab_length)?;
        Ok(self.lines[place.line].display_to_string(place.column, tab_length, TabSnap::Nearest))
    }

    /// Place of string index `index` on `line`.
    pub fn place_of(&self, line: usize, index: usize, tab_length: usize) -> Result<Place> {
        let l = self.line(line)?;
        if index > l.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: l.len(),
            });
        }
        Ok(Place::new(l.string_to_display(index, tab_length), line))
    }

    /// Absolute character position of a place, counting terminators.
    pub fn place_to_position(&self, place: Place, tab_length: usize) -> Result<usize> {
        let index = self.string_index(place, tab_length)?;
        let before: usize = self.lines[..place.line]
            .iter()
            .map(|line| line.len() + line.eol().len())
            .sum();
        Ok(before + index)
    }

    /// Place of an absolute character position.
    ///
    /// A position inside a CRLF pair maps to the end of its line.
    pub fn position_to_place(&self, position: usize, tab_length: usize) -> Result<Place> {
        let mut remaining = position;
        for (i, line) in self.lines.iter().enumerate() {
            let full = line.len() + line.eol().len();
            if remaining <= line.len() {
                return self.place_of(i, remaining, tab_length);
            }
            if remaining < full || i + 1 == self.lines.len() {
                if remaining < full {
                    return self.place_of(i, line.len(), tab_length);
                }
                break;
            }
            remaining -= full;
        }
        Err(Error::IndexOutOfRange {
            index: position,
            len: self.lines.iter().map(|l| l.len() + l.eol().len()).sum(),
        })
    }

    // ------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------

    #[must_use]
    pub fn style_capacity(&self) -> StyleCapacity {
        self.capacity
    }

    /// Register a style, returning its slot. A style already in the table
    /// returns its existing slot.
    pub fn add_style(&mut self, style: Style) -> Result<usize> {
        if let Some(slot) = self.get_style_index(&style) {
            return Ok(slot);
        }
        let slot = self
            .styles
            .iter()
            .position(Option::is_none)
            .ok_or(Error::StyleCapacity {
                capacity: self.capacity.slots(),
            })?;
        self.styles[slot] = Some(style);
        debug!(slot, "style registered");
        Ok(slot)
    }

    /// Slot of a registered style.
    #[must_use]
    pub fn get_style_index(&self, style: &Style) -> Option<usize> {
        self.styles.iter().position(|s| s.as_ref() == Some(style))
    }

    /// Mask with the layers of every given style that is registered.
    #[must_use]
    pub fn style_mask(&self, styles: &[Style]) -> StyleIndex {
        styles
            .iter()
            .filter_map(|style| self.get_style_index(style))
            .fold(StyleIndex::NONE, |mask, slot| mask | StyleIndex::layer(slot))
    }

    #[must_use]
    pub fn style(&self, slot: usize) -> Option<&Style> {
        self.styles.get(slot).and_then(Option::as_ref)
    }

    /// Styles whose layers are set in `mask`.
    pub fn styles_of(&self, mask: StyleIndex) -> impl Iterator<Item = &Style> + '_ {
        mask.layers().filter_map(|slot| self.style(slot))
    }

    /// All layers of `mask` folded into one style, higher slots on top.
    #[must_use]
    pub fn merged_style(&self, mask: StyleIndex) -> Style {
        self.styles_of(mask)
            .fold(Style::default(), |acc, style| acc.merge(*style))
    }

    /// Free a slot and strip its layer from every character.
    pub fn remove_style(&mut self, slot: usize) -> Option<Style> {
        let style = self.styles.get_mut(slot)?.take()?;
        let mask = StyleIndex::layer(slot);
        for line in &mut self.lines {
            line.clear_style_all(mask);
        }
        debug!(slot, "style removed");
        Some(style)
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Register a listener for structural and content notifications.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TextEvent) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Install the hook that may rewrite or cancel inserted text.
    pub fn set_text_changing_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut TextChanging) + 'static,
    {
        self.listeners.set_changing_handler(handler);
    }

    pub fn clear_text_changing_handler(&mut self) {
        self.listeners.clear_changing_handler();
    }

    /// Run the text-changing hook; `None` means the edit was cancelled.
    pub fn text_changing(&mut self, text: String) -> Option<String> {
        self.listeners.text_changing(text)
    }

    /// Start coalescing `TextChanged` and `RecalcNeeded` notifications.
    /// Nests.
    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    /// Leave one update level; the outermost level fires the union of every
    /// change recorded inside it.
    pub fn end_update(&mut self) {
        self.update_depth = self.update_depth.saturating_sub(1);
        if self.update_depth > 0 {
            return;
        }
        if let Some((from_line, to_line)) = self.pending_recalc.take() {
            self.listeners
                .emit(&TextEvent::RecalcNeeded { from_line, to_line });
        }
        if let Some((from_line, to_line)) = self.pending_change.take() {
            self.listeners
                .emit(&TextEvent::TextChanged { from_line, to_line });
        }
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.update_depth > 0
    }

    /// Report that lines `from..=to` changed.
    pub fn on_text_changed(&mut self, from: usize, to: usize) {
        let (from, to) = ordered(from, to);
        if self.update_depth > 0 {
            self.pending_change = Some(widen(self.pending_change, from, to));
            return;
        }
        self.listeners.emit(&TextEvent::TextChanged {
            from_line: from,
            to_line: to,
        });
    }

    /// Mark the layout of lines `from..=to` stale.
    pub fn need_recalc(&mut self, from: usize, to: usize) {
        let (from, to) = ordered(from, to);
        let last = self.infos.len().saturating_sub(1);
        if let Some(infos) = self.infos.get_mut(from..=to.min(last)) {
            for info in infos {
                info.mark_dirty();
            }
        }
        if self.update_depth > 0 {
            self.pending_recalc = Some(widen(self.pending_recalc, from, to));
            return;
        }
        self.listeners.emit(&TextEvent::RecalcNeeded {
            from_line: from,
            to_line: to,
        });
    }

    // ------------------------------------------------------------------
    // Wrap layout
    // ------------------------------------------------------------------

    /// Wrap layout of a line.
    pub fn line_info(&self, index: usize) -> Result<&LineInfo> {
        self.check_line(index)?;
        Ok(&self.infos[index])
    }

    /// Recompute the cut-offs of every stale line.
    ///
    /// Returns the recomputed span and fires `RecalcWordWrap` for it.
    pub fn recalc_word_wrap(
        &mut self,
        tab_length: usize,
        opts: &WrapOptions,
    ) -> Option<(usize, usize)> {
        let mut span: Option<(usize, usize)> = None;
        for (i, (line, info)) in self.lines.iter().zip(self.infos.iter_mut()).enumerate() {
            if !info.is_dirty() {
                continue;
            }
            let chars: Vec<char> = line.chars().collect();
            info.set_cut_offs(wrap::cut_offs(&chars, tab_length, opts));
            span = Some(span.map_or((i, i), |(from, _)| (from, i)));
        }
        if let Some((from_line, to_line)) = span {
            trace!(from_line, to_line, "word wrap recomputed");
            self.listeners
                .emit(&TextEvent::RecalcWordWrap { from_line, to_line });
        }
        span
    }

    /// Mark every line's layout stale (after the wrap options changed).
    pub fn invalidate_layout(&mut self) {
        for info in &mut self.infos {
            info.mark_dirty();
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Replace the content with a file's text.
    ///
    /// `encoding` of `None` sniffs a byte order mark. Returns the encoding
    /// used.
    pub fn load_from_file(
        &mut self,
        path: impl AsRef<Path>,
        encoding: Option<TextEncoding>,
    ) -> Result<TextEncoding> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let encoding = encoding.unwrap_or_else(|| TextEncoding::detect(&bytes));
        let text = encoding.decode(&bytes)?;
        self.replace_lines(&text);
        debug!(path = %path.display(), ?encoding, lines = self.len(), "loaded");
        Ok(encoding)
    }

    /// Write one record per line.
    ///
    /// Each line is followed by its own terminator. A non-final line without
    /// one gets `fallback_eol` (LF if that is `None`); the final record is
    /// never terminated.
    pub fn save_to_file(
        &self,
        path: impl AsRef<Path>,
        encoding: TextEncoding,
        fallback_eol: EolFormat,
    ) -> Result<()> {
        let path = path.as_ref();
        let fallback = if fallback_eol.is_none() {
            EolFormat::Lf
        } else {
            fallback_eol
        };
        let mut text = String::new();
        let last = self.lines.len().saturating_sub(1);
        for (i, line) in self.lines.iter().enumerate() {
            text.extend(line.chars());
            if i < last {
                let eol = if line.eol().is_none() {
                    fallback
                } else {
                    line.eol()
                };
                text.push_str(eol.as_str());
            }
        }
        std::fs::write(path, encoding.encode(&text))?;
        debug!(path = %path.display(), ?encoding, lines = self.len(), "saved");
        Ok(())
    }
}

impl Index<usize> for LineStore {
    type Output = Line;

    fn index(&self, index: usize) -> &Line {
        &self.lines[index]
    }
}

impl<'a> IntoIterator for &'a LineStore {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
