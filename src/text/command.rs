//! Reversible edit commands.
//!
//! A [`Command`] pairs what to do ([`CommandKind`]) with what it takes to
//! take it back: the selection before and after, and the list of primitive
//! edits it applied. Undo replays those edits backwards and restores the
//! selection; redo restores the selection and runs the command again.
//!
//! Commands never reach for ambient state. Everything they touch arrives in
//! an [`EditContext`].
//!
//! Every command validates its addresses before touching the buffer. If an
//! edit still fails midway, the edits already applied are rolled back, so a
//! failing command leaves the buffer as it found it.

use crate::cell::Char;
use crate::error::{Error, Result};
use crate::text::eol::{self, EolFormat};
use crate::text::line::Line;
use crate::text::place::Place;
use crate::text::range::{BufferRef, Range};
use crate::text::settings::EditorSettings;
use crate::text::store::LineStore;
use crate::text::tabs::{self, TabSnap};
use regex::Regex;

/// Everything a command may read or change.
#[derive(Debug)]
pub struct EditContext<'a> {
    pub store: &'a mut LineStore,
    pub selection: &'a mut Range,
    pub settings: &'a EditorSettings,
    /// Last character typed through `InsertChar`/`InsertText`.
    pub(crate) last_char: Option<char>,
    allow_line_insertion: bool,
}

impl<'a> EditContext<'a> {
    pub fn new(
        store: &'a mut LineStore,
        selection: &'a mut Range,
        settings: &'a EditorSettings,
    ) -> Self {
        Self {
            store,
            selection,
            settings,
            last_char: None,
            allow_line_insertion: settings.multiline,
        }
    }

    /// Read access for range queries.
    #[must_use]
    pub fn buf(&self) -> BufferRef<'_> {
        BufferRef::new(&*self.store, self.settings.tab_length())
    }

    fn tab(&self) -> usize {
        self.settings.tab_length()
    }

    /// Caret as (line, string index).
    fn caret(&self) -> Result<(usize, usize)> {
        let place = self.selection.start();
        let index = self.store.string_index(place, self.tab())?;
        Ok((place.line, index))
    }

    fn place_caret(&mut self, line: usize, index: usize) -> Result<()> {
        let place = self.store.place_of(line, index, self.tab())?;
        self.selection.set_start(place);
        Ok(())
    }

    fn changed(&mut self, from: usize, to: usize) {
        self.store.on_text_changed(from, to);
        self.store.need_recalc(from, to);
    }

    fn check_insertable(&self, text: &str) -> Result<()> {
        if !self.allow_line_insertion && text.contains(['\n', '\r']) {
            return Err(Error::InvalidOperation("line breaks are not allowed here"));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Primitives. Each one applies a change and records how to revert it.
    // ------------------------------------------------------------------

    fn insert_cells(
        &mut self,
        edits: &mut Vec<Edit>,
        line: usize,
        index: usize,
        cells: &[Char],
    ) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }
        self.store.line_mut(line)?.insert_range(index, cells)?;
        edits.push(Edit::Insert {
            line,
            index,
            count: cells.len(),
        });
        self.changed(line, line);
        Ok(())
    }

    fn delete_cells(
        &mut self,
        edits: &mut Vec<Edit>,
        line: usize,
        index: usize,
        count: usize,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let cells = self.store.line_mut(line)?.remove_range(index, count)?;
        edits.push(Edit::Delete { line, index, cells });
        self.changed(line, line);
        Ok(())
    }

    fn set_eol(&mut self, edits: &mut Vec<Edit>, line: usize, eol: EolFormat) -> Result<()> {
        let target = self.store.line_mut(line)?;
        let old = target.eol();
        target.set_eol(eol);
        edits.push(Edit::SetEol { line, old });
        Ok(())
    }

    /// Split `line` at `index`. The new trailing line keeps the original
    /// terminator; the leading line ends with `leading_eol`.
    fn break_line(
        &mut self,
        edits: &mut Vec<Edit>,
        line: usize,
        index: usize,
        leading_eol: EolFormat,
        typed: bool,
    ) -> Result<()> {
        let head = self.store.line_mut(line)?;
        let tail = head.split_off(index)?;
        let eol = head.eol();
        head.set_eol(leading_eol);
        let indent: Vec<Char> = if typed && self.settings.auto_indent {
            head.indent_text().chars().map(Char::new).collect()
        } else {
            Vec::new()
        };

        let mut new_line = self.store.create_line();
        new_line.append_range(indent.iter().copied().chain(tail));
        new_line.set_eol(eol);
        new_line.set_auto_indent(indent.len());
        self.store.insert_line(line + 1, new_line)?;

        edits.push(Edit::Break {
            line,
            index,
            eol,
            indent: indent.len(),
        });
        self.changed(line, line + 1);
        self.place_caret(line + 1, indent.len())
    }

    /// Absorb line `line + 1` into `line`. The survivor ends with the
    /// absorbed line's terminator. An empty `line` is simply removed.
    fn merge_lines(&mut self, edits: &mut Vec<Edit>, line: usize) -> Result<()> {
        if line + 1 >= self.store.len() {
            return Err(Error::LineOutOfRange {
                line: line + 1,
                count: self.store.len(),
            });
        }
        if self.store.line(line)?.is_empty() {
            let removed = self.store.remove_lines(line, 1)?;
            let eol = removed.first().map_or(EolFormat::None, Line::eol);
            edits.push(Edit::Merge {
                line,
                at: 0,
                eol,
                removed_empty: true,
            });
        } else {
            let next = self.store.remove_lines(line + 1, 1)?;
            let target = self.store.line_mut(line)?;
            let at = target.len();
            let eol = target.eol();
            if let Some(next) = next.first() {
                target.append_range(next.cells().iter().copied());
                target.set_eol(next.eol());
            }
            edits.push(Edit::Merge {
                line,
                at,
                eol,
                removed_empty: false,
            });
        }
        self.changed(line, line);
        Ok(())
    }

    fn remove_line_range(&mut self, edits: &mut Vec<Edit>, index: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let lines = self.store.remove_lines(index, count)?;
        edits.push(Edit::RemoveLines { index, lines });
        let line = index.min(self.store.len().saturating_sub(1));
        self.changed(line, line);
        Ok(())
    }

    /// Type one character at the caret. Only `typed` line breaks are
    /// auto-indented; pasted text keeps its own leading whitespace.
    fn type_char(&mut self, edits: &mut Vec<Edit>, c: char, typed: bool) -> Result<()> {
        let (line, index) = self.caret()?;
        match c {
            '\n' | '\r' => {
                if !self.allow_line_insertion {
                    return Err(Error::InvalidOperation("line breaks are not allowed here"));
                }
                let default = self.settings.default_eol;
                if c == '\n'
                    && self.last_char == Some('\r')
                    && line > 0
                    && index == self.store.line(line)?.auto_indent()
                {
                    let previous = self.store.line(line - 1)?.eol();
                    if previous == EolFormat::Cr {
                        self.set_eol(edits, line - 1, EolFormat::CrLf)?;
                        self.changed(line - 1, line - 1);
                        self.last_char = Some(c);
                        return Ok(());
                    }
                    if !default.is_none() && previous == default {
                        // The CR already produced the configured break.
                        self.last_char = Some(c);
                        return Ok(());
                    }
                }
                let eol = match (default, c) {
                    (EolFormat::None, '\r') => EolFormat::Cr,
                    (EolFormat::None, _) => EolFormat::Lf,
                    (eol, _) => eol,
                };
                self.break_line(edits, line, index, eol, typed)?;
            }
            '\u{8}' => {
                if index > 0 {
                    self.delete_cells(edits, line, index - 1, 1)?;
                    self.place_caret(line, index - 1)?;
                } else if line > 0 && self.allow_line_insertion {
                    let at = self.store.line(line - 1)?.len();
                    self.merge_lines(edits, line - 1)?;
                    self.place_caret(line - 1, at)?;
                }
            }
            '\t' if self.settings.convert_tabs_to_spaces => {
                let column = self.store.place_of(line, index, self.tab())?.column;
                let count = tabs::tab_width(column, self.tab());
                let spaces = vec![Char::new(' '); count];
                self.insert_cells(edits, line, index, &spaces)?;
                self.place_caret(line, index + count)?;
            }
            _ => {
                self.insert_cells(edits, line, index, &[Char::new(c)])?;
                self.place_caret(line, index + 1)?;
            }
        }
        self.last_char = Some(c);
        Ok(())
    }

    fn insert_string(&mut self, edits: &mut Vec<Edit>, text: &str, typed: bool) -> Result<()> {
        self.check_insertable(text)?;
        self.caret()?;
        for c in text.chars() {
            self.type_char(edits, c, typed)?;
        }
        Ok(())
    }

    /// Delete the selected text and collapse the selection to its start.
    fn clear_selected(&mut self, edits: &mut Vec<Edit>) -> Result<()> {
        if self.selection.is_column_mode() {
            return self.clear_column(edits);
        }
        let (from, to) = (self.selection.from(), self.selection.to());
        let from_index = self.store.string_index(from, self.tab())?;
        let to_index = self.store.string_index(to, self.tab())?;
        if from == to {
            return Ok(());
        }
        if from.line == to.line {
            self.delete_cells(edits, from.line, from_index, to_index - from_index)?;
        } else {
            self.delete_cells(edits, to.line, 0, to_index)?;
            self.remove_line_range(edits, from.line + 1, to.line - from.line - 1)?;
            let len = self.store.line(from.line)?.len();
            self.delete_cells(edits, from.line, from_index, len - from_index)?;
            self.merge_lines(edits, from.line)?;
        }
        self.place_caret(from.line, from_index)
    }

    fn clear_column(&mut self, edits: &mut Vec<Edit>) -> Result<()> {
        if self.selection.is_empty() {
            return Ok(());
        }
        let (top, bottom) = (self.selection.from().line, self.selection.to().line);
        let x = self.selection.from_x();
        let segments = self.selection.segments(self.buf())?;
        for seg in segments {
            self.delete_cells(edits, seg.line, seg.from, seg.to - seg.from)?;
        }
        *self.selection = Range::column(Place::new(x, bottom), Place::new(x, top));
        Ok(())
    }
}

/// A primitive change and the data needed to revert it.
#[derive(Clone, Debug)]
pub(crate) enum Edit {
    /// `count` cells inserted at `index`.
    Insert {
        line: usize,
        index: usize,
        count: usize,
    },
    /// Cells removed from `index`.
    Delete {
        line: usize,
        index: usize,
        cells: Vec<Char>,
    },
    /// `line` split at `index`; `eol` is its terminator before the split and
    /// `indent` the cells prepended to the new line.
    Break {
        line: usize,
        index: usize,
        eol: EolFormat,
        indent: usize,
    },
    /// Line `line + 1` merged into `line` at `at`; `eol` is the terminator
    /// `line` had before. With `removed_empty`, the empty `line` was removed
    /// instead.
    Merge {
        line: usize,
        at: usize,
        eol: EolFormat,
        removed_empty: bool,
    },
    SetEol {
        line: usize,
        old: EolFormat,
    },
    InsertLines {
        index: usize,
        count: usize,
    },
    RemoveLines {
        index: usize,
        lines: Vec<Line>,
    },
    Fold {
        line: usize,
        start: Option<String>,
        end: Option<String>,
    },
}

impl Edit {
    fn revert(&self, ctx: &mut EditContext<'_>) -> Result<()> {
        match self {
            Self::Insert { line, index, count } => {
                ctx.store.line_mut(*line)?.remove_range(*index, *count)?;
                ctx.changed(*line, *line);
            }
            Self::Delete { line, index, cells } => {
                ctx.store.line_mut(*line)?.insert_range(*index, cells)?;
                ctx.changed(*line, *line);
            }
            Self::Break {
                line, eol, indent, ..
            } => {
                let removed = ctx.store.remove_lines(line + 1, 1)?;
                let head = ctx.store.line_mut(*line)?;
                if let Some(tail) = removed.first() {
                    head.append_range(tail.cells().iter().skip(*indent).copied());
                }
                head.set_eol(*eol);
                ctx.changed(*line, *line);
            }
            Self::Merge {
                line,
                at,
                eol,
                removed_empty,
            } => {
                let mut restored = ctx.store.create_line();
                if *removed_empty {
                    restored.set_eol(*eol);
                    ctx.store.insert_line(*line, restored)?;
                } else {
                    let head = ctx.store.line_mut(*line)?;
                    let tail = head.split_off(*at)?;
                    restored.append_range(tail);
                    restored.set_eol(head.eol());
                    head.set_eol(*eol);
                    ctx.store.insert_line(line + 1, restored)?;
                }
                ctx.changed(*line, line + 1);
            }
            Self::SetEol { line, old } => {
                ctx.store.line_mut(*line)?.set_eol(*old);
                ctx.changed(*line, *line);
            }
            Self::InsertLines { index, count } => {
                ctx.store.remove_lines(*index, *count)?;
                let line = (*index).min(ctx.store.len().saturating_sub(1));
                ctx.changed(line, line);
            }
            Self::RemoveLines { index, lines } => {
                let restored: Vec<Line> = lines
                    .iter()
                    .map(|snapshot| {
                        let mut line = ctx.store.create_line();
                        line.take_content(snapshot);
                        line
                    })
                    .collect();
                let count = restored.len();
                ctx.store.insert_lines(*index, restored)?;
                ctx.changed(*index, index + count.saturating_sub(1));
            }
            Self::Fold { line, start, end } => {
                let target = ctx.store.line_mut(*line)?;
                target.set_fold_start(start.clone());
                target.set_fold_end(end.clone());
            }
        }
        Ok(())
    }
}

/// What a column-mode edit does on every covered line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnAction {
    InsertChar(char),
    InsertText(String),
    Clear,
}

/// The kinds of edit.
#[derive(Clone, Debug)]
pub enum CommandKind {
    /// Type one character: `\n`/`\r` break the line, `\u{8}` is backspace,
    /// `\t` may expand to spaces.
    InsertChar(char),
    /// Type a string character by character.
    InsertText(String),
    /// Delete the selection.
    ClearSelected,
    /// Remove whole lines by index.
    RemoveLines(Vec<usize>),
    /// Change only the selection.
    Select(Range),
    /// Apply an action to every line of a column selection.
    MultiRange(ColumnAction),
    /// Replace every range with the same text.
    Replace { ranges: Vec<Range>, text: String },
    /// Mark lines matching `start`/`end` as fold boundaries.
    SetFoldingMarkers { start: String, end: String },
    /// Run members in order; undo them in reverse.
    Group(Vec<Command>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Initial,
    Executed,
    Undone,
}

/// A reversible edit.
#[derive(Clone, Debug)]
pub struct Command {
    kind: CommandKind,
    state: State,
    sel_before: Range,
    sel_after: Range,
    edits: Vec<Edit>,
    /// Previously typed character seen by the first run, for CR LF pairing.
    last_char_before: Option<char>,
    /// Text after the text-changing hook ran; `None` until the first run.
    resolved: Option<String>,
    cancelled: bool,
}

impl Command {
    #[must_use]
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            state: State::Initial,
            sel_before: Range::default(),
            sel_after: Range::default(),
            edits: Vec::new(),
            last_char_before: None,
            resolved: None,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn insert_char(c: char) -> Self {
        Self::new(CommandKind::InsertChar(c))
    }

    #[must_use]
    pub fn insert_text(text: impl Into<String>) -> Self {
        Self::new(CommandKind::InsertText(text.into()))
    }

    #[must_use]
    pub fn clear_selected() -> Self {
        Self::new(CommandKind::ClearSelected)
    }

    #[must_use]
    pub fn remove_lines(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::new(CommandKind::RemoveLines(indices.into_iter().collect()))
    }

    #[must_use]
    pub fn select(range: Range) -> Self {
        Self::new(CommandKind::Select(range))
    }

    #[must_use]
    pub fn multi_range(action: ColumnAction) -> Self {
        Self::new(CommandKind::MultiRange(action))
    }

    #[must_use]
    pub fn replace(ranges: Vec<Range>, text: impl Into<String>) -> Self {
        Self::new(CommandKind::Replace {
            ranges,
            text: text.into(),
        })
    }

    #[must_use]
    pub fn set_folding_markers(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::new(CommandKind::SetFoldingMarkers {
            start: start.into(),
            end: end.into(),
        })
    }

    #[must_use]
    pub fn group(members: Vec<Self>) -> Self {
        Self::new(CommandKind::Group(members))
    }

    /// Wrap already executed commands into one executed group.
    pub(crate) fn executed_group(members: Vec<Self>) -> Self {
        let sel_before = members
            .first()
            .map(|m| m.sel_before.clone())
            .unwrap_or_default();
        let sel_after = members
            .last()
            .map(|m| m.sel_after.clone())
            .unwrap_or_default();
        Self {
            state: State::Executed,
            sel_before,
            sel_after,
            ..Self::group(members)
        }
    }

    #[must_use]
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind {
            CommandKind::InsertChar(_) => "insert_char",
            CommandKind::InsertText(_) => "insert_text",
            CommandKind::ClearSelected => "clear_selected",
            CommandKind::RemoveLines(_) => "remove_lines",
            CommandKind::Select(_) => "select",
            CommandKind::MultiRange(_) => "multi_range",
            CommandKind::Replace { .. } => "replace",
            CommandKind::SetFoldingMarkers { .. } => "set_folding_markers",
            CommandKind::Group(_) => "group",
        }
    }

    /// Selection before the last execution.
    #[must_use]
    pub fn selection_before(&self) -> &Range {
        &self.sel_before
    }

    /// Selection after the last execution.
    #[must_use]
    pub fn selection_after(&self) -> &Range {
        &self.sel_after
    }

    /// Whether the last execution changed anything worth undoing.
    #[must_use]
    pub fn has_effect(&self) -> bool {
        match &self.kind {
            CommandKind::Group(members) => members.iter().any(Self::has_effect),
            CommandKind::Select(_) => self.sel_before != self.sel_after,
            _ => !self.edits.is_empty(),
        }
    }

    /// Apply the command. Running it again after [`Self::undo`] redoes it
    /// from the selection it originally started with.
    pub fn execute(&mut self, ctx: &mut EditContext<'_>) -> Result<()> {
        match self.state {
            State::Executed => return Err(Error::InvalidOperation("command already executed")),
            State::Initial => {
                self.sel_before = ctx.selection.clone();
                self.last_char_before = ctx.last_char;
            }
            State::Undone => {
                *ctx.selection = self.sel_before.clone();
                ctx.last_char = self.last_char_before;
            }
        }
        let mut edits = Vec::new();
        if let Err(err) = self.run(ctx, &mut edits) {
            for edit in edits.iter().rev() {
                edit.revert(ctx)?;
            }
            *ctx.selection = self.sel_before.clone();
            ctx.last_char = self.last_char_before;
            return Err(err);
        }
        self.edits = edits;
        self.sel_after = ctx.selection.clone();
        self.state = State::Executed;
        Ok(())
    }

    /// Revert the command and restore the selection it started with.
    pub fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<()> {
        if self.state != State::Executed {
            return Err(Error::InvalidOperation("command is not executed"));
        }
        if let CommandKind::Group(members) = &mut self.kind {
            for member in members.iter_mut().rev() {
                member.undo(ctx)?;
            }
        } else {
            for edit in self.edits.iter().rev() {
                edit.revert(ctx)?;
            }
        }
        *ctx.selection = self.sel_before.clone();
        ctx.last_char = None;
        self.state = State::Undone;
        Ok(())
    }

    fn run(&mut self, ctx: &mut EditContext<'_>, edits: &mut Vec<Edit>) -> Result<()> {
        let is_typing = matches!(
            self.kind,
            CommandKind::InsertChar(_) | CommandKind::InsertText(_)
        );
        if !is_typing {
            ctx.last_char = None;
        }
        match &mut self.kind {
            CommandKind::InsertChar(c) => {
                let c = *c;
                if c == '\u{8}' {
                    return ctx.type_char(edits, c, true);
                }
                let Some(text) = Self::resolve(&mut self.resolved, &mut self.cancelled, ctx, c.to_string())
                else {
                    return Ok(());
                };
                let typed = text.chars().count() == 1;
                ctx.insert_string(edits, &text, typed)
            }
            CommandKind::InsertText(text) => {
                let text = if ctx.settings.normalize_eol {
                    eol::normalize(text, ctx.settings.default_eol)
                } else {
                    text.clone()
                };
                let Some(text) = Self::resolve(&mut self.resolved, &mut self.cancelled, ctx, text)
                else {
                    return Ok(());
                };
                ctx.insert_string(edits, &text, false)
            }
            CommandKind::ClearSelected => ctx.clear_selected(edits),
            CommandKind::RemoveLines(indices) => run_remove_lines(ctx, edits, indices),
            CommandKind::Select(range) => {
                range.validate(ctx.buf())?;
                *ctx.selection = range.clone();
                Ok(())
            }
            CommandKind::MultiRange(action) => run_multi_range(ctx, edits, action),
            CommandKind::Replace { ranges, text } => run_replace(ctx, edits, ranges, text),
            CommandKind::SetFoldingMarkers { start, end } => {
                run_set_folding_markers(ctx, edits, start, end)
            }
            CommandKind::Group(members) => {
                for i in 0..members.len() {
                    if let Err(err) = members[i].execute(ctx) {
                        for done in members[..i].iter_mut().rev() {
                            done.undo(ctx)?;
                        }
                        return Err(err);
                    }
                }
                Ok(())
            }
        }
    }

    /// Run the text-changing hook once; later runs reuse its answer.
    fn resolve(
        resolved: &mut Option<String>,
        cancelled: &mut bool,
        ctx: &mut EditContext<'_>,
        text: String,
    ) -> Option<String> {
        if *cancelled {
            return None;
        }
        if let Some(text) = resolved {
            return Some(text.clone());
        }
        match ctx.store.text_changing(text) {
            Some(text) => {
                *resolved = Some(text.clone());
                Some(text)
            }
            None => {
                *cancelled = true;
                None
            }
        }
    }
}

fn run_remove_lines(ctx: &mut EditContext<'_>, edits: &mut Vec<Edit>, indices: &[usize]) -> Result<()> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let Some(&first) = sorted.first() else {
        return Ok(());
    };
    if let Some(&last) = sorted.last() {
        ctx.store.check_line(last)?;
    }
    for &index in sorted.iter().rev() {
        ctx.remove_line_range(edits, index, 1)?;
    }
    if ctx.store.is_empty() {
        let line = ctx.store.create_line();
        ctx.store.insert_line(0, line)?;
        edits.push(Edit::InsertLines { index: 0, count: 1 });
    }
    let last = ctx.store.len() - 1;
    if !ctx.store.line(last)?.eol().is_none() {
        ctx.set_eol(edits, last, EolFormat::None)?;
    }
    ctx.place_caret(first.min(last), 0)
}

fn run_multi_range(
    ctx: &mut EditContext<'_>,
    edits: &mut Vec<Edit>,
    action: &ColumnAction,
) -> Result<()> {
    let breaks_line = match action {
        ColumnAction::InsertChar(c) => matches!(c, '\n' | '\r'),
        ColumnAction::InsertText(_) | ColumnAction::Clear => false,
    };
    if breaks_line {
        return Err(Error::InvalidOperation("line breaks are not allowed in column mode"));
    }
    let range = ctx.selection.clone();
    range.validate(ctx.buf())?;
    let was_empty = range.is_empty();
    let (top, bottom) = (range.from().line, range.to().line);
    let x = range.from_x();

    let allow = ctx.allow_line_insertion;
    ctx.allow_line_insertion = false;
    let result = (|| -> Result<()> {
        if !was_empty {
            ctx.clear_column(edits)?;
        }
        let rows: Vec<(usize, String)> = match action {
            ColumnAction::Clear => return Ok(()),
            ColumnAction::InsertChar('\u{8}') if !was_empty => return Ok(()),
            ColumnAction::InsertChar(c) => (top..=bottom).map(|line| (line, c.to_string())).collect(),
            ColumnAction::InsertText(text) => {
                let pieces = eol::split_lines(text);
                if pieces.len() == 1 {
                    (top..=bottom).map(|line| (line, text.clone())).collect()
                } else {
                    let end = (top + pieces.len()).min(ctx.store.len());
                    (top..end)
                        .zip(pieces)
                        .map(|(line, (piece, _))| (line, piece.to_owned()))
                        .collect()
                }
            }
        };
        let pad = !matches!(action, ColumnAction::InsertChar('\u{8}'));
        let mut caret_x = None;
        for (line, text) in rows {
            let width = ctx.store.display_width(line, ctx.tab())?;
            if pad && width < x {
                let len = ctx.store.line(line)?.len();
                ctx.insert_cells(edits, line, len, &vec![Char::new(' '); x - width])?;
            }
            let index = ctx.store.line(line)?.display_to_string(x, ctx.tab(), TabSnap::Before);
            ctx.place_caret(line, index)?;
            for c in text.chars() {
                ctx.type_char(edits, c, false)?;
            }
            caret_x.get_or_insert(ctx.selection.start().column);
        }
        let last_row = bottom.max(top);
        let caret_x = caret_x.unwrap_or(x);
        *ctx.selection = Range::column(Place::new(caret_x, last_row), Place::new(caret_x, top));
        Ok(())
    })();
    ctx.allow_line_insertion = allow;
    result
}

fn run_replace(
    ctx: &mut EditContext<'_>,
    edits: &mut Vec<Edit>,
    ranges: &[Range],
    text: &str,
) -> Result<()> {
    ctx.check_insertable(text)?;
    for range in ranges {
        range.validate(ctx.buf())?;
    }
    let mut ordered: Vec<&Range> = ranges.iter().collect();
    ordered.sort_by_key(|range| std::cmp::Reverse(range.from()));
    for range in ordered {
        *ctx.selection = Range::new(range.from(), range.to());
        ctx.clear_selected(edits)?;
        ctx.insert_string(edits, text, false)?;
    }
    Ok(())
}

fn run_set_folding_markers(
    ctx: &mut EditContext<'_>,
    edits: &mut Vec<Edit>,
    start: &str,
    end: &str,
) -> Result<()> {
    let start_re = Regex::new(start)?;
    let end_re = Regex::new(end)?;
    for index in 0..ctx.store.len() {
        let text = ctx.store.line(index)?.text();
        let (is_start, is_end) = (start_re.is_match(&text), end_re.is_match(&text));
        if !is_start && !is_end {
            continue;
        }
        let line = ctx.store.line_mut(index)?;
        edits.push(Edit::Fold {
            line: index,
            start: line.fold_start().map(str::to_owned),
            end: line.fold_end().map(str::to_owned),
        });
        if is_start {
            line.set_fold_start(Some(start.to_owned()));
        }
        if is_end {
            line.set_fold_end(Some(end.to_owned()));
        }
    }
    Ok(())
}
