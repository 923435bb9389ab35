//! Undo/redo history and transactions.
//!
//! [`CommandManager`] executes commands against an [`EditContext`] and keeps
//! two stacks. Commands executed between [`begin_group`] and the matching
//! [`end_group`] land on the undo stack as one group, so a single undo
//! reverts all of them. Executing a new command clears the redo stack.
//!
//! [`begin_group`]: CommandManager::begin_group
//! [`end_group`]: CommandManager::end_group

use crate::error::Result;
use crate::text::command::{Command, EditContext};
use crate::text::settings::DEFAULT_MAX_HISTORY;
use tracing::{debug, trace};

/// Undo and redo stacks plus the open transaction, if any.
#[derive(Debug)]
pub struct CommandManager {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    group_depth: usize,
    group: Vec<Command>,
    max_history: usize,
    last_char: Option<char>,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl CommandManager {
    /// History keeping at most `max_history` undo entries.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            group_depth: 0,
            group: Vec::new(),
            max_history,
            last_char: None,
        }
    }

    #[must_use]
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Change the limit, dropping the oldest entries beyond it.
    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history;
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_history {
            let excess = self.undo_stack.len() - self.max_history;
            self.undo_stack.drain(..excess);
            debug!(excess, "history evicted");
        }
    }

    /// Execute `command` and record it.
    ///
    /// A failing command is not recorded and leaves the history as it was.
    /// A command that turned out to change nothing (a cancelled insertion,
    /// clearing an empty selection) is not recorded either.
    pub fn execute(&mut self, mut command: Command, ctx: &mut EditContext<'_>) -> Result<()> {
        ctx.last_char = self.last_char;
        ctx.store.begin_update();
        let result = command.execute(ctx);
        ctx.store.end_update();
        self.last_char = ctx.last_char;
        result?;

        if !command.has_effect() {
            trace!(command = command.name(), "no effect, not recorded");
            return Ok(());
        }
        trace!(command = command.name(), grouped = self.group_depth > 0, "executed");
        self.redo_stack.clear();
        if self.group_depth > 0 {
            self.group.push(command);
        } else {
            self.push_undo(command);
        }
        Ok(())
    }

    fn push_undo(&mut self, command: Command) {
        self.undo_stack.push(command);
        self.trim();
    }

    /// Open a transaction. Nests.
    pub fn begin_group(&mut self) {
        self.group_depth += 1;
        trace!(depth = self.group_depth, "group opened");
    }

    /// Close a transaction. Closing the outermost one records everything
    /// executed inside it as one undo entry.
    pub fn end_group(&mut self) {
        if self.group_depth == 0 {
            return;
        }
        self.group_depth -= 1;
        trace!(depth = self.group_depth, "group closed");
        if self.group_depth == 0 {
            self.flush_group();
        }
    }

    fn flush_group(&mut self) {
        let members = std::mem::take(&mut self.group);
        match members.len() {
            0 => {}
            1 => {
                if let Some(command) = members.into_iter().next() {
                    self.push_undo(command);
                }
            }
            count => {
                debug!(count, "group recorded");
                self.push_undo(Command::executed_group(members));
            }
        }
    }

    /// Whether a transaction is open.
    #[must_use]
    pub fn is_grouping(&self) -> bool {
        self.group_depth > 0
    }

    /// Revert the most recent entry. An open transaction is closed first.
    ///
    /// Returns `false` if there is nothing to undo.
    pub fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<bool> {
        if self.group_depth > 0 {
            self.group_depth = 0;
            self.flush_group();
        }
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(false);
        };
        ctx.store.begin_update();
        let result = command.undo(ctx);
        ctx.store.end_update();
        self.last_char = None;
        if let Err(err) = result {
            self.undo_stack.push(command);
            return Err(err);
        }
        debug!(command = command.name(), "undo");
        self.redo_stack.push(command);
        Ok(true)
    }

    /// Re-apply the most recently undone entry.
    ///
    /// Returns `false` if there is nothing to redo.
    pub fn redo(&mut self, ctx: &mut EditContext<'_>) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        ctx.store.begin_update();
        let result = command.execute(ctx);
        ctx.store.end_update();
        self.last_char = None;
        if let Err(err) = result {
            self.redo_stack.push(command);
            return Err(err);
        }
        debug!(command = command.name(), "redo");
        self.push_undo(command);
        Ok(true)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || !self.group.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo entries.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget every entry and any open transaction.
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group.clear();
        self.group_depth = 0;
        self.last_char = None;
        debug!("history cleared");
    }
}
