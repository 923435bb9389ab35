//! Change notifications raised by a line store.
//!
//! Listeners are plain callbacks registered on the store. They run
//! synchronously on the mutating call stack, so a collaborator tracking lines
//! by [`LineId`] can renumber or evict its references before the edit that
//! triggered the notification returns.
//!
//! Everything here is single-threaded: callbacks are `FnMut` without a
//! `Send` bound.

use crate::text::LineId;
use std::fmt;

/// Structural and content notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextEvent {
    /// `count` lines were inserted starting at `index`.
    LineInserted { index: usize, count: usize },
    /// `count` lines starting at `index` were removed; their ids are retired.
    LineRemoved {
        index: usize,
        count: usize,
        removed_ids: Vec<LineId>,
    },
    /// Text of lines `from_line..=to_line` changed (after the edit).
    TextChanged { from_line: usize, to_line: usize },
    /// Cached per-line data for `from_line..=to_line` is stale.
    RecalcNeeded { from_line: usize, to_line: usize },
    /// Wrap cut-offs for `from_line..=to_line` were recomputed.
    RecalcWordWrap { from_line: usize, to_line: usize },
}

/// Payload of the text-changing hook, raised before text is inserted.
///
/// The handler may rewrite `text` or set `cancel`; a cancelled insertion
/// inserts nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextChanging {
    pub text: String,
    pub cancel: bool,
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TextEvent)>;
type ChangingHandler = Box<dyn FnMut(&mut TextChanging)>;

/// Registered callbacks of one store.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
    changing: Option<ChangingHandler>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("listeners", &self.listeners.len())
            .field("changing", &self.changing.is_some())
            .finish()
    }
}

impl Listeners {
    /// Register a listener for every [`TextEvent`].
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TextEvent) + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Install the text-changing hook, replacing any previous one.
    pub fn set_changing_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut TextChanging) + 'static,
    {
        self.changing = Some(Box::new(handler));
    }

    pub fn clear_changing_handler(&mut self) {
        self.changing = None;
    }

    /// Deliver an event to every listener in registration order.
    pub fn emit(&mut self, event: &TextEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Run the text-changing hook. Returns `None` if the edit was cancelled.
    pub fn text_changing(&mut self, text: String) -> Option<String> {
        let Some(handler) = self.changing.as_mut() else {
            return Some(text);
        };
        let mut args = TextChanging { text, cancel: false };
        handler(&mut args);
        if args.cancel { None } else { Some(args.text) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
