//! Line storage, ranges and undoable editing.
//!
//! The content lives in a [`LineStore`]: an ordered list of [`Line`]s, each a
//! vector of styled characters plus its own line terminator. Positions are
//! [`Place`]s in display columns, so a tab occupies up to
//! [`EditorSettings::tab_length`] columns.
//!
//! Key types:
//!
//! - [`LineStore`]: lines, style table, change notifications and file I/O
//! - [`Range`]: a selection with text extraction, search and caret movement
//! - [`Command`] and [`CommandManager`]: reversible edits with undo/redo
//! - [`Document`]: the editing surface tying these together
//!
//! # Examples
//!
//! ## Querying a store
//!
//! ```
//! use richtext_core::text::{BufferRef, EolFormat, LineStore, Place, Range};
//!
//! let store = LineStore::from_text("fn main() {\r\n\tbody\r\n}");
//! assert_eq!(store.len(), 3);
//! assert_eq!(store[0].eol(), EolFormat::CrLf);
//!
//! let buf = BufferRef::new(&store, 4);
//! let range = Range::new(Place::new(4, 1), Place::new(8, 1));
//! assert_eq!(range.text(buf).unwrap(), "body");
//! ```
//!
//! ## Editing with undo
//!
//! ```
//! use richtext_core::text::{Document, EditorSettings, EolFormat};
//!
//! let settings = EditorSettings::default().with_default_eol(EolFormat::Lf);
//! let mut doc = Document::with_settings(settings);
//! doc.insert_text("Hello").unwrap();
//! doc.insert_char('\n').unwrap();
//! doc.insert_text("World").unwrap();
//! assert_eq!(doc.text(), "Hello\nWorld");
//!
//! doc.undo().unwrap();
//! assert_eq!(doc.text(), "Hello\n");
//! doc.redo().unwrap();
//! assert_eq!(doc.text(), "Hello\nWorld");
//! ```

mod command;
mod document;
mod encoding;
pub mod eol;
mod history;
mod line;
mod place;
mod range;
mod search;
mod settings;
mod store;
pub mod tabs;
pub mod wrap;

pub use command::{ColumnAction, Command, CommandKind, EditContext};
pub use document::Document;
pub use encoding::TextEncoding;
pub use eol::EolFormat;
pub use history::CommandManager;
pub use line::{Line, LineId};
pub use place::Place;
pub use range::{BufferRef, Range};
pub use search::FlatText;
pub use settings::{DEFAULT_MAX_HISTORY, EditorSettings};
pub use store::LineStore;
pub use tabs::TabSnap;
pub use wrap::{LineInfo, WrapMode, WrapOptions};
