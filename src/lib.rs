//! `richtext_core` - line-oriented text buffer core for rich-text editors
//!
//! Provides the storage and editing layer under a code or rich-text editing
//! widget: tab-aware display columns, per-line terminators, layered
//! character styles, undoable commands and word wrap. Rendering and input
//! handling are left to the embedding widget.
//!
//! # Examples
//!
//! ```
//! use richtext_core::text::{Document, Place, Range};
//!
//! let mut doc = Document::from_text("let x = 1;\nlet y = 2;");
//! let found = doc.find_all(r"\blet\b").unwrap();
//! assert_eq!(found.len(), 2);
//! assert_eq!(found[1].from(), Place::new(0, 1));
//!
//! doc.set_selection(Range::new(Place::new(4, 0), Place::new(5, 0))).unwrap();
//! doc.insert_text("count").unwrap();
//! assert_eq!(doc.text(), "let count = 1;\nlet y = 2;");
//! ```

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Intentional index casts
#![allow(clippy::cast_sign_loss)] // Intentional offset conversions
#![allow(clippy::cast_possible_wrap)] // Intentional offset conversions
#![allow(clippy::module_name_repetitions)] // Allow text::TextEncoding etc
#![allow(clippy::struct_excessive_bools)] // Editor settings need multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::branches_sharing_code)] // Code clarity over DRY in branching
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod cell;
pub mod color;
pub mod error;
pub mod event;
pub mod style;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use cell::Char;
pub use color::Rgba;
pub use error::{Error, Result};
pub use event::{ListenerId, TextChanging, TextEvent};
pub use style::{Style, StyleCapacity, StyleIndex, TextAttributes};

// Re-export commonly used types
pub use text::{
    Command, CommandManager, Document, EditorSettings, EolFormat, Line, LineId, LineStore, Place,
    Range, TextEncoding, WrapMode, WrapOptions,
};
