//! Unicode character classes and word boundaries.

mod class;
mod words;

pub use class::{is_break_after, is_cjk, is_word_char};
pub use words::{next_word_end, prev_word_start, word_at};
