//! Character cell stored in a [`Line`](crate::text::Line).
//!
//! A cell is a Unicode scalar plus the mask of style layers painted on it.
//! Cells are plain values: editing a cell's style means reading it out of the
//! line, changing the copy, and writing it back.
//!
//! # Examples
//!
//! ```
//! use richtext_core::{Char, StyleIndex};
//!
//! let mut cell = Char::new('a');
//! cell.style |= StyleIndex::layer(1);
//! assert!(cell.style.has_layer(1));
//! assert!(!cell.is_tab());
//! ```

use crate::style::StyleIndex;

/// A single character with its style-layer mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Char {
    pub c: char,
    pub style: StyleIndex,
}

impl Char {
    /// Create an unstyled cell.
    #[must_use]
    pub const fn new(c: char) -> Self {
        Self {
            c,
            style: StyleIndex::NONE,
        }
    }

    /// Create a cell with a style mask.
    #[must_use]
    pub const fn styled(c: char, style: StyleIndex) -> Self {
        Self { c, style }
    }

    #[must_use]
    pub const fn is_tab(self) -> bool {
        self.c == '\t'
    }

    /// Space or tab.
    #[must_use]
    pub const fn is_blank(self) -> bool {
        matches!(self.c, ' ' | '\t')
    }
}

impl From<char> for Char {
    fn from(c: char) -> Self {
        Self::new(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_defaults() {
        let cell = Char::from('x');
        assert_eq!(cell.c, 'x');
        assert_eq!(cell.style, StyleIndex::NONE);
    }

    #[test]
    fn test_read_modify_write() {
        let mut cells = vec![Char::new('a'), Char::new('b')];
        let mut cell = cells[1];
        cell.style |= StyleIndex::layer(4);
        cells[1] = cell;
        assert!(cells[1].style.has_layer(4));
        assert!(!cells[0].style.has_layer(4));
    }

    #[test]
    fn test_blank() {
        assert!(Char::new(' ').is_blank());
        assert!(Char::new('\t').is_blank());
        assert!(Char::new('\t').is_tab());
        assert!(!Char::new('a').is_blank());
    }
}
