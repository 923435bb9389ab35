//! Mapping between string indices and display columns.
//!
//! Tabs are elastic: a tab starting at display width `w` advances to the next
//! multiple of the tab length `L`, so it is `L - (w mod L)` columns wide.
//! Every other character is one column wide.
//!
//! A display column that falls strictly inside a tab is resolved by
//! [`TabSnap`]. The canonical caret rule, [`TabSnap::Nearest`], puts the caret
//! before the tab when the column is at or left of the tab's midpoint
//! (`2 * offset <= width`) and after it otherwise. Style and paint ranges use
//! [`TabSnap::Before`] for their start and [`TabSnap::After`] for their end so
//! a partially covered tab is never dropped.
//!
//! # Examples
//!
//! ```
//! use richtext_core::text::tabs::{display_to_string, display_width, string_to_display, TabSnap};
//!
//! let line = "a\tb";
//! assert_eq!(display_width(line.chars(), 4), 5);
//! assert_eq!(string_to_display(line.chars(), 2, 4), 4);
//! // Column 2 is inside the tab (columns 1..4) and left of its midpoint.
//! assert_eq!(display_to_string(line.chars(), 2, 4, TabSnap::Nearest), 1);
//! assert_eq!(display_to_string(line.chars(), 3, 4, TabSnap::Nearest), 2);
//! ```

/// How to resolve a display column that falls inside a tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TabSnap {
    /// Center-of-tab rule.
    #[default]
    Nearest,
    /// Always the index of the tab itself.
    Before,
    /// Always the index after the tab.
    After,
}

/// Width of a tab that starts after `preceding` columns.
#[must_use]
pub const fn tab_width(preceding: usize, tab_length: usize) -> usize {
    let tab_length = if tab_length == 0 { 1 } else { tab_length };
    tab_length - preceding % tab_length
}

/// Width of `c` when it starts after `preceding` columns.
#[must_use]
pub const fn char_width(c: char, preceding: usize, tab_length: usize) -> usize {
    if c == '\t' {
        tab_width(preceding, tab_length)
    } else {
        1
    }
}

/// Display width of a whole character sequence.
#[must_use]
pub fn display_width(chars: impl IntoIterator<Item = char>, tab_length: usize) -> usize {
    chars
        .into_iter()
        .fold(0, |width, c| width + char_width(c, width, tab_length))
}

/// Display column of string index `index`.
///
/// Indices past the end map to the total width.
#[must_use]
pub fn string_to_display(
    chars: impl IntoIterator<Item = char>,
    index: usize,
    tab_length: usize,
) -> usize {
    display_width(chars.into_iter().take(index), tab_length)
}

/// String index for display column `column`.
///
/// Columns past the end map to the sequence length.
#[must_use]
pub fn display_to_string(
    chars: impl IntoIterator<Item = char>,
    column: usize,
    tab_length: usize,
    snap: TabSnap,
) -> usize {
    let mut width = 0;
    let mut count = 0;
    for (i, c) in chars.into_iter().enumerate() {
        if width >= column {
            return i;
        }
        let w = char_width(c, width, tab_length);
        if width + w > column {
            let offset = column - width;
            let after = match snap {
                TabSnap::Nearest => 2 * offset > w,
                TabSnap::Before => false,
                TabSnap::After => true,
            };
            return if after { i + 1 } else { i };
        }
        width += w;
        count = i + 1;
    }
    count
}

/// Move a display column onto the nearest valid caret position.
#[must_use]
pub fn snap_column<I>(chars: I, column: usize, tab_length: usize) -> usize
where
    I: IntoIterator<Item = char>,
    I::IntoIter: Clone,
{
    let iter = chars.into_iter();
    let index = display_to_string(iter.clone(), column, tab_length, TabSnap::Nearest);
    string_to_display(iter, index, tab_length)
}

/// Prefix display widths: entry `i` is the column of string index `i`.
///
/// The result has one more entry than the sequence has characters.
#[must_use]
pub fn prefix_widths(chars: impl IntoIterator<Item = char>, tab_length: usize) -> Vec<usize> {
    let mut widths = vec![0];
    let mut width = 0;
    for c in chars {
        width += char_width(c, width, tab_length);
        widths.push(width);
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elastic_tab_width() {
        assert_eq!(tab_width(0, 4), 4);
        assert_eq!(tab_width(1, 4), 3);
        assert_eq!(tab_width(3, 4), 1);
        assert_eq!(tab_width(4, 4), 4);
        assert_eq!(tab_width(5, 1), 1);
        assert_eq!(tab_width(5, 0), 1);
    }

    #[test]
    fn test_display_width_with_tabs() {
        assert_eq!(display_width("a\tb".chars(), 4), 5);
        assert_eq!(display_width("\t\t".chars(), 4), 8);
        assert_eq!(display_width("abcd\t".chars(), 4), 8);
        assert_eq!(display_width("".chars(), 4), 0);
    }

    #[test]
    fn test_center_of_tab_rule() {
        // Tab spans columns 0..8.
        let line = "\tx";
        assert_eq!(display_to_string(line.chars(), 0, 8, TabSnap::Nearest), 0);
        assert_eq!(display_to_string(line.chars(), 4, 8, TabSnap::Nearest), 0);
        assert_eq!(display_to_string(line.chars(), 5, 8, TabSnap::Nearest), 1);
        assert_eq!(display_to_string(line.chars(), 8, 8, TabSnap::Nearest), 1);
        assert_eq!(display_to_string(line.chars(), 9, 8, TabSnap::Nearest), 2);
    }

    #[test]
    fn test_odd_tab_midpoint() {
        // Tab spans columns 1..4 (width 3); midpoint is 1.5 columns in.
        let line = "a\tb";
        assert_eq!(display_to_string(line.chars(), 2, 4, TabSnap::Nearest), 1);
        assert_eq!(display_to_string(line.chars(), 3, 4, TabSnap::Nearest), 2);
    }

    #[test]
    fn test_partial_snaps() {
        let line = "a\tb";
        assert_eq!(display_to_string(line.chars(), 2, 4, TabSnap::Before), 1);
        assert_eq!(display_to_string(line.chars(), 2, 4, TabSnap::After), 2);
        // Exact boundaries are not affected by the snap mode.
        assert_eq!(display_to_string(line.chars(), 1, 4, TabSnap::After), 1);
        assert_eq!(display_to_string(line.chars(), 4, 4, TabSnap::Before), 2);
    }

    #[test]
    fn test_past_end() {
        assert_eq!(display_to_string("ab".chars(), 10, 4, TabSnap::Nearest), 2);
        assert_eq!(string_to_display("ab".chars(), 10, 4), 2);
    }

    #[test]
    fn test_inverse_on_boundaries() {
        let line = "x\t\tyz\tw";
        for tab in 1..=8 {
            for i in 0..=line.chars().count() {
                let col = string_to_display(line.chars(), i, tab);
                assert_eq!(
                    display_to_string(line.chars(), col, tab, TabSnap::Nearest),
                    i,
                    "tab={tab} i={i}"
                );
            }
        }
    }

    #[test]
    fn test_snap_and_prefix() {
        assert_eq!(snap_column("a\tb".chars(), 2, 4), 1);
        assert_eq!(snap_column("a\tb".chars(), 3, 4), 4);
        assert_eq!(prefix_widths("a\tb".chars(), 4), vec![0, 1, 4, 5]);
    }
}
