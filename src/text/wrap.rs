//! Word-wrap cut-off computation.
//!
//! A logical line is split into display rows under a width budget. The first
//! row uses [`WrapOptions::width`], continuation rows use
//! [`WrapOptions::secondary_width`] (typically narrower, to leave room for a
//! wrap indent). Widths are display columns with tabs expanded relative to
//! the start of the logical line.
//!
//! In [`WrapMode::Word`] a row ends at the last break opportunity: after any
//! character that is not a letter, digit, `_`, `'` or no-break space, and,
//! with CJK breaking on, after any CJK character. A run with no opportunity
//! that does not fit is cut where the budget runs out. [`WrapMode::Char`]
//! cuts exactly at the budget.
//!
//! # Examples
//!
//! ```
//! use richtext_core::text::wrap::{cut_offs, WrapMode, WrapOptions};
//!
//! let opts = WrapOptions::new(WrapMode::Word, 10);
//! let text: Vec<char> = "Hello world test".chars().collect();
//! assert_eq!(cut_offs(&text, 4, &opts), vec![6]);
//! ```

use crate::text::tabs::prefix_widths;
use crate::unicode::{is_break_after, is_cjk};

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// No wrapping - lines extend beyond the viewport.
    #[default]
    None,
    /// Wrap at character boundaries.
    Char,
    /// Wrap at word boundaries.
    Word,
}

/// Budgets and mode for wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrapOptions {
    pub mode: WrapMode,
    /// Budget of the first row of a line.
    pub width: usize,
    /// Budget of every continuation row.
    pub secondary_width: usize,
    /// Allow breaks between any two CJK characters.
    pub cjk_breaking: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self::new(WrapMode::None, 80)
    }
}

impl WrapOptions {
    /// Options with the same budget for every row.
    #[must_use]
    pub const fn new(mode: WrapMode, width: usize) -> Self {
        Self {
            mode,
            width,
            secondary_width: width,
            cjk_breaking: true,
        }
    }

    #[must_use]
    pub const fn with_secondary_width(mut self, width: usize) -> Self {
        self.secondary_width = width;
        self
    }

    #[must_use]
    pub const fn with_cjk_breaking(mut self, enabled: bool) -> Self {
        self.cjk_breaking = enabled;
        self
    }
}

/// Compute the string indices at which `chars` wraps.
///
/// Each returned index starts a continuation row. Every row fits its budget
/// unless it consists of a single character wider than the budget (a tab
/// under a tiny budget).
#[must_use]
pub fn cut_offs(chars: &[char], tab_length: usize, opts: &WrapOptions) -> Vec<usize> {
    let mut cuts = Vec::new();
    if opts.mode == WrapMode::None || chars.is_empty() {
        return cuts;
    }
    let char_wrap = opts.mode == WrapMode::Char;
    let prefix = prefix_widths(chars.iter().copied(), tab_length);
    let mut budget = opts.width.max(1);
    let mut row_start = 0usize;
    let mut last_break: Option<usize> = None;

    let mut i = 0;
    while i < chars.len() {
        if i > row_start && prefix[i + 1] - prefix[row_start] > budget {
            let cut = if char_wrap {
                i
            } else {
                last_break
                    .filter(|&b| b > row_start && b <= i)
                    .unwrap_or(i)
            };
            cuts.push(cut);
            row_start = cut;
            last_break = None;
            budget = opts.secondary_width.max(1);
            // Rescan the new row against its own budget.
            i = cut;
            continue;
        }

        if !char_wrap {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            if is_break_after(c, next) || (opts.cjk_breaking && is_cjk(c)) {
                last_break = Some(i + 1);
            }
        }
        i += 1;
    }

    cuts
}

/// Wrap layout of one line, kept by the line store next to the line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineInfo {
    cut_offs: Vec<usize>,
    dirty: bool,
}

impl LineInfo {
    pub(crate) fn new_dirty() -> Self {
        Self {
            cut_offs: Vec::new(),
            dirty: true,
        }
    }

    /// String indices where continuation rows start.
    #[must_use]
    pub fn cut_offs(&self) -> &[usize] {
        &self.cut_offs
    }

    /// Whether the cut-offs are stale.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_cut_offs(&mut self, cut_offs: Vec<usize>) {
        self.cut_offs = cut_offs;
        self.dirty = false;
    }

    /// Number of display rows the line occupies.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.cut_offs.len() + 1
    }

    /// Row containing string index `index`.
    ///
    /// An index equal to a cut-off belongs to the row that starts there.
    #[must_use]
    pub fn row_of(&self, index: usize) -> usize {
        self.cut_offs.partition_point(|&cut| cut <= index)
    }

    /// String index where `row` starts.
    #[must_use]
    pub fn row_start(&self, row: usize) -> usize {
        if row == 0 {
            0
        } else {
            self.cut_offs.get(row - 1).copied().unwrap_or(usize::MAX)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn rows(s: &str, cuts: &[usize]) -> Vec<String> {
        let c = chars(s);
        let mut out = Vec::new();
        let mut start = 0;
        for &cut in cuts.iter().chain(std::iter::once(&c.len())) {
            out.push(c[start..cut].iter().collect());
            start = cut;
        }
        out
    }

    #[test]
    fn test_no_wrap() {
        let opts = WrapOptions::new(WrapMode::None, 3);
        assert!(cut_offs(&chars("abcdefgh"), 4, &opts).is_empty());
    }

    #[test]
    fn test_char_wrap_exact() {
        let opts = WrapOptions::new(WrapMode::Char, 3);
        assert_eq!(cut_offs(&chars("abcdef"), 4, &opts), vec![3]);
        assert_eq!(cut_offs(&chars("abcdefgh"), 4, &opts), vec![3, 6]);
    }

    #[test]
    fn test_word_wrap_breaks_after_space() {
        let text = "Hello world test";
        let opts = WrapOptions::new(WrapMode::Word, 10);
        let cuts = cut_offs(&chars(text), 4, &opts);
        assert_eq!(rows(text, &cuts), vec!["Hello ", "world test"]);
    }

    #[test]
    fn test_long_word_is_forced() {
        let text = "supercalifragilistic";
        let opts = WrapOptions::new(WrapMode::Word, 8);
        let cuts = cut_offs(&chars(text), 4, &opts);
        assert_eq!(cuts, vec![8, 16]);
    }

    #[test]
    fn test_secondary_width() {
        let text = "aaaa bbbb cccc dddd";
        let opts = WrapOptions::new(WrapMode::Word, 10).with_secondary_width(5);
        let cuts = cut_offs(&chars(text), 4, &opts);
        assert_eq!(rows(text, &cuts), vec!["aaaa bbbb ", "cccc ", "dddd"]);
    }

    #[test]
    fn test_number_separators_do_not_break() {
        let text = "pi 3.14159";
        let opts = WrapOptions::new(WrapMode::Word, 8);
        let cuts = cut_offs(&chars(text), 4, &opts);
        assert_eq!(rows(text, &cuts), vec!["pi ", "3.14159"]);
    }

    #[test]
    fn test_cjk_breaks_anywhere() {
        let text = "漢字漢字漢字";
        let opts = WrapOptions::new(WrapMode::Word, 4);
        assert_eq!(cut_offs(&chars(text), 4, &opts), vec![4]);

        let mixed = "ab漢字cd";
        let opts = WrapOptions::new(WrapMode::Word, 3);
        assert_eq!(rows(mixed, &cut_offs(&chars(mixed), 4, &opts)), vec!["ab漢", "字cd"]);

        let no_cjk = opts.with_cjk_breaking(false);
        assert_eq!(cut_offs(&chars(mixed), 4, &no_cjk), vec![3]);
    }

    #[test]
    fn test_tabs_count_by_display_width() {
        // "a\tb" is five columns wide with tab length 4.
        let opts = WrapOptions::new(WrapMode::Char, 4);
        assert_eq!(cut_offs(&chars("a\tbc"), 4, &opts), vec![2]);
    }

    #[test]
    fn test_rows_fit_budget() {
        let text = "the quick\tbrown fox_jumps over 12,000 lazy dogs";
        for width in 1..20 {
            let opts = WrapOptions::new(WrapMode::Word, width).with_secondary_width(width.max(2) - 1);
            let c = chars(text);
            let cuts = cut_offs(&c, 4, &opts);
            let prefix = prefix_widths(c.iter().copied(), 4);
            let mut start = 0;
            for (row, &end) in cuts.iter().chain(std::iter::once(&c.len())).enumerate() {
                let budget = if row == 0 { opts.width } else { opts.secondary_width };
                let w = prefix[end] - prefix[start];
                assert!(w <= budget || end - start == 1, "width={width} row={row}");
                start = end;
            }
        }
    }

    #[test]
    fn test_line_info_rows() {
        let mut info = LineInfo::new_dirty();
        assert!(info.is_dirty());
        info.set_cut_offs(vec![3, 6]);
        assert!(!info.is_dirty());
        assert_eq!(info.rows(), 3);
        assert_eq!(info.row_of(0), 0);
        assert_eq!(info.row_of(2), 0);
        assert_eq!(info.row_of(3), 1);
        assert_eq!(info.row_of(7), 2);
        assert_eq!(info.row_start(2), 6);
    }
}
