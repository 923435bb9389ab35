//! Editing configuration.

use crate::text::eol::EolFormat;
use crate::text::wrap::WrapOptions;

/// Default number of undo entries kept.
pub const DEFAULT_MAX_HISTORY: usize = 200;

/// Settings consulted by edit commands and layout.
///
/// # Examples
///
/// ```
/// use richtext_core::text::{EditorSettings, EolFormat};
///
/// let settings = EditorSettings::default()
///     .with_tab_length(2)
///     .with_convert_tabs_to_spaces(true)
///     .with_default_eol(EolFormat::Lf);
/// assert_eq!(settings.tab_length, 2);
/// assert!(settings.multiline);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditorSettings {
    /// Tab stop distance in display columns; at least 1.
    pub tab_length: usize,
    /// Typing a tab inserts spaces up to the next tab stop.
    pub convert_tabs_to_spaces: bool,
    /// Terminator for typed line breaks and for lines saved without one.
    /// `None` keeps whatever was typed.
    pub default_eol: EolFormat,
    /// Rewrite terminators in inserted text to `default_eol`.
    pub normalize_eol: bool,
    /// Allow line breaks. When false, inserting `\n` or `\r` fails.
    pub multiline: bool,
    /// A typed line break copies the indentation of the line above.
    pub auto_indent: bool,
    /// Undo entries kept; the oldest is dropped beyond this.
    pub max_history: usize,
    pub wrap: WrapOptions,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_length: 4,
            convert_tabs_to_spaces: false,
            default_eol: EolFormat::None,
            normalize_eol: false,
            multiline: true,
            auto_indent: false,
            max_history: DEFAULT_MAX_HISTORY,
            wrap: WrapOptions::default(),
        }
    }
}

impl EditorSettings {
    #[must_use]
    pub fn with_tab_length(mut self, tab_length: usize) -> Self {
        self.tab_length = tab_length.max(1);
        self
    }

    #[must_use]
    pub fn with_convert_tabs_to_spaces(mut self, enabled: bool) -> Self {
        self.convert_tabs_to_spaces = enabled;
        self
    }

    #[must_use]
    pub fn with_default_eol(mut self, eol: EolFormat) -> Self {
        self.default_eol = eol;
        self
    }

    #[must_use]
    pub fn with_normalize_eol(mut self, enabled: bool) -> Self {
        self.normalize_eol = enabled;
        self
    }

    #[must_use]
    pub fn with_multiline(mut self, enabled: bool) -> Self {
        self.multiline = enabled;
        self
    }

    #[must_use]
    pub fn with_auto_indent(mut self, enabled: bool) -> Self {
        self.auto_indent = enabled;
        self
    }

    #[must_use]
    pub fn with_max_history(mut self, entries: usize) -> Self {
        self.max_history = entries;
        self
    }

    #[must_use]
    pub fn with_wrap(mut self, wrap: WrapOptions) -> Self {
        self.wrap = wrap;
        self
    }

    /// Tab length, never below 1.
    #[must_use]
    pub fn tab_length(&self) -> usize {
        self.tab_length.max(1)
    }
}
