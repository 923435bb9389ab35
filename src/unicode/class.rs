//! Character classes used by word wrapping and word navigation.

/// Letters, digits and underscore: the characters caret word-jumps treat as
/// part of an identifier.
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Check whether a character belongs to a CJK block in which text may be
/// broken between any two characters.
#[must_use]
pub fn is_cjk(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1100..=0x11FF
            | 0x2460..=0x24FF
            | 0x2E80..=0x2EFF
            | 0x2F00..=0x2FDF
            | 0x2FF0..=0x2FFF
            | 0x3040..=0x309F
            | 0x30A0..=0x30FF
            | 0x3100..=0x312F
            | 0x3130..=0x318F
            | 0x31A0..=0x31BF
            | 0x31C0..=0x31EF
            | 0x31F0..=0x31FF
            | 0x3200..=0x32FF
            | 0x3300..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4DC0..=0x4DFF
            | 0x4E00..=0x9FFF
            | 0xA960..=0xA97F
            | 0xAC00..=0xD7AF
            | 0xD7B0..=0xD7FF
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
    )
}

/// Check whether a line may be wrapped right after `c`.
///
/// Letters, digits, `_`, `'` and no-break space glue to their neighbours.
/// A `.` or `,` directly followed by a digit is part of a number and does not
/// allow a break either.
#[must_use]
pub fn is_break_after(c: char, next: Option<char>) -> bool {
    if c.is_alphanumeric() || matches!(c, '_' | '\'' | '\u{a0}') {
        return false;
    }
    if matches!(c, '.' | ',') && next.is_some_and(|n| n.is_ascii_digit()) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_chars() {
        assert!(is_word_char('a'));
        assert!(is_word_char('Z'));
        assert!(is_word_char('7'));
        assert!(is_word_char('_'));
        assert!(is_word_char('é'));
        assert!(!is_word_char(' '));
        assert!(!is_word_char('-'));
    }

    #[test]
    fn test_cjk() {
        assert!(is_cjk('漢'));
        assert!(is_cjk('か'));
        assert!(is_cjk('カ'));
        assert!(is_cjk('한'));
        assert!(!is_cjk('a'));
        assert!(!is_cjk('é'));
    }

    #[test]
    fn test_break_after() {
        assert!(is_break_after(' ', Some('a')));
        assert!(is_break_after('-', Some('a')));
        assert!(!is_break_after('a', Some(' ')));
        assert!(!is_break_after('\'', Some('s')));
        assert!(!is_break_after('\u{a0}', Some('x')));
        assert!(!is_break_after('.', Some('5')));
        assert!(is_break_after('.', Some(' ')));
        assert!(is_break_after(',', None));
    }
}
