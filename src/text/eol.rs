//! End-of-line formats.
//!
//! Every [`Line`](super::Line) remembers the terminator it was read or typed
//! with, so documents mixing LF, CRLF and CR survive an edit/save cycle
//! byte-for-byte.

/// Line terminator of a single line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EolFormat {
    /// No terminator (the last line of a buffer).
    #[default]
    None,
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

/// Number of leading lines examined by [`EolFormat::detect`].
pub const DEFAULT_DETECT_LINES: usize = 10;

impl EolFormat {
    /// Terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Length of the terminator in characters.
    #[must_use]
    pub const fn len(self) -> usize {
        self.as_str().len()
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Majority vote over a sequence of terminators.
    ///
    /// LF wins if it is strictly more frequent than both CR and CRLF, CR wins
    /// if it is strictly more frequent than both others, and CRLF is chosen
    /// in every other case, including ties and input without terminators.
    #[must_use]
    pub fn vote(formats: impl IntoIterator<Item = Self>) -> Self {
        let (mut lf, mut crlf, mut cr) = (0usize, 0usize, 0usize);
        for format in formats {
            match format {
                Self::Lf => lf += 1,
                Self::CrLf => crlf += 1,
                Self::Cr => cr += 1,
                Self::None => {}
            }
        }
        if lf > crlf && lf > cr {
            Self::Lf
        } else if cr > crlf && cr > lf {
            Self::Cr
        } else {
            Self::CrLf
        }
    }

    /// Detect the dominant terminator in the first `max_lines` lines of `text`.
    #[must_use]
    pub fn detect(text: &str, max_lines: usize) -> Self {
        Self::vote(
            split_lines(text)
                .into_iter()
                .take(max_lines)
                .map(|(_, eol)| eol),
        )
    }
}

/// Split text into `(line, terminator)` records.
///
/// Recognizes LF, CR and CRLF. The final record is always present and carries
/// [`EolFormat::None`], so `"a\n"` yields `[("a", Lf), ("", None)]` and the
/// empty string yields a single empty record.
#[must_use]
pub fn split_lines(text: &str) -> Vec<(&str, EolFormat)> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut start = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\n' => {
                lines.push((&text[start..i], EolFormat::Lf));
                i += 1;
                start = i;
            }
            b'\r' => {
                if i + 1 < len && bytes[i + 1] == b'\n' {
                    lines.push((&text[start..i], EolFormat::CrLf));
                    i += 2;
                } else {
                    lines.push((&text[start..i], EolFormat::Cr));
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push((&text[start..], EolFormat::None));
    lines
}

/// Rewrite every terminator in `text` to `target`.
///
/// `EolFormat::None` leaves the text unchanged.
#[must_use]
pub fn normalize(text: &str, target: EolFormat) -> String {
    if target.is_none() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for (line, eol) in split_lines(text) {
        out.push_str(line);
        if !eol.is_none() {
            out.push_str(target.as_str());
        }
    }
    out
}
