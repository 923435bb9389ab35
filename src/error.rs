//! Error types for buffer operations.

use crate::text::TextEncoding;
use std::fmt;
use std::io;

/// Result type alias for buffer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for buffer operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from load/save.
    Io(io::Error),
    /// Line index outside `0..count`.
    LineOutOfRange { line: usize, count: usize },
    /// String index outside the bounds of a line.
    IndexOutOfRange { index: usize, len: usize },
    /// Display column beyond the display width of a line.
    ColumnOutOfRange {
        line: usize,
        column: usize,
        width: usize,
    },
    /// Operation not allowed in the current editing mode.
    InvalidOperation(&'static str),
    /// Every slot of the style-layer table is taken.
    StyleCapacity { capacity: usize },
    /// Malformed search pattern.
    Pattern(regex::Error),
    /// Bytes are not valid in the requested encoding.
    Decode { encoding: TextEncoding },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::LineOutOfRange { line, count } => {
                write!(f, "line {line} out of range for buffer of {count} lines")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for line of length {len}")
            }
            Self::ColumnOutOfRange {
                line,
                column,
                width,
            } => {
                write!(
                    f,
                    "column {column} out of range for line {line} of width {width}"
                )
            }
            Self::InvalidOperation(what) => write!(f, "invalid operation: {what}"),
            Self::StyleCapacity { capacity } => {
                write!(f, "style table full ({capacity} layers)")
            }
            Self::Pattern(e) => write!(f, "invalid search pattern: {e}"),
            Self::Decode { encoding } => write!(f, "text is not valid {encoding:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::Pattern(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::LineOutOfRange { line: 7, count: 3 };
        assert!(err.to_string().contains("line 7"));

        let err = Error::ColumnOutOfRange {
            line: 1,
            column: 12,
            width: 5,
        };
        assert!(err.to_string().contains("column 12"));

        let err = Error::StyleCapacity { capacity: 16 };
        assert!(err.to_string().contains("16 layers"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_pattern_error_conversion() {
        let err: Error = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, Error::Pattern(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
