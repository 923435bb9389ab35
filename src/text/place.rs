//! Line/column coordinates.

use std::cmp::Ordering;
use std::fmt;

/// A position in a buffer: display column `column` on line `line`.
///
/// Ordering is by line first, then column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Place {
    pub column: usize,
    pub line: usize,
}

impl Place {
    #[must_use]
    pub const fn new(column: usize, line: usize) -> Self {
        Self { column, line }
    }

    /// Same line, shifted column.
    #[must_use]
    pub const fn offset(self, dx: isize) -> Self {
        Self {
            column: self.column.saturating_add_signed(dx),
            line: self.line,
        }
    }
}

impl Ord for Place {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl PartialOrd for Place {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.line)
    }
}
