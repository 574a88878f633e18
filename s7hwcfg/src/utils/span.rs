//! Source location tracking for configuration exports
//!
//! The export is line oriented, so locations are tracked per line. Columns
//! are kept for event rendering but sections always start at column 1.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the input with 1-based line and column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// First column of the given line
    pub fn line_start(line: u32) -> Self {
        Self { line, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of input lines from start to end position (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Span covering whole lines `first..=last`
    pub fn lines(first: u32, last: u32) -> Self {
        Self::new(Position::line_start(first), Position::line_start(last.max(first)))
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Number of lines covered
    pub fn line_count(&self) -> u32 {
        self.end.line - self.start.line + 1
    }

    /// Smallest span covering both spans
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "line {}", self.start.line)
        } else {
            write!(f, "lines {}-{}", self.start.line, self.end.line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span() {
        let span = Span::lines(4, 9);
        assert_eq!(span.start().line, 4);
        assert_eq!(span.end().line, 9);
        assert_eq!(span.line_count(), 6);
        assert_eq!(span.to_string(), "lines 4-9");
        assert_eq!(Span::lines(3, 3).to_string(), "line 3");
    }

    #[test]
    fn test_merge() {
        let merged = Span::lines(10, 12).merge(Span::lines(2, 4));
        assert_eq!(merged, Span::lines(2, 12));
    }
}
