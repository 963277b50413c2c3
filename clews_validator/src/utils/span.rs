//! Source location tracking
//!
//! Data files are validated line by line, so a position is a 1-based line and
//! column pair. Spans cover a whole physical line unless a narrower range is
//! known, which keeps findings and log events addressable by line number.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line and column.
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

    /// Column 1 of the given line
    pub fn line_start(line: u32) -> Self {
        Self { line, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Span covering `width` characters of a single line
    pub fn line(line: usize, width: usize) -> Self {
        let line = line as u32;
        Self {
            start: Position::line_start(line),
            end: Position::new(line, width as u32 + 1),
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn line_number(&self) -> usize {
        self.start.line as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Line lookup over an in-memory source, used to quote offending lines.
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
        }
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_number: usize) -> Option<&'a str> {
        if line_number == 0 {
            return None;
        }
        self.lines.get(line_number - 1).copied()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Span of the full text on a line, if it exists
    pub fn span_of_line(&self, line_number: usize) -> Option<Span> {
        self.get_line(line_number)
            .map(|text| Span::line(line_number, text.chars().count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span_covers_text() {
        let span = Span::line(12, 5);
        assert_eq!(span.start(), Position::new(12, 1));
        assert_eq!(span.end(), Position::new(12, 6));
        assert_eq!(span.line_number(), 12);
        assert_eq!(span.to_string(), "12:1-6");
    }

    #[test]
    fn test_source_map_lookup_is_one_based() {
        let map = SourceMap::new("set YEAR := 2015;\nparam CapitalCost :=\nPWRBIO 10 20\n");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(1), Some("set YEAR := 2015;"));
        assert_eq!(map.get_line(3), Some("PWRBIO 10 20"));
        assert_eq!(map.get_line(4), None);
    }

    #[test]
    fn test_span_of_line_uses_char_width() {
        let map = SourceMap::new("abc\n");
        assert_eq!(map.span_of_line(1), Some(Span::line(1, 3)));
        assert_eq!(map.span_of_line(2), None);
    }
}
