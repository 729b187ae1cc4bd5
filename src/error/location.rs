//! Index to line/column conversion
//!
//!     Parse errors carry an absolute byte index into the source. Users want a line and a
//!     column. SourceLocator pre-computes the byte offset where every line starts, so each
//!     conversion is a binary search plus a character count within one line.
//!
//!     Lines and columns are 1-based. A tab counts as a single column, and columns count
//!     characters, not bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Converts byte indices within one source text to [Location]s.
pub struct SourceLocator<'a> {
    source: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceLocator<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(byte_pos, _)| byte_pos + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Location of `index`. Indices past the end resolve to the position just after the
    /// last character.
    pub fn locate(&self, index: usize) -> Location {
        let index = index.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&index)
            .unwrap_or_else(|i| i - 1);
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..index)
            .map_or(index - line_start, |text| text.chars().count());
        Location::new(line + 1, column + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let loc = SourceLocator::new("hello");
        assert_eq!(loc.locate(0), Location::new(1, 1));
        assert_eq!(loc.locate(4), Location::new(1, 5));
        assert_eq!(loc.locate(5), Location::new(1, 6));
    }

    #[test]
    fn test_multi_line() {
        let loc = SourceLocator::new("ab\ncd\n\nef");
        assert_eq!(loc.line_count(), 4);
        assert_eq!(loc.locate(2), Location::new(1, 3));
        assert_eq!(loc.locate(3), Location::new(2, 1));
        assert_eq!(loc.locate(6), Location::new(3, 1));
        assert_eq!(loc.locate(8), Location::new(4, 2));
    }

    #[test]
    fn test_columns_count_characters() {
        let loc = SourceLocator::new("é\tx");
        assert_eq!(loc.locate(3), Location::new(1, 3));
    }

    #[test]
    fn test_past_end_is_clamped() {
        let loc = SourceLocator::new("ab");
        assert_eq!(loc.locate(99), Location::new(1, 3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(3, 7).to_string(), "line 3, column 7");
    }
}
