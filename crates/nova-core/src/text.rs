//! Text model primitives: sizes, ranges, positions, and conversions.

use serde::{Deserialize, Serialize};

pub use text_size::{TextRange, TextSize};

/// LSP-compatible position (zero-based line, UTF-16 code units).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// LSP-compatible half-open range (UTF-16 code units).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Pre-computed line start offsets for a particular text snapshot.
///
/// `\n`, `\r\n` and lone `\r` all terminate a line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    line_ends: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![TextSize::from(0)];
        let mut line_ends = Vec::new();

        let mut i = 0;
        while i < bytes.len() {
            let terminator_len = match bytes[i] {
                b'\n' => 1,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
                b'\r' => 1,
                _ => {
                    i += 1;
                    continue;
                }
            };
            line_ends.push(TextSize::from(i as u32));
            line_starts.push(TextSize::from((i + terminator_len) as u32));
            i += terminator_len;
        }
        line_ends.push(TextSize::from(text.len() as u32));

        Self {
            line_starts,
            line_ends,
            text_len: TextSize::from(text.len() as u32),
        }
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    fn line_of(&self, offset: TextSize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    /// Convert a byte offset into an LSP position.
    ///
    /// Offsets past the end are clamped to the end of the text, offsets inside a line
    /// terminator are clamped to the end of that line. `text` must be the snapshot this index
    /// was built from.
    pub fn position(&self, text: &str, offset: TextSize) -> Position {
        debug_assert_eq!(TextSize::from(text.len() as u32), self.text_len);
        let offset = offset.min(self.text_len);
        let line = self.line_of(offset);
        let start = usize::from(self.line_starts[line]);
        let end = usize::from(offset.min(self.line_ends[line]));
        let character = text
            .get(start..end)
            .map(|segment| segment.chars().map(|c| c.len_utf16() as u32).sum())
            .unwrap_or(0);

        Position::new(line as u32, character)
    }

    /// Convert a byte range into an LSP range.
    pub fn range(&self, text: &str, range: TextRange) -> Range {
        Range::new(
            self.position(text, range.start()),
            self.position(text, range.end()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positions_count_utf16_units() {
        // 😀 is a surrogate pair in UTF-16 (2 code units, 4 bytes in UTF-8).
        let text = "a😀b\nx";
        let index = LineIndex::new(text);

        assert_eq!(index.position(text, TextSize::from(0)), Position::new(0, 0));
        assert_eq!(index.position(text, TextSize::from(1)), Position::new(0, 1));
        assert_eq!(index.position(text, TextSize::from(5)), Position::new(0, 3));
        assert_eq!(index.position(text, TextSize::from(6)), Position::new(0, 4));
        assert_eq!(index.position(text, TextSize::from(7)), Position::new(1, 0));
    }

    #[test]
    fn crlf_and_lone_cr_terminate_lines() {
        let text = "a\r\nb\rc";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position(text, TextSize::from(3)), Position::new(1, 0));
        assert_eq!(index.position(text, TextSize::from(5)), Position::new(2, 0));
        // Inside `\r\n` clamps to the end of the first line.
        assert_eq!(index.position(text, TextSize::from(2)), Position::new(0, 1));
    }

    #[test]
    fn offsets_past_the_end_are_clamped() {
        let text = "ab";
        let index = LineIndex::new(text);
        assert_eq!(index.position(text, TextSize::from(10)), Position::new(0, 2));
    }
}
