use thiserror::Error;

use crate::text::{LineIndex, Range, TextRange, TextSize};

/// A byte span that cannot be mapped onto a [`TextDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad location in {uri}: offset {offset} with length {length} (document length {text_len})")]
pub struct BadLocation {
    pub uri: String,
    pub offset: usize,
    pub length: usize,
    pub text_len: usize,
}

/// An immutable snapshot of a source file, addressed by URI.
///
/// Analyzers that work on byte offsets (e.g. tree-sitter nodes) use this to read node text and to
/// translate offsets into LSP ranges.
#[derive(Debug, Clone)]
pub struct TextDocument {
    uri: String,
    text: String,
    line_index: LineIndex,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self {
            uri: uri.into(),
            text,
            line_index,
        }
    }

    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Translate `offset..offset + length` into an LSP range.
    ///
    /// Fails when the span reaches past the end of the document or does not start and end on
    /// char boundaries, which happens when a syntax tree and its document snapshot disagree.
    pub fn to_range(&self, offset: usize, length: usize) -> Result<Range, BadLocation> {
        let end = offset.checked_add(length);
        let valid = end.is_some_and(|end| {
            end <= self.text.len()
                && self.text.is_char_boundary(offset)
                && self.text.is_char_boundary(end)
        });
        let Some(end) = end.filter(|_| valid) else {
            return Err(BadLocation {
                uri: self.uri.clone(),
                offset,
                length,
                text_len: self.text.len(),
            });
        };

        let range = TextRange::new(TextSize::from(offset as u32), TextSize::from(end as u32));
        Ok(self.line_index.range(&self.text, range))
    }
}
