//! Conversion between byte offsets and character offsets.
//!
//! Searching happens on bytes (`str::find`), locations are reported in
//! characters. One table per string makes each conversion a lookup or a
//! binary search.

use std::ops::Range;

/// Byte offset of every character boundary in a string, including the end.
#[derive(Debug, Clone)]
pub struct CharOffsets {
    starts: Vec<usize>,
}

impl CharOffsets {
    pub fn new(text: &str) -> Self {
        let mut starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        starts.push(text.len());
        Self { starts }
    }

    /// Number of characters in the string.
    pub fn char_len(&self) -> usize {
        self.starts.len() - 1
    }

    /// Character index of `byte`. A byte inside a multi-byte character
    /// rounds up to the next boundary.
    pub fn char_at(&self, byte: usize) -> usize {
        match self.starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i.min(self.char_len()),
        }
    }

    /// Byte offset of character `index`; clamps to the end of the string.
    pub fn byte_at(&self, index: usize) -> usize {
        self.starts
            .get(index)
            .copied()
            .unwrap_or_else(|| self.starts[self.starts.len() - 1])
    }

    /// Slice `text` (the string this table was built from) by characters.
    pub fn slice<'a>(&self, text: &'a str, chars: Range<usize>) -> &'a str {
        let start = self.byte_at(chars.start);
        let end = self.byte_at(chars.end).max(start);
        &text[start..end]
    }
}
