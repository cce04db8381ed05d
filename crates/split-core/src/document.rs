use serde::{Deserialize, Serialize};

/// Stage name recorded once a document has been tokenized.
pub const STAGE_SPLIT: &str = "split";

/// Stage name recorded once every token carries a stem.
pub const STAGE_STEM: &str = "stem";

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A span of source text.
///
/// Columns are character offsets (Unicode scalar values, not bytes) within
/// the line, `begin_column` inclusive and `end_column` exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Source path, if the text came from a file.
    pub path: Option<String>,
    pub begin_line: usize,
    pub begin_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Location {
    pub fn new(
        path: Option<String>,
        begin_line: usize,
        begin_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self {
            path,
            begin_line,
            begin_column,
            end_line,
            end_column,
        }
    }

    /// Location covering a whole physical line of `len` characters.
    pub fn for_line(path: Option<String>, line: usize, len: usize) -> Self {
        Self::new(path, line, 0, line, len)
    }

    /// Derive the location of a column range inside this line's location.
    ///
    /// Path and line numbers are carried over; only the columns change.
    pub fn span(&self, begin_column: usize, end_column: usize) -> Self {
        Self {
            path: self.path.clone(),
            begin_line: self.begin_line,
            begin_column,
            end_line: self.begin_line,
            end_column,
        }
    }

    /// Number of characters covered, assuming a single-line span.
    pub fn len(&self) -> usize {
        self.end_column.saturating_sub(self.begin_column)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Atomic unit of text produced by the split stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Raw text exactly as it appears in the line.
    pub text: String,
    /// Text after the configured normalization operations.
    pub normalized: String,
    /// Root form; present only when a stemmer ran.
    pub stem: Option<String>,
    /// Position of `text` within its line.
    pub location: Location,
    /// Position of this token in [`Document::tokens`].
    pub index: usize,
}

impl Token {
    pub fn new(location: Location, text: impl Into<String>, normalized: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            normalized: normalized.into(),
            stem: None,
            location,
            index: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One physical line of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub location: Location,
    /// Indexes into [`Document::tokens`], in left-to-right order.
    #[serde(default)]
    pub tokens: Vec<usize>,
}

impl Line {
    pub fn new(location: Location, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location,
            tokens: Vec::new(),
        }
    }

    /// Return the characters `[begin, end)` of the line, or `None` when the
    /// range falls outside the text.
    pub fn slice_chars(&self, begin: usize, end: usize) -> Option<&str> {
        if begin > end {
            return None;
        }
        let start = char_to_byte(&self.text, begin)?;
        let stop = char_to_byte(&self.text, end)?;
        Some(&self.text[start..stop])
    }

    /// Length of the line in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Byte offset of the `char_idx`-th character; `text.len()` for one past the end.
fn char_to_byte(text: &str, char_idx: usize) -> Option<usize> {
    text.char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .nth(char_idx)
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document under analysis: its lines, the flat token list, and the
/// processing stages that have already run over it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub lines: Vec<Line>,
    /// Every token of every line, line-major then left-to-right.
    #[serde(default)]
    pub tokens: Vec<Token>,
    /// Stage names in the order they were first recorded; no duplicates.
    #[serde(default)]
    pub processed_stages: Vec<String>,
}

impl Document {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            tokens: Vec::new(),
            processed_stages: Vec::new(),
        }
    }

    /// Build a document from raw text, one [`Line`] per physical line.
    ///
    /// Line numbers are 1-based. A trailing `\r` is dropped from each line.
    pub fn from_text(path: Option<&str>, text: &str) -> Self {
        let lines = text
            .split('\n')
            .enumerate()
            .map(|(i, raw)| {
                let raw = raw.strip_suffix('\r').unwrap_or(raw);
                let location =
                    Location::for_line(path.map(str::to_owned), i + 1, raw.chars().count());
                Line::new(location, raw)
            })
            .collect();
        Self::new(lines)
    }

    /// Record that `stage` has run. Recording a stage twice is a no-op.
    pub fn mark_processed(&mut self, stage: &str) {
        if !self.has_processed(stage) {
            self.processed_stages.push(stage.to_owned());
        }
    }

    pub fn has_processed(&self, stage: &str) -> bool {
        self.processed_stages.iter().any(|s| s == stage)
    }

    /// Tokens belonging to the line at `line_index`, resolved through the
    /// flat token list. Empty for an out-of-range line.
    pub fn line_tokens(&self, line_index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.lines
            .get(line_index)
            .map(|line| line.tokens.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&i| self.tokens.get(i))
    }

    /// Drop every token from the document and its lines, and forget the
    /// split and stem stages.
    pub fn clear_tokens(&mut self) {
        self.tokens.clear();
        for line in &mut self.lines {
            line.tokens.clear();
        }
        self.processed_stages
            .retain(|s| s != STAGE_SPLIT && s != STAGE_STEM);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
