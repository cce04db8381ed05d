//! Normalization: an ordered chain of whole-string transforms.
//!
//! Every transform is applied to an [`AlignedText`], which carries, for each
//! output character, the range of source characters it was produced from.
//! The map survives transforms that change length (`ß → ss`, `& → and`,
//! deleting a hyphen), so a token found in normalized text can always be
//! traced back to an exact span of the original line.

use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::debug;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

use split_core::{NormalizationOp, Result, SplitError, SplitOptions};

use crate::offsets::CharOffsets;

// ---------------------------------------------------------------------------
// AlignedText
// ---------------------------------------------------------------------------

/// Normalized text plus a per-character map back to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedText {
    text: String,
    /// Source character range of each character of `text`, non-decreasing.
    origins: Vec<Range<usize>>,
    /// Length of the source in characters.
    source_len: usize,
}

impl AlignedText {
    /// Text that maps one-to-one onto itself.
    pub fn identity(text: &str) -> Self {
        let origins: Vec<Range<usize>> = (0..text.chars().count()).map(|i| i..i + 1).collect();
        Self {
            text: text.to_string(),
            source_len: origins.len(),
            origins,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Source character range covered by characters `[start, end)` of this
    /// text. An empty range maps to the source position just before the
    /// character at `start`.
    pub fn source_span(&self, start: usize, end: usize) -> Range<usize> {
        let begin = self.boundary(start);
        if end <= start {
            return begin..begin;
        }
        let last = self
            .origins
            .get(end - 1)
            .map(|r| r.end)
            .unwrap_or(self.source_len);
        begin..last.max(begin)
    }

    fn boundary(&self, index: usize) -> usize {
        self.origins
            .get(index)
            .map(|r| r.start)
            .unwrap_or(self.source_len)
    }
}

/// Accumulates the output of one transform over an [`AlignedText`].
struct Rewrite<'a> {
    prev: &'a AlignedText,
    text: String,
    origins: Vec<Range<usize>>,
}

impl<'a> Rewrite<'a> {
    fn new(prev: &'a AlignedText) -> Self {
        Self {
            prev,
            text: String::with_capacity(prev.text.len()),
            origins: Vec::with_capacity(prev.origins.len()),
        }
    }

    /// Emit `ch` as produced from character `index` of the previous text.
    fn push_char(&mut self, ch: char, index: usize) {
        let origin = self.prev.source_span(index, index + 1);
        self.text.push(ch);
        self.origins.push(origin);
    }

    /// Emit `piece` as produced from characters `[start, end)` of the
    /// previous text.
    fn push_str(&mut self, piece: &str, start: usize, end: usize) {
        let origin = self.prev.source_span(start, end);
        for ch in piece.chars() {
            self.text.push(ch);
            self.origins.push(origin.clone());
        }
    }

    fn finish(self) -> AlignedText {
        AlignedText {
            text: self.text,
            origins: self.origins,
            source_len: self.prev.source_len,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchPattern
// ---------------------------------------------------------------------------

/// The search half of a `replace` operation.
#[derive(Debug, Clone)]
pub enum SearchPattern {
    /// Plain text; only the first occurrence is replaced.
    Literal(String),
    /// Written as `/pattern/flags`. `global` (the `g` flag) replaces every
    /// match instead of the first.
    Regex { regex: Regex, global: bool },
}

impl SearchPattern {
    pub fn parse(search: &str) -> Result<Self> {
        if let Some((pattern, flags)) = split_pattern_literal(search) {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .dot_matches_new_line(flags.contains('s'))
                .build()
                .map_err(|e| {
                    SplitError::InvalidNormalization(format!("bad search pattern {search:?}: {e}"))
                })?;
            return Ok(SearchPattern::Regex {
                regex,
                global: flags.contains('g'),
            });
        }
        Ok(SearchPattern::Literal(search.to_string()))
    }

    /// Byte ranges to replace in `text`, each with its expanded replacement.
    fn matches(&self, text: &str, replacement: &str) -> Vec<(Range<usize>, String)> {
        match self {
            SearchPattern::Literal(needle) => text
                .find(needle.as_str())
                .map(|at| (at..at + needle.len(), replacement.to_string()))
                .into_iter()
                .collect(),
            SearchPattern::Regex { regex, global } => {
                let limit = if *global { usize::MAX } else { 1 };
                regex
                    .captures_iter(text)
                    .take(limit)
                    .filter_map(|caps| {
                        let whole = caps.get(0)?;
                        let mut expanded = String::new();
                        caps.expand(replacement, &mut expanded);
                        Some((whole.range(), expanded))
                    })
                    .collect()
            }
        }
    }
}

/// Split `/pattern/flags` into its parts. Anything else is not a pattern.
fn split_pattern_literal(search: &str) -> Option<(&str, &str)> {
    let body = search.strip_prefix('/')?;
    let close = body.rfind('/')?;
    let (pattern, flags) = (&body[..close], &body[close + 1..]);
    if pattern.is_empty() || !flags.chars().all(|c| "gimsuy".contains(c)) {
        return None;
    }
    Some((pattern, flags))
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Step {
    Lowercase,
    Replace {
        pattern: SearchPattern,
        replacement: String,
    },
    Diacritics,
}

/// A compiled normalization chain.
#[derive(Debug, Clone)]
pub struct Normalizer {
    steps: Vec<Step>,
}

impl Normalizer {
    /// Compile `ops` in order. Unrecognized operations are skipped.
    pub fn new(ops: &[NormalizationOp]) -> Result<Self> {
        let mut steps = Vec::with_capacity(ops.len());
        for op in ops {
            match op {
                NormalizationOp::Lowercase => steps.push(Step::Lowercase),
                NormalizationOp::Diacritics => steps.push(Step::Diacritics),
                NormalizationOp::Replace {
                    search,
                    replacement,
                } => steps.push(Step::Replace {
                    pattern: SearchPattern::parse(search)?,
                    replacement: replacement.clone(),
                }),
                NormalizationOp::Unrecognized(parts) => {
                    debug!(operation = ?parts, "skipping unrecognized normalization operation");
                }
            }
        }
        Ok(Self { steps })
    }

    pub fn from_options(options: &SplitOptions) -> Result<Self> {
        Self::new(&options.normalization_ops())
    }

    /// `true` when the chain has no steps. Unrecognized operations are not
    /// counted.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalize_aligned(text).into_string()
    }

    pub fn normalize_aligned(&self, text: &str) -> AlignedText {
        self.steps
            .iter()
            .fold(AlignedText::identity(text), |current, step| apply(step, &current))
    }
}

/// Normalize `text` with the operations configured in `options`.
pub fn normalize(options: &SplitOptions, text: &str) -> Result<String> {
    Ok(Normalizer::from_options(options)?.normalize(text))
}

fn apply(step: &Step, prev: &AlignedText) -> AlignedText {
    match step {
        Step::Lowercase => map_chars(prev, |ch, out| out.extend(ch.to_lowercase())),
        Step::Diacritics => map_chars(prev, strip_diacritics),
        Step::Replace {
            pattern,
            replacement,
        } => replace(prev, pattern, replacement),
    }
}

/// Rewrite each character independently.
fn map_chars(prev: &AlignedText, f: impl Fn(char, &mut String)) -> AlignedText {
    let mut out = Rewrite::new(prev);
    let mut piece = String::new();
    for (index, ch) in prev.text.chars().enumerate() {
        piece.clear();
        f(ch, &mut piece);
        for produced in piece.chars() {
            out.push_char(produced, index);
        }
    }
    out.finish()
}

fn replace(prev: &AlignedText, pattern: &SearchPattern, replacement: &str) -> AlignedText {
    let text = prev.as_str();
    let offsets = CharOffsets::new(text);
    let mut out = Rewrite::new(prev);

    let mut last = 0;
    for (range, expanded) in pattern.matches(text, replacement) {
        copy_unchanged(&mut out, &offsets, text, last..range.start);
        out.push_str(
            &expanded,
            offsets.char_at(range.start),
            offsets.char_at(range.end),
        );
        last = range.end;
    }
    copy_unchanged(&mut out, &offsets, text, last..text.len());
    out.finish()
}

/// Copy the bytes `range` of `text` one character at a time.
fn copy_unchanged(out: &mut Rewrite<'_>, offsets: &CharOffsets, text: &str, range: Range<usize>) {
    let first = offsets.char_at(range.start);
    for (i, ch) in text[range].chars().enumerate() {
        out.push_char(ch, first + i);
    }
}

// ---------------------------------------------------------------------------
// Diacritics
// ---------------------------------------------------------------------------

/// Append `ch` without its diacritical marks.
///
/// Letters whose canonical decomposition carries combining marks keep only
/// their base characters. Letters with no decomposition, and base characters
/// that are themselves such letters (`ǿ` is `ø` plus an acute), are folded
/// through a fixed table. Everything else passes through, so the result is
/// stable under a second application.
fn strip_diacritics(ch: char, out: &mut String) {
    if ch.is_ascii() {
        out.push(ch);
        return;
    }
    if let Some(folded) = fold_undecomposable(ch) {
        out.push_str(folded);
        return;
    }
    let mut base = String::new();
    let mut had_mark = false;
    decompose_canonical(ch, |c| {
        if is_combining_mark(c) {
            had_mark = true;
        } else if let Some(folded) = fold_undecomposable(c) {
            base.push_str(folded);
        } else {
            base.push(c);
        }
    });
    if had_mark {
        out.push_str(&base);
    } else {
        out.push(ch);
    }
}

/// Letters with a stroke or ligature that Unicode does not decompose.
fn fold_undecomposable(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'ø' => "o",
        'Ø' => "O",
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        'ħ' => "h",
        'Ħ' => "H",
        'ŧ' => "t",
        'Ŧ' => "T",
        'ı' => "i",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
