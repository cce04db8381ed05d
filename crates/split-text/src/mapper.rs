//! Locates tokenizer output within its line.
//!
//! Tokens are searched for left to right with a cursor that only moves
//! forward, so a repeated word binds to its next occurrence rather than the
//! first one: in `"the the"` the second `the` maps to columns 4..7.
//!
//! When the line was normalized before tokenizing, tokens are found in the
//! normalized text and their spans are carried back to the original line
//! through the [`AlignedText`] offset map.

use split_core::{Result, SplitError};

use crate::normalize::AlignedText;
use crate::offsets::CharOffsets;

/// A token placed within its line. Columns are character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedToken {
    /// Original line text covered by the token.
    pub text: String,
    /// Set when the token was found in normalized text; it is then the
    /// normalized form and needs no further normalization.
    pub normalized: Option<String>,
    pub begin: usize,
    pub end: usize,
}

/// Map `tokens`, produced by scanning `scanned` (or `original` when `None`),
/// to spans of `original`.
///
/// Fails with [`SplitError::Mapping`] on the first token that does not occur
/// at or after the cursor; `line` is reported in that error.
pub fn map_tokens(
    line: usize,
    original: &str,
    scanned: Option<&AlignedText>,
    tokens: &[String],
) -> Result<Vec<MappedToken>> {
    let haystack = scanned.map(AlignedText::as_str).unwrap_or(original);
    let haystack_offsets = CharOffsets::new(haystack);
    let original_offsets = scanned.map(|_| CharOffsets::new(original));

    let mut cursor = 0;
    let mut mapped = Vec::with_capacity(tokens.len());

    for token in tokens {
        let found = haystack
            .get(cursor..)
            .and_then(|rest| rest.find(token.as_str()))
            .map(|at| cursor + at)
            .ok_or_else(|| SplitError::Mapping {
                line,
                token: token.clone(),
                cursor: haystack_offsets.char_at(cursor),
                scanned: haystack.to_string(),
            })?;
        let end = found + token.len();
        cursor = end;

        let begin_char = haystack_offsets.char_at(found);
        let end_char = haystack_offsets.char_at(end);

        let placed = match (scanned, &original_offsets) {
            (Some(aligned), Some(offsets)) => {
                let span = aligned.source_span(begin_char, end_char);
                MappedToken {
                    text: offsets.slice(original, span.clone()).to_string(),
                    normalized: Some(token.clone()),
                    begin: span.start,
                    end: span.end,
                }
            }
            _ => MappedToken {
                text: token.clone(),
                normalized: None,
                begin: begin_char,
                end: end_char,
            },
        };
        mapped.push(placed);
    }

    Ok(mapped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use split_core::NormalizationOp;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn spans(mapped: &[MappedToken]) -> Vec<(usize, usize)> {
        mapped.iter().map(|m| (m.begin, m.end)).collect()
    }

    #[test]
    fn repeated_words_bind_to_successive_occurrences() {
        let mapped = map_tokens(0, "the the", None, &strings(&["the", "the"])).unwrap();
        assert_eq!(spans(&mapped), vec![(0, 3), (4, 7)]);
        assert!(mapped.iter().all(|m| m.normalized.is_none()));
    }

    #[test]
    fn punctuation_and_words() {
        let mapped = map_tokens(
            0,
            "One Two Three.",
            None,
            &strings(&["One", "Two", "Three", "."]),
        )
        .unwrap();
        assert_eq!(spans(&mapped), vec![(0, 3), (4, 7), (8, 13), (13, 14)]);
    }

    #[test]
    fn columns_are_characters() {
        let mapped = map_tokens(0, "café crème", None, &strings(&["café", "crème"])).unwrap();
        assert_eq!(spans(&mapped), vec![(0, 4), (5, 10)]);
    }

    #[test]
    fn missing_token_is_a_mapping_error() {
        let err = map_tokens(7, "alpha beta", None, &strings(&["alpha", "gamma"])).unwrap_err();
        match err {
            SplitError::Mapping {
                line,
                token,
                cursor,
                ..
            } => {
                assert_eq!(line, 7);
                assert_eq!(token, "gamma");
                assert_eq!(cursor, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mapping_error_cursor_counts_characters() {
        // "déjà" is 4 characters but 6 bytes.
        let err = map_tokens(0, "déjà vu", None, &strings(&["déjà", "rêve"])).unwrap_err();
        assert!(matches!(err, SplitError::Mapping { cursor: 4, .. }), "{err:?}");
    }

    #[test]
    fn cursor_never_moves_backwards() {
        // "b" occurs only before "c", so it cannot be matched after it.
        let err = map_tokens(0, "a b c", None, &strings(&["a", "c", "b"])).unwrap_err();
        assert!(matches!(err, SplitError::Mapping { ref token, .. } if token == "b"));
    }

    #[test]
    fn search_is_case_sensitive() {
        assert!(map_tokens(0, "Word", None, &strings(&["word"])).is_err());
    }

    #[test]
    fn normalized_scan_recovers_original_text() {
        let normalizer =
            Normalizer::new(&[NormalizationOp::Lowercase, NormalizationOp::Diacritics]).unwrap();
        let line = "Él Niño";
        let aligned = normalizer.normalize_aligned(line);
        assert_eq!(aligned.as_str(), "el nino");

        let mapped = map_tokens(0, line, Some(&aligned), &strings(&["el", "nino"])).unwrap();
        assert_eq!(mapped[0].text, "Él");
        assert_eq!(mapped[0].normalized.as_deref(), Some("el"));
        assert_eq!(mapped[1].text, "Niño");
        assert_eq!(mapped[1].normalized.as_deref(), Some("nino"));
        assert_eq!(spans(&mapped), vec![(0, 2), (3, 7)]);
    }

    #[test]
    fn normalized_scan_survives_length_changes() {
        let normalizer = Normalizer::new(&[NormalizationOp::replace("/-/g", "")]).unwrap();
        let line = "co-op e-mail";
        let aligned = normalizer.normalize_aligned(line);

        let mapped = map_tokens(0, line, Some(&aligned), &strings(&["coop", "email"])).unwrap();
        assert_eq!(mapped[0].text, "co-op");
        assert_eq!(mapped[1].text, "e-mail");
        assert_eq!(spans(&mapped), vec![(0, 5), (6, 12)]);
    }

    #[test]
    fn empty_token_list_maps_to_nothing() {
        assert!(map_tokens(0, "anything", None, &[]).unwrap().is_empty());
    }
}
