//! Split stage driver.
//!
//! [`SplitPipeline`] is the primary entry point. It resolves the configured
//! tokenizer, stemmer and normalizer once, then walks the document's lines in
//! order: normalize (when configured to run first), tokenize, map positions,
//! stem, and append each token to both its line and the document.
//!
//! With `parallel` set, per-line work runs on the rayon pool and a final
//! sequential merge assigns token indexes, so the result is identical to a
//! sequential run.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use split_core::{Document, Line, Result, SplitOptions, Token, STAGE_SPLIT, STAGE_STEM};

use crate::mapper::map_tokens;
use crate::normalize::Normalizer;
use crate::stem::{create_stemmer, TokenStemmer};
use crate::tokenize::{create_tokenizer, TextTokenizer, TokenizerKind};

// ---------------------------------------------------------------------------
// SplitStats
// ---------------------------------------------------------------------------

/// Counts summarising one run over a document. Returned to hosts next to
/// the processed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitStats {
    pub tokenizer: TokenizerKind,
    pub lines: usize,
    /// Tokens appended by this run.
    pub tokens: usize,
    pub stemmed: bool,
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// SplitPipeline
// ---------------------------------------------------------------------------

/// A configured split stage. Holds no per-document state.
pub struct SplitPipeline {
    tokenizer: Box<dyn TextTokenizer>,
    stemmer: Option<Box<dyn TokenStemmer>>,
    normalizer: Normalizer,
    normalize_first: bool,
    parallel: bool,
}

impl SplitPipeline {
    /// Resolve every configured strategy.
    ///
    /// Unknown tokenizer or stemmer names and malformed normalization
    /// operations fail here, before any document is touched.
    pub fn from_options(options: &SplitOptions) -> Result<Self> {
        let tokenizer = create_tokenizer(options.tokenizer.as_deref())?;
        let stemmer = options.stemmer.as_deref().map(create_stemmer).transpose()?;
        let normalizer = Normalizer::from_options(options)?;
        Ok(Self {
            tokenizer,
            stemmer,
            normalizer,
            normalize_first: options.normalize_before_tokenizing,
            parallel: options.parallel,
        })
    }

    /// Split every line of `document`.
    ///
    /// On a mapping failure the run stops: tokens of the lines before the
    /// failing one stay in the document and no stage is recorded.
    pub fn process(&self, document: &mut Document) -> Result<SplitStats> {
        let start = Instant::now();
        let mut next_index = document.tokens.len();
        let first_index = next_index;

        let outcome = if self.parallel {
            self.process_parallel(document, &mut next_index)
        } else {
            self.process_sequential(document, &mut next_index)
        };
        if let Err(err) = outcome {
            warn!(error = %err, appended = next_index - first_index, "split aborted");
            return Err(err);
        }

        document.mark_processed(STAGE_SPLIT);
        if self.stemmer.is_some() {
            document.mark_processed(STAGE_STEM);
        }

        let stats = SplitStats {
            tokenizer: self.tokenizer.kind(),
            lines: document.lines.len(),
            tokens: next_index - first_index,
            stemmed: self.stemmer.is_some(),
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            lines = stats.lines,
            tokens = stats.tokens,
            tokenizer = %stats.tokenizer,
            stemmer = self.stemmer.as_ref().map(|s| s.name()).unwrap_or("none"),
            stages = ?document.processed_stages,
            elapsed_ms = stats.elapsed_ms,
            "split document"
        );
        Ok(stats)
    }

    fn process_sequential(&self, document: &mut Document, next_index: &mut usize) -> Result<()> {
        for line_index in 0..document.lines.len() {
            let tokens = self.split_line(line_index, &document.lines[line_index])?;
            append(document, line_index, tokens, next_index);
        }
        Ok(())
    }

    fn process_parallel(&self, document: &mut Document, next_index: &mut usize) -> Result<()> {
        // Collect (line index, tokens) pairs so the merge can restore line
        // order after parallel processing.
        let mut per_line: Vec<(usize, Result<Vec<Token>>)> = document
            .lines
            .par_iter()
            .enumerate()
            .map(|(line_index, line)| (line_index, self.split_line(line_index, line)))
            .collect();
        per_line.sort_by_key(|(i, _)| *i);

        for (line_index, tokens) in per_line {
            append(document, line_index, tokens?, next_index);
        }
        Ok(())
    }

    /// Produce the tokens of one line, without indexes.
    fn split_line(&self, line_index: usize, line: &Line) -> Result<Vec<Token>> {
        let mapped = if self.normalize_first {
            let aligned = self.normalizer.normalize_aligned(&line.text);
            let pieces = self.tokenizer.tokenize(aligned.as_str());
            map_tokens(line_index, &line.text, Some(&aligned), &pieces)?
        } else {
            let pieces = self.tokenizer.tokenize(&line.text);
            map_tokens(line_index, &line.text, None, &pieces)?
        };

        let tokens: Vec<Token> = mapped
            .into_iter()
            .map(|m| {
                let normalized = m
                    .normalized
                    .unwrap_or_else(|| self.normalizer.normalize(&m.text));
                let mut token = Token::new(line.location.span(m.begin, m.end), m.text, normalized);
                token.stem = self.stemmer.as_ref().map(|s| s.stem(&token.normalized));
                token
            })
            .collect();

        debug!(line = line_index, tokens = tokens.len(), "split line");
        Ok(tokens)
    }
}

/// Split `document` with `options` in one call.
pub fn process(document: &mut Document, options: &SplitOptions) -> Result<SplitStats> {
    SplitPipeline::from_options(options)?.process(document)
}

/// Append `tokens` to line `line_index` and to the document, numbering them
/// from `next_index`.
fn append(document: &mut Document, line_index: usize, tokens: Vec<Token>, next_index: &mut usize) {
    for mut token in tokens {
        token.index = *next_index;
        *next_index += 1;
        document.lines[line_index].tokens.push(token.index);
        document.tokens.push(token);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use split_core::{Location, NormalizationOp, SplitError};

    fn doc(lines: &[&str]) -> Document {
        Document::from_text(Some("test.txt"), &lines.join("\n"))
    }

    fn options(tokenizer: Option<&str>, stemmer: Option<&str>) -> SplitOptions {
        SplitOptions {
            tokenizer: tokenizer.map(str::to_string),
            stemmer: stemmer.map(str::to_string),
            ..SplitOptions::default()
        }
    }

    fn texts(document: &Document) -> Vec<&str> {
        document.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn normalized(document: &Document) -> Vec<&str> {
        document.tokens.iter().map(|t| t.normalized.as_str()).collect()
    }

    #[test]
    fn splits_a_line_into_tokens() {
        let mut document = doc(&["one two three"]);
        process(&mut document, &SplitOptions::default()).unwrap();

        assert_eq!(texts(&document), vec!["one", "two", "three"]);
        assert_eq!(normalized(&document), vec!["one", "two", "three"]);
        assert!(document.tokens.iter().all(|t| t.stem.is_none()));
        assert_eq!(document.lines.len(), 1);
        assert_eq!(document.lines[0].tokens, vec![0, 1, 2]);
    }

    #[test]
    fn default_configuration_lowercases_and_splits_punctuation() {
        let mut document = doc(&["One Two Three."]);
        process(&mut document, &SplitOptions::default()).unwrap();

        assert_eq!(texts(&document), vec!["One", "Two", "Three", "."]);
        assert_eq!(normalized(&document), vec!["one", "two", "three", "."]);
        assert!(document.tokens.iter().all(|t| t.stem.is_none()));
        assert_eq!(document.processed_stages, vec!["split"]);
    }

    #[test]
    fn porter_stemmer_sets_stems_and_stage() {
        let mut document = doc(&["One Two Three."]);
        let stats = process(&mut document, &options(None, Some("porter"))).unwrap();

        let stems: Vec<Option<&str>> = document.tokens.iter().map(|t| t.stem.as_deref()).collect();
        assert_eq!(stems, vec![Some("on"), Some("two"), Some("three"), Some(".")]);
        assert_eq!(document.processed_stages, vec!["split", "stem"]);
        assert!(stats.stemmed);
        assert_eq!(stats.tokens, 4);
        assert_eq!(stats.tokenizer, TokenizerKind::WordPunctuationSplit);
        assert_eq!(stats.lines, 1);
    }

    #[test]
    fn repeated_word_maps_to_disjoint_spans() {
        let mut document = doc(&["the the"]);
        process(&mut document, &options(Some("plain-word"), None)).unwrap();

        let spans: Vec<(usize, usize)> = document
            .tokens
            .iter()
            .map(|t| (t.location.begin_column, t.location.end_column))
            .collect();
        assert_eq!(spans, vec![(0, 3), (4, 7)]);
    }

    #[test]
    fn unknown_tokenizer_fails_before_any_token() {
        let mut document = doc(&["one two"]);
        let err = process(&mut document, &options(Some("bogus"), None)).unwrap_err();

        assert!(matches!(err, SplitError::UnknownTokenizer(ref n) if n == "bogus"));
        assert!(err.is_configuration());
        assert!(document.tokens.is_empty());
        assert!(document.processed_stages.is_empty());
    }

    #[test]
    fn unknown_stemmer_fails_before_any_token() {
        let mut document = doc(&["one two"]);
        let err = process(&mut document, &options(None, Some("bogus"))).unwrap_err();
        assert!(matches!(err, SplitError::UnknownStemmer(_)));
        assert!(document.tokens.is_empty());
    }

    #[test]
    fn tokens_are_numbered_line_major() {
        let mut document = doc(&["a b", "", "c d e"]);
        process(&mut document, &SplitOptions::default()).unwrap();

        assert_eq!(document.tokens.len(), 5);
        for (i, token) in document.tokens.iter().enumerate() {
            assert_eq!(token.index, i);
        }
        assert_eq!(document.lines[0].tokens, vec![0, 1]);
        assert!(document.lines[1].tokens.is_empty());
        assert_eq!(document.lines[2].tokens, vec![2, 3, 4]);

        let third: Vec<&str> = document.line_tokens(2).map(|t| t.text.as_str()).collect();
        assert_eq!(third, vec!["c", "d", "e"]);
    }

    #[test]
    fn locations_carry_path_and_line_number() {
        let mut document = doc(&["first", "second line"]);
        process(&mut document, &SplitOptions::default()).unwrap();

        let line = &document.tokens[2].location;
        assert_eq!(line.path.as_deref(), Some("test.txt"));
        assert_eq!(line.begin_line, 2);
        assert_eq!(line.end_line, 2);
        assert_eq!((line.begin_column, line.end_column), (7, 11));
    }

    #[test]
    fn custom_normalization_applies_per_token() {
        let mut document = doc(&["Crème Brûlée"]);
        let opts = SplitOptions {
            normalization: Some(vec![NormalizationOp::Lowercase, NormalizationOp::Diacritics]),
            ..SplitOptions::default()
        };
        process(&mut document, &opts).unwrap();

        assert_eq!(texts(&document), vec!["Crème", "Brûlée"]);
        assert_eq!(normalized(&document), vec!["creme", "brulee"]);
    }

    #[test]
    fn normalizing_first_keeps_original_text_and_spans() {
        let mut document = doc(&["rock & roll"]);
        let opts = SplitOptions {
            normalization: Some(vec![
                NormalizationOp::Lowercase,
                NormalizationOp::replace("&", "and"),
            ]),
            normalize_before_tokenizing: true,
            ..SplitOptions::default()
        };
        process(&mut document, &opts).unwrap();

        assert_eq!(texts(&document), vec!["rock", "&", "roll"]);
        assert_eq!(normalized(&document), vec!["rock", "and", "roll"]);
        let line = &document.lines[0];
        for token in &document.tokens {
            let loc = &token.location;
            assert_eq!(line.slice_chars(loc.begin_column, loc.end_column), Some(token.text.as_str()));
        }
    }

    #[test]
    fn stems_use_normalized_text() {
        let mut document = doc(&["Running"]);
        let opts = SplitOptions {
            stemmer: Some("porter".into()),
            normalization: Some(vec![]),
            ..SplitOptions::default()
        };
        process(&mut document, &opts).unwrap();
        assert_eq!(document.tokens[0].normalized, "Running");
        assert_eq!(document.tokens[0].stem.as_deref(), Some("run"));
    }

    #[test]
    fn mapping_failure_keeps_earlier_lines() {
        struct Inventing;
        impl TextTokenizer for Inventing {
            fn tokenize(&self, text: &str) -> Vec<String> {
                if text.contains("bad") {
                    vec!["missing".into()]
                } else {
                    text.split_whitespace().map(str::to_string).collect()
                }
            }
            fn kind(&self) -> crate::tokenize::TokenizerKind {
                crate::tokenize::TokenizerKind::PlainWord
            }
        }

        for parallel in [false, true] {
            let pipeline = SplitPipeline {
                tokenizer: Box::new(Inventing),
                stemmer: None,
                normalizer: Normalizer::new(&[]).unwrap(),
                normalize_first: false,
                parallel,
            };
            let mut document = doc(&["good line", "bad line", "never reached"]);
            let err = pipeline.process(&mut document).unwrap_err();

            assert!(matches!(err, SplitError::Mapping { line: 1, .. }), "parallel={parallel}");
            assert_eq!(texts(&document), vec!["good", "line"]);
            assert!(document.lines[2].tokens.is_empty());
            assert!(!document.has_processed(STAGE_SPLIT));
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let lines: Vec<String> = (0..50)
            .map(|i| format!("Line {i}: the quick brown fox, jumps {i} times."))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

        let mut sequential = doc(&refs);
        process(&mut sequential, &options(Some("treebank"), Some("porter"))).unwrap();

        let mut parallel = doc(&refs);
        let opts = SplitOptions {
            parallel: true,
            ..options(Some("treebank"), Some("porter"))
        };
        process(&mut parallel, &opts).unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn rerun_does_not_duplicate_stages() {
        let mut document = doc(&["a"]);
        let opts = options(None, Some("porter"));
        process(&mut document, &opts).unwrap();
        document.clear_tokens();
        process(&mut document, &opts).unwrap();
        assert_eq!(document.processed_stages, vec!["split", "stem"]);
        assert_eq!(document.tokens.len(), 1);
    }

    #[test]
    fn appends_after_existing_tokens() {
        let mut document = Document::new(vec![Line::new(Location::for_line(None, 1, 1), "z")]);
        let mut seed = Token::new(Location::default(), "seed", "seed");
        seed.index = 0;
        document.tokens.push(seed);

        process(&mut document, &SplitOptions::default()).unwrap();
        assert_eq!(document.tokens[1].index, 1);
        assert_eq!(document.lines[0].tokens, vec![1]);
    }
}
