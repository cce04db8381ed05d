//! Tokenizer strategies, selected by name.
//!
//! Every strategy returns substrings of its input in left-to-right order and
//! never fails. The position mapper relies on the substring property: it
//! locates each emitted token in the scanned line with a forward search.
//!
//! Strategies:
//! - `word-punctuation-split` (default): runs of word characters, and runs of
//!   punctuation. `"One Two Three."` → `[One][Two][Three][.]`
//! - `treebank`: Penn Treebank conventions. `"I can't."` → `[I][ca][n't][.]`
//! - `plain-word`: words only, split on non-word characters.
//! - `aggressive-punctuation`: letters and digits only; underscores split too.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use split_core::{Result, SplitError};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Splits text into an ordered sequence of substrings.
pub trait TextTokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    fn kind(&self) -> TokenizerKind;
}

/// Closed set of tokenizer strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenizerKind {
    #[default]
    WordPunctuationSplit,
    Treebank,
    PlainWord,
    AggressivePunctuation,
}

impl TokenizerKind {
    pub const ALL: [TokenizerKind; 4] = [
        TokenizerKind::WordPunctuationSplit,
        TokenizerKind::Treebank,
        TokenizerKind::PlainWord,
        TokenizerKind::AggressivePunctuation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenizerKind::WordPunctuationSplit => "word-punctuation-split",
            TokenizerKind::Treebank => "treebank",
            TokenizerKind::PlainWord => "plain-word",
            TokenizerKind::AggressivePunctuation => "aggressive-punctuation",
        }
    }

    /// Resolve a configured name. The class names used by older plugin
    /// configurations (`TreebankWordTokenizer`, ...) are accepted as aliases.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "word-punctuation-split" | "WordPunctTokenizer" => Ok(TokenizerKind::WordPunctuationSplit),
            "treebank" | "TreebankWordTokenizer" => Ok(TokenizerKind::Treebank),
            "plain-word" | "WordTokenizer" => Ok(TokenizerKind::PlainWord),
            "aggressive-punctuation" | "AggressiveTokenizer" => {
                Ok(TokenizerKind::AggressivePunctuation)
            }
            other => Err(SplitError::UnknownTokenizer(other.to_string())),
        }
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the tokenizer for `name`, or the default strategy when `None`.
pub fn create_tokenizer(name: Option<&str>) -> Result<Box<dyn TextTokenizer>> {
    let kind = match name {
        Some(name) => TokenizerKind::from_name(name)?,
        None => TokenizerKind::default(),
    };
    Ok(build(kind))
}

/// Build the tokenizer for an already-resolved kind.
pub fn build(kind: TokenizerKind) -> Box<dyn TextTokenizer> {
    match kind {
        TokenizerKind::WordPunctuationSplit => Box::new(WordPunctTokenizer::new()),
        TokenizerKind::Treebank => Box::new(TreebankTokenizer::new()),
        TokenizerKind::PlainWord => Box::new(SplitTokenizer::plain_word()),
        TokenizerKind::AggressivePunctuation => Box::new(SplitTokenizer::aggressive()),
    }
}

// ---------------------------------------------------------------------------
// Word / punctuation runs
// ---------------------------------------------------------------------------

pub struct WordPunctTokenizer {
    pattern: Regex,
}

impl WordPunctTokenizer {
    pub fn new() -> Self {
        Self {
            pattern: compile(r"\w+|[^\w\s]+"),
        }
    }
}

impl Default for WordPunctTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTokenizer for WordPunctTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::WordPunctuationSplit
    }
}

// ---------------------------------------------------------------------------
// Separator-based splitting
// ---------------------------------------------------------------------------

/// Emits the non-empty pieces between separator matches.
pub struct SplitTokenizer {
    separator: Regex,
    kind: TokenizerKind,
}

impl SplitTokenizer {
    pub fn plain_word() -> Self {
        Self {
            separator: compile(r"\W+"),
            kind: TokenizerKind::PlainWord,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            separator: compile(r"[^\p{L}\p{N}]+"),
            kind: TokenizerKind::AggressivePunctuation,
        }
    }
}

impl TextTokenizer for SplitTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.separator
            .split(text)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn kind(&self) -> TokenizerKind {
        self.kind
    }
}

// ---------------------------------------------------------------------------
// Treebank
// ---------------------------------------------------------------------------

/// Penn Treebank word tokenizer.
///
/// Works by inserting spaces around the pieces to separate and then splitting
/// on whitespace, so every emitted token is still a substring of the input.
pub struct TreebankTokenizer {
    /// Patterns whose capture groups become separate tokens, in order.
    contractions: Vec<(Regex, &'static str)>,
    punctuation: Regex,
    comma: Regex,
    quote: Regex,
    final_period: Regex,
    whitespace: Regex,
}

impl TreebankTokenizer {
    pub fn new() -> Self {
        let two = "${1} ${2}";
        let three = "${1} ${2} ${3}";
        let contractions = vec![
            (compile(r"(?i)(.)('ll|'re|'ve|n't|'s|'m|'d)\b"), two),
            (compile(r"(?i)\b(can)(not)\b"), two),
            (compile(r"(?i)\b(d)('ye)\b"), two),
            (compile(r"(?i)\b(gim)(me)\b"), two),
            (compile(r"(?i)\b(gon)(na)\b"), two),
            (compile(r"(?i)\b(got)(ta)\b"), two),
            (compile(r"(?i)\b(lem)(me)\b"), two),
            (compile(r"(?i)\b(mor)('n)\b"), two),
            (compile(r"(?i)\b(t)(is)\b"), two),
            (compile(r"(?i)\b(t)(was)\b"), two),
            (compile(r"(?i)\b(wan)(na)\b"), two),
            (compile(r"(?i)\b(whad)(dd)(ya)\b"), three),
            (compile(r"(?i)\b(wha)(t)(cha)\b"), three),
        ];
        Self {
            contractions,
            punctuation: compile(r"([^\w.'\-/+<>,&])"),
            comma: compile(r"(,\s)"),
            quote: compile(r"('\s)"),
            final_period: compile(r"\. *(\n|$)"),
            whitespace: compile(r"\s+"),
        }
    }
}

impl Default for TreebankTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTokenizer for TreebankTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut spaced = text.to_string();
        for (pattern, replacement) in &self.contractions {
            spaced = pattern.replace_all(&spaced, *replacement).into_owned();
        }
        spaced = self.punctuation.replace_all(&spaced, " ${1} ").into_owned();
        spaced = self.comma.replace_all(&spaced, " ${1}").into_owned();
        spaced = self.quote.replace_all(&spaced, " ${1}").into_owned();
        spaced = self.final_period.replace_all(&spaced, " . ").into_owned();

        self.whitespace
            .split(&spaced)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::Treebank
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Compile one of the fixed patterns above.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in tokenizer pattern must compile")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
