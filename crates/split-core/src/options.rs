//! Configuration for the split stage.
//!
//! Options arrive as JSON from the host. Each normalization operation is a
//! string array whose first element names the operation:
//!
//! ```json
//! {
//!   "tokenizer": "treebank",
//!   "stemmer": "porter",
//!   "normalization": [["lowercase"], ["replace", "/-+/g", " "], ["diacritics"]]
//! }
//! ```
//!
//! Strategy names are kept as strings here; they are resolved (and rejected)
//! by the factories in `split-text`.

use serde::{Deserialize, Serialize};

use crate::error::SplitError;

// ---------------------------------------------------------------------------
// NormalizationOp
// ---------------------------------------------------------------------------

/// One text transform in the normalization chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum NormalizationOp {
    Lowercase,
    /// Substitute `replacement` for `search`. A search of the form
    /// `/pattern/flags` is a regular expression; anything else is literal.
    Replace { search: String, replacement: String },
    Diacritics,
    /// An operation this version does not know. Applied as a no-op.
    Unrecognized(Vec<String>),
}

impl NormalizationOp {
    pub fn replace(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        NormalizationOp::Replace {
            search: search.into(),
            replacement: replacement.into(),
        }
    }

    /// Wire name of the operation.
    pub fn tag(&self) -> &str {
        match self {
            NormalizationOp::Lowercase => "lowercase",
            NormalizationOp::Replace { .. } => "replace",
            NormalizationOp::Diacritics => "diacritics",
            NormalizationOp::Unrecognized(parts) => parts.first().map(String::as_str).unwrap_or(""),
        }
    }
}

impl TryFrom<Vec<String>> for NormalizationOp {
    type Error = SplitError;

    fn try_from(parts: Vec<String>) -> Result<Self, Self::Error> {
        let Some(tag) = parts.first() else {
            return Ok(NormalizationOp::Unrecognized(parts));
        };
        match tag.as_str() {
            "lowercase" => Ok(NormalizationOp::Lowercase),
            "diacritics" => Ok(NormalizationOp::Diacritics),
            "replace" => {
                let search = parts.get(1).cloned().ok_or_else(|| {
                    SplitError::InvalidNormalization("replace requires a search argument".into())
                })?;
                let replacement = parts.get(2).cloned().unwrap_or_default();
                Ok(NormalizationOp::Replace {
                    search,
                    replacement,
                })
            }
            _ => Ok(NormalizationOp::Unrecognized(parts)),
        }
    }
}

impl From<NormalizationOp> for Vec<String> {
    fn from(op: NormalizationOp) -> Self {
        match op {
            NormalizationOp::Lowercase => vec!["lowercase".into()],
            NormalizationOp::Diacritics => vec!["diacritics".into()],
            NormalizationOp::Replace {
                search,
                replacement,
            } => vec!["replace".into(), search, replacement],
            NormalizationOp::Unrecognized(parts) => parts,
        }
    }
}

// ---------------------------------------------------------------------------
// SplitOptions
// ---------------------------------------------------------------------------

/// Runtime configuration for the split stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Tokenizer strategy name. Default: `word-punctuation-split`.
    pub tokenizer: Option<String>,
    /// Stemmer name. Default: no stemming.
    pub stemmer: Option<String>,
    /// Ordered normalization operations. Default: `[["lowercase"]]`.
    pub normalization: Option<Vec<NormalizationOp>>,
    /// Normalize the whole line and tokenize the result, instead of
    /// tokenizing the raw line and normalizing each token.
    pub normalize_before_tokenizing: bool,
    /// Split lines on the rayon pool, then merge in line order.
    pub parallel: bool,
}

impl SplitOptions {
    /// The configured operations, or the default single `lowercase`.
    pub fn normalization_ops(&self) -> Vec<NormalizationOp> {
        match &self.normalization {
            Some(ops) => ops.clone(),
            None => vec![NormalizationOp::Lowercase],
        }
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
