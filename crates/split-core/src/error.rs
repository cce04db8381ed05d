use thiserror::Error;

/// Top-level error type for the split-core crate and dependents.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("unknown tokenizer: {0}")]
    UnknownTokenizer(String),

    #[error("unknown stemmer: {0}")]
    UnknownStemmer(String),

    #[error("invalid normalization operation: {0}")]
    InvalidNormalization(String),

    /// A tokenizer emitted text that does not occur in the scanned line at or
    /// after the current search cursor.
    #[error("cannot find text of {token:?} in {scanned:?} at or after character {cursor} (line {line})")]
    Mapping {
        /// Zero-based index of the line within the document.
        line: usize,
        token: String,
        /// Character offset into `scanned` where the search started.
        cursor: usize,
        scanned: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SplitError {
    /// `true` for errors caused by the options rather than by the text.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SplitError::UnknownTokenizer(_)
                | SplitError::UnknownStemmer(_)
                | SplitError::InvalidNormalization(_)
        )
    }
}

/// Convenience Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(SplitError::UnknownTokenizer("bogus".into()).is_configuration());
        assert!(SplitError::UnknownStemmer("bogus".into()).is_configuration());
        assert!(SplitError::InvalidNormalization("replace".into()).is_configuration());

        let mapping = SplitError::Mapping {
            line: 0,
            token: "x".into(),
            cursor: 0,
            scanned: "abc".into(),
        };
        assert!(!mapping.is_configuration());
    }

    #[test]
    fn mapping_error_names_token_and_line() {
        let err = SplitError::Mapping {
            line: 3,
            token: "zz".into(),
            cursor: 2,
            scanned: "one two".into(),
        };
        let message = err.to_string();
        assert!(message.contains("\"zz\""));
        assert!(message.contains("line 3"));
        assert!(message.contains("offset 2"));
    }
}
