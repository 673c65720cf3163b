//! Error types for the sequence tokenizer library.

use crate::tokens::Token;
use thiserror::Error;

/// Main error type for tokenizer operations.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Invalid tokenizer configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No unused output id left for a new input symbol
    #[error("Vocabulary full: no unused id for input symbol {symbol}")]
    VocabFull { symbol: Token },

    /// Dictionary cannot grow past its configured bound
    #[error("Dictionary full: cannot grow past {limit} entries")]
    DictionaryFull { limit: usize },

    /// Encoding needed to grow the model but learning was disabled
    #[error("Learning disabled: {0}")]
    LearningDisabled(String),

    /// Context id with no coder or context row behind it
    #[error("Unknown context: {0}")]
    UnknownContext(Token),

    /// Token id absent from the learned model
    #[error("Unknown token: {0}")]
    UnknownToken(Token),

    /// A helper was asked for an element of an empty set
    #[error("Empty set: {0}")]
    EmptySet(String),
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
