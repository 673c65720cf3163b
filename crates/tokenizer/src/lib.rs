//! Seqtok-tokenizer - composable, reversible sequence tokenizers
//!
//! This crate provides a family of tokenizers that learn reversible
//! mappings between integer token streams, plus a pipeline
//! combinator for chaining them. Every tokenizer guarantees that
//! `decode(encode(x))` reconstructs `x` exactly for input drawn from
//! its vocabulary.
//!
//! # Tokenizers
//!
//! - [`Bpe`] - iterative most-frequent-pair merging
//! - [`DefragEncoder`] - compacts a sparse vocabulary onto `1..=n`
//! - [`LzCoder`] - trie-backed dictionary coder with online learning
//! - [`HierarchicalLzCoder`] - per-context LZ coders cooperating by
//!   vote over a shared id namespace
//! - [`ContextualEncoder`] - per-context most-frequent-substring
//!   dictionary
//! - [`Pipeline`] - sequential composition of any of the above
//!
//! # Example
//!
//! ```rust
//! use seqtok_core::lift;
//! use seqtok_tokenizer::{Bpe, DefragEncoder, Pipeline, Tokenizer};
//!
//! let tokens = lift::from_str("aaabdaaabac");
//!
//! let mut pipeline = Pipeline::new(vec![
//!     Box::new(DefragEncoder::new()),
//!     Box::new(Bpe::with_max_output_vocab(10)),
//! ]);
//! pipeline.learn(&tokens, None)?;
//!
//! let encoded = pipeline.encode(&tokens)?;
//! assert_eq!(pipeline.decode(&encoded)?, tokens);
//! # Ok::<(), seqtok_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use seqtok_core::{Result, Token, TokenSeq, TokenizerError, VocabSet, EMPTY_TOKEN};

// Capability trait
pub mod tokenizer;
pub use tokenizer::Tokenizer;

// Tokenizer implementations
pub mod bpe;
pub use bpe::Bpe;

pub mod defrag;
pub use defrag::DefragEncoder;

pub mod lz;
pub use lz::LzCoder;

pub mod hierarchical;
pub use hierarchical::HierarchicalLzCoder;

pub mod contextual;
pub use contextual::ContextualEncoder;

// Composition
pub mod pipeline;
pub use pipeline::Pipeline;
