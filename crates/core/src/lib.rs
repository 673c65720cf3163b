//! Seqtok-core - shared primitives for composable sequence tokenizers
//!
//! This crate provides the data structures the tokenizer family is
//! built from, independent of any particular learning algorithm.
//!
//! # Features
//!
//! - Adjacent-pair statistics and greedy pair merging for BPE
//! - An ordered trie with longest-prefix lookup for LZ dictionaries
//! - Ordered vocabulary sets with deterministic smallest-id selection
//! - Input adapters lifting strings and byte buffers to symbols
//! - Error handling with enumerated failure kinds
//!
//! # Example
//!
//! ```rust
//! use seqtok_core::{merge_pairs, pair_stats};
//!
//! let stats = pair_stats(&[1, 1, 1, 2]);
//! assert_eq!(stats[&(1, 1)].count, 2);
//!
//! let merged = merge_pairs(&[1, 1, 1, 2], (1, 1), 9);
//! assert_eq!(merged, vec![9, 1, 2]);
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

pub mod tokens;
pub use tokens::{is_prefix, Pair, Token, TokenSeq, EMPTY_TOKEN};

// Core data structure modules
pub mod core;
pub use self::core::{
    merge_pairs, pair_stats, smallest, vocab_of, MergeCandidate, PairCount, PairPriorityQueue,
    TokenTrie, VocabSet,
};

// Input adapters
pub mod lift;
