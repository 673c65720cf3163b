//! Core data structures shared by every tokenizer.

pub mod pairs;
pub mod priority;
pub mod trie;
pub mod vocab;

pub use pairs::{merge_pairs, pair_stats, PairCount};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use trie::TokenTrie;
pub use vocab::{smallest, vocab_of, VocabSet};
