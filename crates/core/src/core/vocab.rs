//! Ordered vocabulary sets.
//!
//! Vocabularies and unused-id pools are ordered integer sets, not
//! hash sets: id assignment takes "the smallest unused id" and must
//! not depend on hash iteration order.

use crate::error::{Result, TokenizerError};
use crate::tokens::Token;
use std::collections::BTreeSet;

/// Set of symbols, ordered for deterministic iteration.
pub type VocabSet = BTreeSet<Token>;

/// Collect the distinct symbols of `seq` into an ordered set.
pub fn vocab_of(seq: &[Token]) -> VocabSet {
    seq.iter().copied().collect()
}

/// Smallest element of `set`.
pub fn smallest(set: &VocabSet) -> Result<Token> {
    set.iter()
        .next()
        .copied()
        .ok_or_else(|| TokenizerError::EmptySet("no unused ids remain".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_of_dedups_and_orders() {
        let vocab = vocab_of(&[3, 1, 3, 2, 1]);
        let symbols: Vec<Token> = vocab.iter().copied().collect();
        assert_eq!(symbols, vec![1, 2, 3]);
    }

    #[test]
    fn test_smallest() {
        let vocab = vocab_of(&[9, 4, 7]);
        assert_eq!(smallest(&vocab).unwrap(), 4);
    }

    #[test]
    fn test_smallest_of_empty_fails() {
        let vocab = VocabSet::new();
        assert!(matches!(
            smallest(&vocab),
            Err(TokenizerError::EmptySet(_))
        ));
    }
}
