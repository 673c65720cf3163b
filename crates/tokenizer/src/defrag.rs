//! Defragmenting id compactor.
//!
//! Maps an arbitrary input vocabulary onto the contiguous range
//! `1..=|V|` so that downstream stages see dense ids. Typically the
//! first stage of a pipeline over byte input.

use crate::tokenizer::Tokenizer;
use ahash::AHashMap;
use seqtok_core::{vocab_of, Result, Token, TokenSeq, TokenizerError, VocabSet};
use serde::{Deserialize, Serialize};

/// Bijective remapping of input symbols onto `1..=|V|`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefragEncoder {
    /// Input symbol -> dense id
    forward: AHashMap<Token, Token>,
    /// Dense id -> input symbol
    reverse: AHashMap<Token, Token>,
    input_vocab: VocabSet,
    output_vocab: VocabSet,
}

impl DefragEncoder {
    /// Create an untrained defrag encoder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tokenizer for DefragEncoder {
    fn learn(&mut self, tokens: &[Token], input_vocab: Option<&VocabSet>) -> Result<()> {
        let vocab = input_vocab
            .cloned()
            .unwrap_or_else(|| vocab_of(tokens));

        self.forward.clear();
        self.reverse.clear();

        // Dense ids in ascending symbol order.
        for (idx, &v) in vocab.iter().enumerate() {
            let id = (idx + 1) as Token;
            self.forward.insert(v, id);
            self.reverse.insert(id, v);
        }

        self.output_vocab = (1..=vocab.len() as Token).collect();
        self.input_vocab = vocab;

        Ok(())
    }

    fn encode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        if self.forward.is_empty() {
            return Ok(tokens.to_vec());
        }

        tokens
            .iter()
            .map(|&t| {
                self.forward
                    .get(&t)
                    .copied()
                    .ok_or(TokenizerError::UnknownToken(t))
            })
            .collect()
    }

    fn decode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        if self.reverse.is_empty() {
            return Ok(tokens.to_vec());
        }

        tokens
            .iter()
            .map(|&t| {
                self.reverse
                    .get(&t)
                    .copied()
                    .ok_or(TokenizerError::UnknownToken(t))
            })
            .collect()
    }

    fn input_vocab(&self) -> &VocabSet {
        &self.input_vocab
    }

    fn output_vocab(&self) -> &VocabSet {
        &self.output_vocab
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_onto_contiguous_range() {
        let mut defrag = DefragEncoder::new();
        defrag.learn(&[200, 50, 120, 50], None).unwrap();

        // ascending symbol order: 50 -> 1, 120 -> 2, 200 -> 3
        assert_eq!(defrag.encode(&[200, 50, 120, 50]).unwrap(), vec![3, 1, 2, 1]);
        let ids: Vec<Token> = defrag.output_vocab().iter().copied().collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_roundtrip() {
        let tokens = vec![9, 7, 9, 1000, 7];
        let mut defrag = DefragEncoder::new();
        defrag.learn(&tokens, None).unwrap();

        let encoded = defrag.encode(&tokens).unwrap();
        assert_eq!(defrag.decode(&encoded).unwrap(), tokens);
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let mut defrag = DefragEncoder::new();
        defrag.learn(&[1, 2], None).unwrap();

        assert!(matches!(
            defrag.encode(&[3]),
            Err(TokenizerError::UnknownToken(3))
        ));
        assert!(matches!(
            defrag.decode(&[3]),
            Err(TokenizerError::UnknownToken(3))
        ));
    }

    #[test]
    fn test_untrained_is_identity() {
        let defrag = DefragEncoder::new();
        assert_eq!(defrag.encode(&[4, 5]).unwrap(), vec![4, 5]);
        assert_eq!(defrag.decode(&[4, 5]).unwrap(), vec![4, 5]);
    }
}
