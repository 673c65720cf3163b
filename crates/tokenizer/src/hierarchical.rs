//! Hierarchical LZ coding: one dictionary coder per context.
//!
//! The context is the id most recently emitted. Each context owns an
//! [`LzCoder`], all bounded by the same output id namespace. When a
//! context needs a fresh id, every other context is polled for the
//! id it would emit for the same input; the new id is chosen by vote
//! so that different contexts tend to converge on the same id for
//! the same substring.

use crate::lz::LzCoder;
use crate::tokenizer::Tokenizer;
use log::{debug, trace};
use seqtok_core::{
    vocab_of, Result, Token, TokenSeq, TokenizerError, VocabSet, EMPTY_TOKEN,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Family of per-context LZ coders sharing one output id namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchicalLzCoder {
    vocab_size: usize,
    /// Context id -> that context's coder; always holds the
    /// empty-context key
    coders: BTreeMap<Token, LzCoder>,
    /// Mirror of the empty-context coder's input vocabulary
    input_vocab: VocabSet,
    /// Union of assigned ids across every context
    output_vocab: VocabSet,
}

impl HierarchicalLzCoder {
    /// Create a coder family with the given output id namespace.
    ///
    /// The empty-context coder is seeded with `input_vocab`; coders
    /// for other contexts are created on demand during learning and
    /// start with empty vocabularies.
    pub fn new(vocab_size: usize, input_vocab: Option<&VocabSet>) -> Result<Self> {
        if let Some(vocab) = input_vocab {
            if vocab.len() > vocab_size {
                return Err(TokenizerError::InvalidConfig(format!(
                    "input vocabulary of {} symbols exceeds output vocab size {}",
                    vocab.len(),
                    vocab_size
                )));
            }
        }

        let root = LzCoder::new(Some(vocab_size), input_vocab)?;
        let input_vocab = root.input_vocab().clone();
        let output_vocab = root.output_vocab().clone();

        let mut coders = BTreeMap::new();
        coders.insert(EMPTY_TOKEN, root);

        Ok(Self {
            vocab_size,
            coders,
            input_vocab,
            output_vocab,
        })
    }

    /// The per-context coder table.
    pub fn coders(&self) -> &BTreeMap<Token, LzCoder> {
        &self.coders
    }

    /// Register unseen symbols with the empty-context coder.
    pub fn update_vocab(&mut self, seq: &[Token]) -> Result<()> {
        let root = self
            .coders
            .get_mut(&EMPTY_TOKEN)
            .ok_or(TokenizerError::UnknownContext(EMPTY_TOKEN))?;
        root.update_vocab(seq)?;
        self.input_vocab = root.input_vocab().clone();
        self.output_vocab
            .extend(root.output_vocab().iter().copied());
        Ok(())
    }

    /// Encode the next token of `seq` under `context`.
    ///
    /// New contexts are admitted only while learning. A fresh id is
    /// chosen by polling every other context: proposals already
    /// known to their own coder are tallied, and the unused id with
    /// the highest tally wins, ties going to the active coder's own
    /// smallest-unused proposal.
    pub fn encode_one(
        &mut self,
        seq: &[Token],
        context: Token,
        learn: bool,
    ) -> Result<(TokenSeq, Token)> {
        if seq.is_empty() {
            return Ok((TokenSeq::new(), EMPTY_TOKEN));
        }

        if !self.coders.contains_key(&context) {
            if !learn {
                return Err(TokenizerError::UnknownContext(context));
            }
            // A fresh context learns its own input vocabulary. If its
            // dictionary fills before covering the vocabulary, rare
            // symbols fall through to the empty-context coder via the
            // empty token.
            debug!("admitting new context {}", context);
            self.coders
                .insert(context, LzCoder::new(Some(self.vocab_size), None)?);
        }

        let active = self
            .coders
            .get(&context)
            .ok_or(TokenizerError::UnknownContext(context))?;
        let (prefix, native) = active.propose_next_token(seq, learn);

        if active.encoded_vocab().contains_key(&native) {
            return Ok((prefix, native));
        }
        if !learn {
            return Err(TokenizerError::LearningDisabled(
                "a new dictionary entry is needed but learning is disabled".into(),
            ));
        }

        // Poll the other contexts; only proposals their own coder
        // already knows count as votes.
        let mut tally: BTreeMap<Token, u32> = BTreeMap::new();
        tally.insert(native, 0);
        for (&other_context, other) in &self.coders {
            if other_context == context {
                continue;
            }
            let (_, vote) = other.propose_next_token(seq, learn);
            if other.encoded_vocab().contains_key(&vote) {
                *tally.entry(vote).or_insert(0) += 1;
            }
        }

        let mut chosen = native;
        let mut best = tally.get(&native).copied().unwrap_or(0);
        for (&candidate, &votes) in &tally {
            if votes > best && active.unused_tokens().contains(&candidate) {
                chosen = candidate;
                best = votes;
            }
        }

        if chosen != native {
            trace!(
                "context {} adopted id {} by vote ({} votes) over native {}",
                context,
                chosen,
                best,
                native
            );
        }

        let active = self
            .coders
            .get_mut(&context)
            .ok_or(TokenizerError::UnknownContext(context))?;
        active.add_new_token(&prefix, chosen);
        self.output_vocab.insert(chosen);

        Ok((prefix, chosen))
    }

    /// Encode `seq`, growing per-context dictionaries when `learn`
    /// is set.
    ///
    /// A context whose dictionary is full emits the empty token for
    /// a symbol it cannot match, handing control to the
    /// empty-context coder; if even that coder cannot make progress
    /// the dictionary is genuinely exhausted.
    pub fn encode_online(&mut self, seq: &[Token], learn: bool) -> Result<TokenSeq> {
        let mut encoded = TokenSeq::new();
        let mut context = EMPTY_TOKEN;
        let mut rem = seq;

        while !rem.is_empty() {
            let (prefix, id) = self.encode_one(rem, context, learn)?;
            if prefix.is_empty() && context == EMPTY_TOKEN {
                return Err(if learn {
                    TokenizerError::DictionaryFull {
                        limit: self.vocab_size + 1,
                    }
                } else {
                    TokenizerError::LearningDisabled(
                        "sequence contains symbols outside the learned dictionaries".into(),
                    )
                });
            }
            encoded.push(id);
            context = id;
            rem = &rem[prefix.len()..];
        }

        Ok(encoded)
    }
}

impl Tokenizer for HierarchicalLzCoder {
    /// Reinitialize the coder family and train it with one
    /// learning-enabled pass over `tokens`.
    fn learn(&mut self, tokens: &[Token], input_vocab: Option<&VocabSet>) -> Result<()> {
        let vocab = input_vocab
            .cloned()
            .unwrap_or_else(|| vocab_of(tokens));

        *self = Self::new(self.vocab_size, Some(&vocab))?;
        self.encode_online(tokens, true)?;

        debug!(
            "learned {} contexts over {} input symbols",
            self.coders.len(),
            self.input_vocab.len()
        );

        Ok(())
    }

    fn encode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut encoded = TokenSeq::new();
        let mut context = EMPTY_TOKEN;
        let mut rem = tokens;

        while !rem.is_empty() {
            let coder = self
                .coders
                .get(&context)
                .ok_or(TokenizerError::UnknownContext(context))?;
            let (prefix, id) = coder.propose_next_token(rem, false);
            if prefix.is_empty() && context == EMPTY_TOKEN {
                return Err(TokenizerError::LearningDisabled(
                    "sequence contains symbols outside the learned dictionaries".into(),
                ));
            }
            encoded.push(id);
            context = id;
            rem = &rem[prefix.len()..];
        }

        Ok(encoded)
    }

    fn decode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut decoded = TokenSeq::new();
        let mut context = EMPTY_TOKEN;

        for &t in tokens {
            let coder = self
                .coders
                .get(&context)
                .ok_or(TokenizerError::UnknownContext(context))?;
            decoded.extend_from_slice(&coder.decode_one(t)?);
            context = t;
        }

        Ok(decoded)
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
    use seqtok_core::lift;

    #[test]
    fn test_rejects_oversized_input_vocab() {
        let vocab = vocab_of(&[1, 2, 3]);
        assert!(matches!(
            HierarchicalLzCoder::new(2, Some(&vocab)),
            Err(TokenizerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut coder = HierarchicalLzCoder::new(256, None).unwrap();
        let tokens = lift::from_str("hello world");

        let encoded = coder.encode_online(&tokens, true).unwrap();
        assert!(!encoded.is_empty());
        assert_eq!(coder.decode(&encoded).unwrap(), tokens);
    }

    #[test]
    fn test_learning_creates_contexts() {
        let vocab: VocabSet = (0..256).collect();
        let mut coder = HierarchicalLzCoder::new(256, Some(&vocab)).unwrap();
        let tokens = lift::from_str("hello world");

        // fresh contexts cannot be admitted without learning
        assert!(matches!(
            coder.encode(&tokens),
            Err(TokenizerError::UnknownContext(_))
        ));

        coder.encode_online(&tokens, true).unwrap();
        assert!(coder.coders().len() > 1);
    }

    #[test]
    fn test_vote_on_repeated_sequence() {
        let vocab = vocab_of(&[1, 2]);
        let mut coder = HierarchicalLzCoder::new(16, Some(&vocab)).unwrap();

        let tokens = vec![1, 2, 1, 2, 1, 2];
        let encoded = coder.encode_online(&tokens, true).unwrap();

        // Deterministic run: the root consumes [1,2] as id 2, the
        // context-0 coder adopts the root's id 2 for [1] by vote, and
        // the context-2 coder lands on the root's id 1 for [2].
        assert_eq!(encoded, vec![2, 0, 0, 2, 1]);
        assert_eq!(coder.decode(&encoded).unwrap(), tokens);

        // every assigned id stays inside the shared namespace
        for id in coder.output_vocab() {
            assert!((0..16).contains(id));
        }
    }

    #[test]
    fn test_update_vocab_reaches_root_coder() {
        let mut coder = HierarchicalLzCoder::new(256, None).unwrap();
        coder.update_vocab(&lift::from_str("hello")).unwrap();

        for b in b"hello" {
            assert!(coder.input_vocab().contains(&Token::from(*b)));
        }
    }

    #[test]
    fn test_encode_one_with_explicit_context() {
        let mut coder = HierarchicalLzCoder::new(256, None).unwrap();
        let tokens = lift::from_str("hello");

        let (prefix, id) = coder.encode_one(&tokens, EMPTY_TOKEN, true).unwrap();
        assert!(!prefix.is_empty());

        // the emitted id becomes the next context
        let (prefix2, _) = coder
            .encode_one(&tokens[prefix.len()..], id, true)
            .unwrap();
        assert!(!prefix2.is_empty());

        // an unknown context without learning fails
        assert!(matches!(
            coder.encode_one(&tokens, 999, false),
            Err(TokenizerError::UnknownContext(999))
        ));
    }

    #[test]
    fn test_trait_learn_then_encode_roundtrip() {
        let tokens = lift::from_str("abcabcabc");
        let mut coder = HierarchicalLzCoder::new(64, None).unwrap();

        coder.learn(&tokens, None).unwrap();
        let encoded = coder.encode(&tokens).unwrap();
        assert_eq!(coder.decode(&encoded).unwrap(), tokens);
    }
}
