//! Trie-backed LZ dictionary coder.
//!
//! Encoding repeatedly takes the longest dictionary prefix of the
//! remaining input. With learning enabled, each step also extends
//! the dictionary by one symbol, assigning the smallest unused
//! output id, so the mapping between ids and sequences stays
//! deterministic and bijective.

use crate::tokenizer::Tokenizer;
use log::debug;
use seqtok_core::{
    smallest, vocab_of, Result, Token, TokenSeq, TokenTrie, TokenizerError, VocabSet, EMPTY_TOKEN,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// LZ dictionary coder.
///
/// `vocab_size` bounds the output id namespace `0..vocab_size`; the
/// dictionary itself holds one extra entry for the empty sequence,
/// keyed by [`EMPTY_TOKEN`]. An unbounded coder draws fresh ids from
/// a monotone counter instead of an unused-id pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LzCoder {
    vocab_size: Option<usize>,
    input_vocab: VocabSet,
    /// Assigned output ids
    output_vocab: VocabSet,
    /// Output id -> the input sequence it stands for
    encoded_vocab: BTreeMap<Token, TokenSeq>,
    /// Longest-prefix index over the dictionary keys
    trie: TokenTrie,
    /// Ids not yet assigned (bounded coders only)
    unused_tokens: VocabSet,
    /// Next fresh id for unbounded coders
    next_fresh: Token,
}

impl LzCoder {
    /// Create a coder, registering each `input_vocab` symbol as a
    /// single-symbol dictionary entry.
    ///
    /// Fails with `InvalidConfig` when the input vocabulary does not
    /// fit in the output id namespace.
    pub fn new(vocab_size: Option<usize>, input_vocab: Option<&VocabSet>) -> Result<Self> {
        let input_vocab = input_vocab.cloned().unwrap_or_default();

        if let Some(bound) = vocab_size {
            if input_vocab.len() > bound {
                return Err(TokenizerError::InvalidConfig(format!(
                    "input vocabulary of {} symbols exceeds output vocab size {}",
                    input_vocab.len(),
                    bound
                )));
            }
        }

        let unused_tokens = match vocab_size {
            Some(bound) => (0..bound as Token).collect(),
            None => VocabSet::new(),
        };

        let mut coder = Self {
            vocab_size,
            input_vocab: input_vocab.clone(),
            output_vocab: VocabSet::new(),
            encoded_vocab: BTreeMap::new(),
            trie: TokenTrie::new(),
            unused_tokens,
            next_fresh: 0,
        };

        // The empty sequence anchors longest-prefix lookups.
        coder.encoded_vocab.insert(EMPTY_TOKEN, TokenSeq::new());
        coder.trie.insert(&[], EMPTY_TOKEN);

        for &c in &input_vocab {
            let id = coder.smallest_unused()?;
            coder.add_new_token(&[c], id);
        }

        Ok(coder)
    }

    /// Dictionary entry limit, counting the empty-sequence entry.
    fn dict_limit(&self) -> Option<usize> {
        self.vocab_size.map(|bound| bound + 1)
    }

    fn smallest_unused(&self) -> Result<Token> {
        match self.vocab_size {
            Some(_) => smallest(&self.unused_tokens),
            None => Ok(self.next_fresh),
        }
    }

    pub(crate) fn add_new_token(&mut self, key: &[Token], id: Token) {
        self.encoded_vocab.insert(id, key.to_vec());
        self.trie.insert(key, id);
        self.output_vocab.insert(id);
        self.unused_tokens.remove(&id);
        if id >= self.next_fresh {
            self.next_fresh = id + 1;
        }
    }

    /// Register every unseen symbol of `seq` as a single-symbol
    /// dictionary entry under the smallest unused id.
    ///
    /// Fails with `VocabFull` once no unused id remains.
    pub fn update_vocab(&mut self, seq: &[Token]) -> Result<()> {
        for &c in seq {
            if !self.input_vocab.contains(&c) {
                let id = self
                    .smallest_unused()
                    .map_err(|_| TokenizerError::VocabFull { symbol: c })?;
                self.add_new_token(&[c], id);
                self.input_vocab.insert(c);
            }
        }
        Ok(())
    }

    /// Longest dictionary prefix of `seq`, plus the id the next
    /// commit would use.
    ///
    /// With `learn` set, and while the dictionary has room, the
    /// returned prefix is extended by one symbol and paired with the
    /// smallest unused id. The proposal is not committed and this
    /// method has no side effects.
    pub fn propose_next_token(&self, seq: &[Token], learn: bool) -> (TokenSeq, Token) {
        let (mut prefix, mut id) = self.trie.longest_prefix(seq);

        if learn && prefix.len() < seq.len() {
            let has_room = self
                .dict_limit()
                .map_or(true, |limit| self.trie.len() < limit);
            if has_room {
                prefix.push(seq[prefix.len()]);
                if let Ok(fresh) = self.smallest_unused() {
                    id = fresh;
                }
            }
        }

        (prefix, id)
    }

    /// Encode the next token of `seq`, committing a new dictionary
    /// entry when `learn` is set and the proposal is fresh.
    pub fn encode_one(&mut self, seq: &[Token], learn: bool) -> Result<(TokenSeq, Token)> {
        let (prefix, id) = self.propose_next_token(seq, learn);

        if self.encoded_vocab.contains_key(&id) {
            return Ok((prefix, id));
        }
        if !learn {
            return Err(TokenizerError::LearningDisabled(
                "a new dictionary entry is needed but learning is disabled".into(),
            ));
        }
        if let Some(limit) = self.dict_limit() {
            if self.trie.len() >= limit {
                return Err(TokenizerError::DictionaryFull { limit });
            }
        }

        self.add_new_token(&prefix, id);
        Ok((prefix, id))
    }

    /// Encode `seq`, growing the dictionary online when `learn` is
    /// set. Growth is not transactional: entries committed before a
    /// failure stay committed.
    pub fn encode_online(&mut self, seq: &[Token], learn: bool) -> Result<TokenSeq> {
        let mut encoded = TokenSeq::new();
        let mut rem = seq;

        while !rem.is_empty() {
            let (prefix, id) = self.encode_one(rem, learn)?;
            if prefix.is_empty() {
                return Err(if learn {
                    TokenizerError::DictionaryFull {
                        limit: self.dict_limit().unwrap_or(0),
                    }
                } else {
                    TokenizerError::LearningDisabled(
                        "sequence contains symbols outside the learned dictionary".into(),
                    )
                });
            }
            encoded.push(id);
            rem = &rem[prefix.len()..];
        }

        Ok(encoded)
    }

    /// Expansion of a single id.
    pub fn decode_one(&self, id: Token) -> Result<TokenSeq> {
        self.encoded_vocab
            .get(&id)
            .cloned()
            .ok_or(TokenizerError::UnknownToken(id))
    }

    /// The id -> sequence dictionary, empty-sequence entry included.
    pub fn encoded_vocab(&self) -> &BTreeMap<Token, TokenSeq> {
        &self.encoded_vocab
    }

    /// Output ids not yet assigned to any sequence.
    pub fn unused_tokens(&self) -> &VocabSet {
        &self.unused_tokens
    }

    /// Number of dictionary entries, empty-sequence entry included.
    pub fn dict_len(&self) -> usize {
        self.trie.len()
    }
}

impl Tokenizer for LzCoder {
    /// Reinitialize the coder and train its dictionary with one
    /// learning-enabled pass over `tokens`.
    fn learn(&mut self, tokens: &[Token], input_vocab: Option<&VocabSet>) -> Result<()> {
        let vocab = input_vocab
            .cloned()
            .unwrap_or_else(|| vocab_of(tokens));

        *self = Self::new(self.vocab_size, Some(&vocab))?;
        let encoded = self.encode_online(tokens, true)?;

        debug!(
            "learned {} dictionary entries; training sequence compressed {} -> {}",
            self.trie.len(),
            tokens.len(),
            encoded.len()
        );

        Ok(())
    }

    fn encode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut encoded = TokenSeq::new();
        let mut rem = tokens;

        while !rem.is_empty() {
            let (prefix, id) = self.propose_next_token(rem, false);
            if prefix.is_empty() {
                return Err(TokenizerError::LearningDisabled(
                    "sequence contains symbols outside the learned dictionary".into(),
                ));
            }
            encoded.push(id);
            rem = &rem[prefix.len()..];
        }

        Ok(encoded)
    }

    fn decode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut decoded = TokenSeq::new();
        for &t in tokens {
            decoded.extend_from_slice(&self.decode_one(t)?);
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
