//! Byte-pair encoding over integer sequences.
//!
//! The learner iteratively merges the most frequent adjacent pair of
//! the working sequence into a fresh id. Input symbols are first
//! remapped onto the contiguous seed ids `1..=|V|` through synthetic
//! `(0, v)` "seeding" merges, so that the id produced by merge step
//! `i` is exactly `i` and output ids stay contiguous.

use crate::tokenizer::Tokenizer;
use ahash::AHashMap;
use log::{debug, trace};
use seqtok_core::{
    merge_pairs, pair_stats, vocab_of, Pair, PairPriorityQueue, Result, Token, TokenSeq,
    TokenizerError, VocabSet,
};
use serde::{Deserialize, Serialize};

/// BPE tokenizer.
///
/// Construction requires at least one of `max_output_vocab` or
/// `max_merges`. `learn` rebuilds the model from scratch; `encode`
/// replays the learned merges in order and `decode` expands ids back
/// to input symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bpe {
    /// Learned merges; the first `|input_vocab|` entries are `(0, v)`
    /// seeding merges that never fire at encode time
    merges: Vec<Pair>,
    /// Output id -> the input symbols it expands to
    token_values: AHashMap<Token, TokenSeq>,
    /// Input symbol -> seed id
    seed_ids: AHashMap<Token, Token>,
    input_vocab: VocabSet,
    output_vocab: VocabSet,
    max_output_vocab: Option<usize>,
    max_merges: Option<usize>,
}

impl Bpe {
    /// Create a BPE tokenizer bounded by output vocabulary size,
    /// merge count, or both.
    pub fn new(max_output_vocab: Option<usize>, max_merges: Option<usize>) -> Result<Self> {
        if max_output_vocab.is_none() && max_merges.is_none() {
            return Err(TokenizerError::InvalidConfig(
                "max_output_vocab or max_merges must be provided".into(),
            ));
        }

        Ok(Self {
            merges: Vec::new(),
            token_values: AHashMap::new(),
            seed_ids: AHashMap::new(),
            input_vocab: VocabSet::new(),
            output_vocab: VocabSet::new(),
            max_output_vocab,
            max_merges,
        })
    }

    /// Create a BPE tokenizer bounded by output vocabulary size.
    pub fn with_max_output_vocab(max_output_vocab: usize) -> Self {
        Self {
            merges: Vec::new(),
            token_values: AHashMap::new(),
            seed_ids: AHashMap::new(),
            input_vocab: VocabSet::new(),
            output_vocab: VocabSet::new(),
            max_output_vocab: Some(max_output_vocab),
            max_merges: None,
        }
    }

    /// Create a BPE tokenizer bounded by merge count.
    pub fn with_max_merges(max_merges: usize) -> Self {
        Self {
            merges: Vec::new(),
            token_values: AHashMap::new(),
            seed_ids: AHashMap::new(),
            input_vocab: VocabSet::new(),
            output_vocab: VocabSet::new(),
            max_output_vocab: None,
            max_merges: Some(max_merges),
        }
    }

    /// The learned merge list, seeding merges included.
    pub fn merges(&self) -> &[Pair] {
        &self.merges
    }

    /// Expansion of `id` into input symbols, if learned.
    pub fn token_value(&self, id: Token) -> Option<&TokenSeq> {
        self.token_values.get(&id)
    }

    /// Map `tokens` onto seed ids, failing on out-of-vocabulary symbols.
    fn to_seed_ids(&self, tokens: &[Token]) -> Result<TokenSeq> {
        tokens
            .iter()
            .map(|&t| {
                self.seed_ids
                    .get(&t)
                    .copied()
                    .ok_or(TokenizerError::UnknownToken(t))
            })
            .collect()
    }
}

impl Tokenizer for Bpe {
    fn learn(&mut self, tokens: &[Token], input_vocab: Option<&VocabSet>) -> Result<()> {
        let vocab = input_vocab
            .cloned()
            .unwrap_or_else(|| vocab_of(tokens));

        self.merges.clear();
        self.token_values.clear();
        self.seed_ids.clear();

        // Seed ids in ascending symbol order: seed id i maps to the
        // i-th smallest input symbol.
        for &v in &vocab {
            self.merges.push((0, v));
            let seed_id = self.merges.len() as Token;
            self.seed_ids.insert(v, seed_id);
            self.token_values.insert(seed_id, vec![v]);
        }

        let limit = match (self.max_output_vocab, self.max_merges) {
            (Some(limit), _) => limit,
            (None, Some(max_merges)) => max_merges + vocab.len(),
            (None, None) => {
                return Err(TokenizerError::InvalidConfig(
                    "max_output_vocab or max_merges must be provided".into(),
                ))
            }
        };

        let mut working = self.to_seed_ids(tokens)?;

        if working.len() >= 2 {
            while self.merges.len() < limit {
                let stats = pair_stats(&working);
                let mut queue = PairPriorityQueue::from_stats(&stats);
                let best = match queue.pop() {
                    Some(candidate) => candidate,
                    None => break,
                };
                if best.count <= 1 {
                    break;
                }

                let new_token = (self.merges.len() + 1) as Token;
                working = merge_pairs(&working, best.pair, new_token);

                trace!(
                    "merge {}: pair {:?} (count {}) -> id {}",
                    self.merges.len() + 1,
                    best.pair,
                    best.count,
                    new_token
                );

                let mut value = self
                    .token_values
                    .get(&best.pair.0)
                    .cloned()
                    .unwrap_or_default();
                if let Some(second) = self.token_values.get(&best.pair.1) {
                    value.extend_from_slice(second);
                }
                self.token_values.insert(new_token, value);
                self.merges.push(best.pair);
            }
        }

        self.input_vocab = vocab;
        self.output_vocab = (1..=self.merges.len() as Token).collect();

        debug!(
            "learned {} merges over {} input symbols",
            self.merges.len() - self.input_vocab.len(),
            self.input_vocab.len()
        );

        Ok(())
    }

    fn encode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        // An untrained model has nothing to apply.
        if self.merges.is_empty() {
            return Ok(tokens.to_vec());
        }

        let mut working = self.to_seed_ids(tokens)?;

        for (idx, &pair) in self.merges.iter().enumerate() {
            // Seeding merges never fire.
            if pair.0 == 0 {
                continue;
            }
            working = merge_pairs(&working, pair, (idx + 1) as Token);
        }

        Ok(working)
    }

    fn decode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut decoded = TokenSeq::new();

        for &t in tokens {
            match self.token_values.get(&t) {
                Some(value) => decoded.extend_from_slice(value),
                // Unknown ids pass through unchanged.
                None => decoded.push(t),
            }
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
