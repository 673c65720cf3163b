//! Contextual substring encoder.
//!
//! For every ordered pair of vocabulary symbols `(v, t)` the learner
//! finds the most frequent substring that starts right after an
//! occurrence of `v` and ends at an occurrence of `t`, with no `v`
//! in between. Encoding walks the input greedily, always taking the
//! longest learned substring available under the current context;
//! the emitted token is the substring's end symbol, which becomes
//! the next context.

use crate::tokenizer::Tokenizer;
use ahash::AHashMap;
use log::debug;
use seqtok_core::{is_prefix, vocab_of, Pair, Result, Token, TokenSeq, TokenizerError, VocabSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One context's dictionary: end token -> substring.
type ContextRow = BTreeMap<Token, TokenSeq>;

/// Tokenizer keyed on the previously emitted symbol.
///
/// The reserved id `0` plays two roles: `context_map[v][0]` is the
/// empty substring (end of sequence under context `v`), and row `0`
/// is the empty context, where every vocabulary symbol decodes to
/// itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextualEncoder {
    context_map: BTreeMap<Token, ContextRow>,
    input_vocab: VocabSet,
    output_vocab: VocabSet,
}

/// Count, for every `(prev, next)` context pair, each substring that
/// runs from just after an occurrence of `prev` up to and including
/// an occurrence of `next`.
fn context_stats(tokens: &[Token], vocab: &VocabSet) -> AHashMap<Pair, AHashMap<TokenSeq, u64>> {
    let mut stats: AHashMap<Pair, AHashMap<TokenSeq, u64>> = AHashMap::new();
    let mut last_seen: AHashMap<Token, usize> = AHashMap::new();

    for (idx, &t) in tokens.iter().enumerate() {
        for &v in vocab {
            if let Some(&start) = last_seen.get(&v) {
                let sub = tokens[start + 1..=idx].to_vec();
                *stats
                    .entry((v, t))
                    .or_default()
                    .entry(sub)
                    .or_insert(0) += 1;
            }
        }
        last_seen.insert(t, idx);
    }

    stats
}

/// Most frequent substring; equal counts resolve to the shorter
/// substring, then the lexicographically smaller one.
fn most_frequent(subs: &AHashMap<TokenSeq, u64>) -> Option<TokenSeq> {
    let mut best: Option<(&TokenSeq, u64)> = None;

    for (sub, &count) in subs {
        let better = match best {
            None => true,
            Some((cur, cur_count)) => {
                count > cur_count
                    || (count == cur_count
                        && (sub.len() < cur.len() || (sub.len() == cur.len() && sub < cur)))
            }
        };
        if better {
            best = Some((sub, count));
        }
    }

    best.map(|(sub, _)| sub.clone())
}

impl ContextualEncoder {
    /// Create an untrained contextual encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The learned substring under context `ctx` for end token `t`.
    pub fn context_value(&self, ctx: Token, t: Token) -> Option<&TokenSeq> {
        self.context_map.get(&ctx)?.get(&t)
    }
}

impl Tokenizer for ContextualEncoder {
    fn learn(&mut self, tokens: &[Token], input_vocab: Option<&VocabSet>) -> Result<()> {
        let vocab = input_vocab
            .cloned()
            .unwrap_or_else(|| vocab_of(tokens));

        self.context_map.clear();

        let mut stats = context_stats(tokens, &vocab);

        // Under any context, token 0 stands for the end of the
        // sequence and decodes to nothing.
        for &v in &vocab {
            let mut row = ContextRow::new();
            row.insert(0, TokenSeq::new());
            self.context_map.insert(v, row);
        }

        for &v in &vocab {
            for &t in &vocab {
                if t == 0 {
                    continue;
                }
                if let Some(subs) = stats.remove(&(v, t)) {
                    if let Some(sub) = most_frequent(&subs) {
                        if let Some(row) = self.context_map.get_mut(&v) {
                            row.insert(t, sub);
                        }
                    }
                }
            }
        }

        // In the empty context every symbol decodes to itself.
        let mut zero_row = ContextRow::new();
        for &v in &vocab {
            zero_row.insert(v, vec![v]);
        }
        self.context_map.insert(0, zero_row);

        self.output_vocab = vocab.iter().copied().chain(std::iter::once(0)).collect();
        self.input_vocab = vocab;

        debug!(
            "learned {} context rows over {} input symbols",
            self.context_map.len(),
            self.input_vocab.len()
        );

        Ok(())
    }

    fn encode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut encoded = TokenSeq::new();
        let mut context: Token = 0;
        let mut idx = 0;

        while idx < tokens.len() {
            let row = self
                .context_map
                .get(&context)
                .ok_or(TokenizerError::UnknownContext(context))?;

            // Longest matching substring; equal lengths keep the
            // smaller end token (rows iterate in ascending order).
            let mut best: Option<(Token, usize)> = None;
            for (&t, value) in row {
                if is_prefix(&tokens[idx..], value) {
                    let better = match best {
                        None => true,
                        Some((_, len)) => value.len() > len,
                    };
                    if better {
                        best = Some((t, value.len()));
                    }
                }
            }

            match best {
                Some((t, len)) => {
                    encoded.push(t);
                    context = t;
                    idx += len;
                }
                None => {
                    // Only the empty-context row lacks a zero-length
                    // entry, so a miss there means the symbol was
                    // never learned.
                    return Err(TokenizerError::UnknownToken(tokens[idx]));
                }
            }
        }

        Ok(encoded)
    }

    fn decode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut decoded = TokenSeq::new();
        let mut context: Token = 0;

        for &t in tokens {
            let row = self
                .context_map
                .get(&context)
                .ok_or(TokenizerError::UnknownContext(context))?;
            let value = row.get(&t).ok_or(TokenizerError::UnknownToken(t))?;
            decoded.extend_from_slice(value);
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

    #[test]
    fn test_context_stats_between_occurrences() {
        let vocab = vocab_of(&[1, 2, 3]);
        let stats = context_stats(&[1, 2, 1, 3, 1, 2, 1, 3], &vocab);

        // between each 1 and the next 3: always the substring [3]
        let subs = &stats[&(1, 3)];
        assert_eq!(subs[&vec![3]], 2);
        assert_eq!(subs.len(), 1);

        // between each 1 and the next 2: always [2]
        assert_eq!(stats[&(1, 2)][&vec![2]], 2);
    }

    #[test]
    fn test_learned_map_on_1213_pattern() {
        let tokens = vec![1, 2, 1, 3, 1, 2, 1, 3];
        let mut encoder = ContextualEncoder::new();
        encoder.learn(&tokens, None).unwrap();

        assert_eq!(encoder.context_value(1, 3), Some(&vec![3]));
        assert_eq!(encoder.context_value(1, 2), Some(&vec![2]));
        assert_eq!(encoder.context_value(1, 1), Some(&vec![2, 1]));

        // empty-context singletons and end-of-sequence entries
        for v in [1, 2, 3] {
            assert_eq!(encoder.context_value(0, v), Some(&vec![v]));
            assert_eq!(encoder.context_value(v, 0), Some(&TokenSeq::new()));
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let tokens = vec![1, 2, 1, 3, 1, 2, 1, 3];
        let mut encoder = ContextualEncoder::new();
        encoder.learn(&tokens, None).unwrap();

        let encoded = encoder.encode(&tokens).unwrap();
        assert_eq!(encoded, vec![1, 1, 3, 3]);
        assert_eq!(encoder.decode(&encoded).unwrap(), tokens);
    }

    #[test]
    fn test_encode_prefers_longest_candidate() {
        // under context 1, [2, 1] (ending in 1) beats the shorter [2]
        let tokens = vec![1, 2, 1, 2, 1];
        let mut encoder = ContextualEncoder::new();
        encoder.learn(&tokens, None).unwrap();

        let encoded = encoder.encode(&tokens).unwrap();
        assert_eq!(encoder.decode(&encoded).unwrap(), tokens);
        assert!(encoded.len() < tokens.len());
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let mut encoder = ContextualEncoder::new();
        encoder.learn(&[1, 2, 1, 2], None).unwrap();

        assert!(matches!(
            encoder.encode(&[7]),
            Err(TokenizerError::UnknownToken(7))
        ));
    }

    #[test]
    fn test_decode_unknown_token_fails() {
        let mut encoder = ContextualEncoder::new();
        encoder.learn(&[1, 2, 1, 2], None).unwrap();

        assert!(matches!(
            encoder.decode(&[9]),
            Err(TokenizerError::UnknownToken(9))
        ));
    }

    #[test]
    fn test_vocab_accessors() {
        let mut encoder = ContextualEncoder::new();
        encoder.learn(&[4, 5, 4, 5], None).unwrap();

        let inputs: Vec<Token> = encoder.input_vocab().iter().copied().collect();
        assert_eq!(inputs, vec![4, 5]);
        assert!(encoder.output_vocab().contains(&0));
        assert!(encoder.output_vocab().contains(&4));
    }
}
