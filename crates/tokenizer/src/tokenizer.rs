//! The tokenizer capability trait.

use seqtok_core::{Result, Token, TokenSeq, VocabSet};

/// Capability set shared by every tokenizer stage.
///
/// `learn` replaces the model from scratch; `encode` and `decode`
/// are read-only. Tokenizers that support online dictionary growth
/// (the LZ family) expose it through inherent methods that carry an
/// explicit `learn` flag.
///
/// Implementations are `Send + Sync` so pipelines can encode batches
/// of independent sequences in parallel.
pub trait Tokenizer: Send + Sync {
    /// Train the model on `tokens`.
    ///
    /// When `input_vocab` is `None`, the vocabulary is the set of
    /// distinct symbols in `tokens`.
    fn learn(&mut self, tokens: &[Token], input_vocab: Option<&VocabSet>) -> Result<()>;

    /// Encode `tokens` into the output vocabulary.
    fn encode(&self, tokens: &[Token]) -> Result<TokenSeq>;

    /// Decode ids back into the input vocabulary.
    fn decode(&self, tokens: &[Token]) -> Result<TokenSeq>;

    /// Symbols this tokenizer accepts as input.
    fn input_vocab(&self) -> &VocabSet;

    /// Ids this tokenizer can emit.
    fn output_vocab(&self) -> &VocabSet;
}
