//! Sequential composition of tokenizer stages.
//!
//! `encode` folds the stages left-to-right, `decode` right-to-left,
//! and `learn` trains each stage on the encoded output of the stage
//! before it, threading the output vocabulary along.

use crate::tokenizer::Tokenizer;
use rayon::prelude::*;
use seqtok_core::{Result, Token, TokenSeq, VocabSet};

/// An ordered list of tokenizer stages.
///
/// The empty pipeline is the identity tokenizer.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Tokenizer>>,
    empty_vocab: VocabSet,
}

impl Pipeline {
    /// Create a pipeline from `stages`.
    pub fn new(stages: Vec<Box<dyn Tokenizer>>) -> Self {
        Self {
            stages,
            empty_vocab: VocabSet::new(),
        }
    }

    /// Append a stage.
    pub fn push(&mut self, stage: Box<dyn Tokenizer>) {
        self.stages.push(stage);
    }

    /// The composed stages, in encode order.
    pub fn stages(&self) -> &[Box<dyn Tokenizer>] {
        &self.stages
    }

    /// Encode independent sequences in parallel.
    pub fn encode_batch(&self, inputs: &[TokenSeq]) -> Result<Vec<TokenSeq>> {
        inputs.par_iter().map(|seq| self.encode(seq)).collect()
    }
}

impl Tokenizer for Pipeline {
    fn learn(&mut self, tokens: &[Token], input_vocab: Option<&VocabSet>) -> Result<()> {
        let mut working = tokens.to_vec();
        let mut vocab = input_vocab.cloned();

        for stage in &mut self.stages {
            stage.learn(&working, vocab.as_ref())?;
            working = stage.encode(&working)?;
            vocab = Some(stage.output_vocab().clone());
        }

        Ok(())
    }

    fn encode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut working = tokens.to_vec();
        for stage in &self.stages {
            working = stage.encode(&working)?;
        }
        Ok(working)
    }

    fn decode(&self, tokens: &[Token]) -> Result<TokenSeq> {
        let mut working = tokens.to_vec();
        for stage in self.stages.iter().rev() {
            working = stage.decode(&working)?;
        }
        Ok(working)
    }

    fn input_vocab(&self) -> &VocabSet {
        self.stages
            .first()
            .map(|stage| stage.input_vocab())
            .unwrap_or(&self.empty_vocab)
    }

    fn output_vocab(&self) -> &VocabSet {
        self.stages
            .last()
            .map(|stage| stage.output_vocab())
            .unwrap_or(&self.empty_vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpe::Bpe;
    use crate::contextual::ContextualEncoder;
    use crate::defrag::DefragEncoder;
    use crate::lz::LzCoder;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use seqtok_core::lift;

    #[test]
    fn test_empty_pipeline_is_identity() {
        let mut pipeline = Pipeline::default();
        pipeline.learn(&[1, 2, 3], None).unwrap();

        assert_eq!(pipeline.encode(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
        assert_eq!(pipeline.decode(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
        assert!(pipeline.input_vocab().is_empty());
    }

    #[test]
    fn test_defrag_bpe_roundtrip() {
        let tokens = lift::from_str("aaabdaaabac");
        let mut pipeline = Pipeline::new(vec![
            Box::new(DefragEncoder::new()),
            Box::new(Bpe::with_max_output_vocab(10)),
        ]);

        pipeline.learn(&tokens, None).unwrap();
        let encoded = pipeline.encode(&tokens).unwrap();
        assert_eq!(pipeline.decode(&encoded).unwrap(), tokens);
        assert!(encoded.len() < tokens.len());
    }

    #[test]
    fn test_pipeline_law_matches_manual_composition() {
        let tokens = lift::from_str("the quick brown fox the quick");

        let mut defrag = DefragEncoder::new();
        defrag.learn(&tokens, None).unwrap();
        let defragged = defrag.encode(&tokens).unwrap();

        let mut bpe = Bpe::with_max_output_vocab(40);
        bpe.learn(&defragged, Some(defrag.output_vocab())).unwrap();

        let mut pipeline = Pipeline::new(vec![
            Box::new(DefragEncoder::new()),
            Box::new(Bpe::with_max_output_vocab(40)),
        ]);
        pipeline.learn(&tokens, None).unwrap();

        let expected = bpe.encode(&defragged).unwrap();
        let composed = pipeline.encode(&tokens).unwrap();
        assert_eq!(composed, expected);

        let decoded = defrag.decode(&bpe.decode(&composed).unwrap()).unwrap();
        assert_eq!(pipeline.decode(&composed).unwrap(), decoded);
    }

    #[test]
    fn test_defrag_bpe_contextual_roundtrip() {
        let tokens = lift::from_str("the quick brown fox jumps over the lazy dog");
        let mut pipeline = Pipeline::new(vec![
            Box::new(DefragEncoder::new()),
            Box::new(Bpe::with_max_output_vocab(50)),
            Box::new(ContextualEncoder::new()),
        ]);

        pipeline.learn(&tokens, None).unwrap();
        let encoded = pipeline.encode(&tokens).unwrap();
        assert_eq!(pipeline.decode(&encoded).unwrap(), tokens);
    }

    #[test]
    fn test_bpe_lz_pipeline_on_random_input() {
        let mut rng = StdRng::seed_from_u64(42);
        let tokens: TokenSeq = (0..1000).map(|_| rng.gen_range(1..=4)).collect();

        let mut pipeline = Pipeline::new(vec![
            Box::new(Bpe::with_max_output_vocab(8)),
            Box::new(LzCoder::new(Some(32), None).unwrap()),
        ]);

        pipeline.learn(&tokens, None).unwrap();
        let encoded = pipeline.encode(&tokens).unwrap();
        assert_eq!(pipeline.decode(&encoded).unwrap(), tokens);

        // the second stage trained on the first stage's vocabulary
        for t in &encoded {
            assert!(pipeline.output_vocab().contains(t));
        }
    }

    #[test]
    fn test_vocab_accessors_span_the_pipeline() {
        let tokens = lift::from_str("abcabc");
        let mut pipeline = Pipeline::new(vec![
            Box::new(DefragEncoder::new()),
            Box::new(Bpe::with_max_output_vocab(10)),
        ]);
        pipeline.learn(&tokens, None).unwrap();

        // input vocab is stage 0's (raw bytes), output is the last
        // stage's contiguous id range
        assert!(pipeline.input_vocab().contains(&97));
        assert!(pipeline.output_vocab().contains(&1));
    }

    #[test]
    fn test_encode_batch() {
        let tokens = lift::from_str("hello world hello world");
        let mut pipeline = Pipeline::new(vec![
            Box::new(DefragEncoder::new()),
            Box::new(Bpe::with_max_output_vocab(30)),
        ]);
        pipeline.learn(&tokens, None).unwrap();

        let inputs = vec![
            lift::from_str("hello world"),
            lift::from_str("world hello"),
            tokens.clone(),
        ];
        let batch = pipeline.encode_batch(&inputs).unwrap();

        assert_eq!(batch.len(), 3);
        for (input, encoded) in inputs.iter().zip(&batch) {
            assert_eq!(pipeline.decode(encoded).unwrap(), *input);
        }
    }
}
