//! CLI commands for the seqtok tokenizers.

pub mod benchmark;
pub mod encode;

pub use benchmark::BenchmarkCommand;
pub use encode::EncodeCommand;

use anyhow::{bail, Context, Result};
use seqtok_tokenizer::{
    Bpe, ContextualEncoder, DefragEncoder, HierarchicalLzCoder, LzCoder, Pipeline,
};

/// Build a pipeline from a comma-separated stage spec.
///
/// Recognized stages: `defrag`, `bpe:<max_vocab>`, `context`,
/// `lz:<vocab_size>`, `hlz:<vocab_size>`.
pub fn build_pipeline(spec: &str) -> Result<Pipeline> {
    let mut pipeline = Pipeline::default();

    for stage in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, arg) = match stage.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (stage, None),
        };

        match name {
            "defrag" => pipeline.push(Box::new(DefragEncoder::new())),
            "context" => pipeline.push(Box::new(ContextualEncoder::new())),
            "bpe" => {
                let max_vocab = parse_arg(stage, arg)?;
                pipeline.push(Box::new(Bpe::with_max_output_vocab(max_vocab)));
            }
            "lz" => {
                let vocab_size = parse_arg(stage, arg)?;
                pipeline.push(Box::new(LzCoder::new(Some(vocab_size), None)?));
            }
            "hlz" => {
                let vocab_size = parse_arg(stage, arg)?;
                pipeline.push(Box::new(HierarchicalLzCoder::new(vocab_size, None)?));
            }
            _ => bail!("unknown stage '{stage}'"),
        }
    }

    Ok(pipeline)
}

fn parse_arg(stage: &str, arg: Option<&str>) -> Result<usize> {
    arg.with_context(|| format!("stage '{stage}' requires a numeric argument"))?
        .parse()
        .with_context(|| format!("invalid argument in stage '{stage}'"))
}

/// Read the input text, or stdin when the argument is "-".
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(input.to_string())
    }
}
