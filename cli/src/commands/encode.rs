//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Comma-separated stage spec, e.g. "defrag,bpe:100,context"
    #[arg(short, long)]
    pub stages: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Verify the round-trip after encoding
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use super::{build_pipeline, read_input};
use anyhow::{ensure, Result as AnyhowResult};
use seqtok_core::lift;
use seqtok_tokenizer::Tokenizer;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let text = read_input(&cmd.input)?;
    let tokens = lift::from_str(&text);

    // No model persistence: train on the input, then encode it.
    let mut pipeline = build_pipeline(&cmd.stages)?;
    pipeline.learn(&tokens, None)?;

    let encoded = pipeline.encode(&tokens)?;

    let ids_str: Vec<String> = encoded.iter().map(|id| id.to_string()).collect();
    let output = ids_str.join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", encoded.len(), path);
        }
        None => {
            println!("{}", output);
        }
    }

    if cmd.verify {
        let decoded = pipeline.decode(&encoded)?;
        ensure!(decoded == tokens, "round-trip mismatch");
        println!(
            "round-trip ok: {} symbols -> {} tokens ({:.2}x)",
            tokens.len(),
            encoded.len(),
            tokens.len() as f64 / encoded.len().max(1) as f64
        );
    }

    Ok(())
}
