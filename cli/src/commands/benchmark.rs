//! Benchmark command implementation.

use clap::Parser;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    /// Comma-separated stage spec, e.g. "defrag,bpe:100,context"
    #[arg(short, long)]
    pub stages: String,

    /// Text to benchmark on ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Number of encode iterations to run
    #[arg(long, default_value_t = 100)]
    pub iterations: usize,
}

use super::{build_pipeline, read_input};
use anyhow::Result as AnyhowResult;
use seqtok_core::lift;
use seqtok_tokenizer::Tokenizer;
use std::time::Instant;

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    let text = read_input(&cmd.input)?;
    let tokens = lift::from_str(&text);

    println!("Benchmarking pipeline [{}]...", cmd.stages);
    println!("  Input length: {} symbols", tokens.len());
    println!("  Iterations: {}", cmd.iterations);
    println!();

    let mut pipeline = build_pipeline(&cmd.stages)?;

    let start = Instant::now();
    pipeline.learn(&tokens, None)?;
    let learn_time = start.elapsed();

    // Warmup
    let encoded = pipeline.encode(&tokens)?;

    let start = Instant::now();
    for _ in 0..cmd.iterations {
        let _ = pipeline.encode(&tokens)?;
    }
    let encode_elapsed = start.elapsed();

    let start = Instant::now();
    for _ in 0..cmd.iterations {
        let _ = pipeline.decode(&encoded)?;
    }
    let decode_elapsed = start.elapsed();

    let avg_encode_ms = encode_elapsed.as_secs_f64() * 1000.0 / cmd.iterations as f64;
    let avg_decode_ms = decode_elapsed.as_secs_f64() * 1000.0 / cmd.iterations as f64;

    println!("Results:");
    println!("  Learn time: {:.2?}", learn_time);
    println!("  Average encode time: {:.3}ms", avg_encode_ms);
    println!("  Average decode time: {:.3}ms", avg_decode_ms);
    println!(
        "  Compression: {} -> {} tokens ({:.2}x)",
        tokens.len(),
        encoded.len(),
        tokens.len() as f64 / encoded.len().max(1) as f64
    );

    Ok(())
}
