//! Seqtok CLI - command-line interface for the sequence tokenizers.
//!
//! This is the main entry point for the `seqtok` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use commands::{BenchmarkCommand, EncodeCommand};

#[derive(Parser)]
#[command(name = "seqtok")]
#[command(about = "Composable, reversible sequence tokenizers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a tokenizer pipeline on the input and encode it
    Encode(EncodeCommand),
    /// Benchmark learning and encoding performance
    Benchmark(BenchmarkCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Benchmark(cmd) => commands::benchmark::run(cmd)?,
    }

    Ok(())
}
