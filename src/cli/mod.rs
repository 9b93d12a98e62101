//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// cfp - Order tests so that likely failures run first.
#[derive(Parser)]
#[command(name = "cfp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Order tests by conditional failure probability from a CSV history
    #[command(alias = "o")]
    Order(OrderArgs),

    /// Write a random test history as CSV
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct OrderArgs {
    /// CSV file: one row per suite execution, one column per test
    pub file: PathBuf,

    /// Treat the first row as test names
    #[arg(long)]
    pub headers: bool,

    /// Field delimiter
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Strip whitespace around outcome tokens
    #[arg(long)]
    pub trim: bool,

    /// Omit the execution records from the report
    #[arg(long)]
    pub no_history: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Number of suite executions
    #[arg(short = 'n', long)]
    pub executions: Option<usize>,

    /// Number of tests per execution
    #[arg(short, long)]
    pub tests: Option<usize>,

    /// Probability of each test failing (0.0-1.0)
    #[arg(short, long)]
    pub probability: Option<f64>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Print the commented default template instead
    #[arg(long)]
    pub default: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[value(alias = "md")]
    Markdown,
    Text,
}
