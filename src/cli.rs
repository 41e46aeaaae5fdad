//! CLI argument parsing for catstat

use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV frequency table for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "catstat")]
#[command(version)]
#[command(about = "Descriptive statistics over categorical observations", long_about = None)]
pub struct Cli {
    /// Enable debug tracing on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute mode, median, frequency variance and target probability
    Analyze(AnalyzeArgs),
    /// Query or extend an election results data file
    Results(ResultsArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON file mapping group names to arrays of category labels
    #[arg(short, long, value_name = "FILE", conflicts_with = "sample")]
    pub input: Option<PathBuf>,

    /// Analyze the built-in weekly colour survey
    #[arg(long)]
    pub sample: bool,

    /// TOML configuration (target and normalization rules)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Category whose probability is reported (overrides the config)
    #[arg(short, long, value_name = "LABEL")]
    pub target: Option<String>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Upsert the frequency table into this CSV file ('-' prints
    /// `category: frequency` lines to stdout instead)
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Skip label normalization
    #[arg(long = "no-normalize")]
    pub no_normalize: bool,
}

#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// Election results JSON data file
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,

    #[command(subcommand)]
    pub action: ResultsAction,
}

#[derive(Subcommand, Debug)]
pub enum ResultsAction {
    /// Show the announced scores of one polling unit
    PollingUnit {
        #[arg(long)]
        id: u32,
    },
    /// Show party totals summed over every polling unit of an LGA
    Lga {
        #[arg(long)]
        id: u32,
    },
    /// Record a new polling unit with its party scores
    Add {
        /// Polling unit name
        #[arg(long)]
        name: String,
        /// Ward the polling unit belongs to
        #[arg(long)]
        ward: u32,
        /// Party score as PARTY_ID=SCORE (repeatable)
        #[arg(long = "score", value_name = "PARTY_ID=SCORE", value_parser = parse_score)]
        scores: Vec<(u32, u64)>,
    },
}

/// Parse a `PARTY_ID=SCORE` pair
pub fn parse_score(s: &str) -> anyhow::Result<(u32, u64)> {
    let Some((party, score)) = s.split_once('=') else {
        bail!("Invalid score '{}'. Expected format: PARTY_ID=SCORE", s);
    };
    let party = party
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid party id in '{}'", s))?;
    let score = score
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid score in '{}' (must be a non-negative integer)", s))?;
    Ok((party, score))
}
