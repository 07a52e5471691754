use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sift_search::options::{DEFAULT_K, DEFAULT_MATH_ALPHA};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "sift-cmd")]
#[command(about = "Build and query sift BM25 search indexes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a postings file from TREC corpus files
    Invert {
        /// Mark the index as math content (queried in math mode)
        #[arg(long)]
        math: bool,

        /// Tokenizer: whitespace or unicode-word
        #[arg(long, default_value = "whitespace")]
        tokenizer: String,

        /// Keyword list; other terms not starting with `#` are not indexed
        #[arg(long)]
        keywords: Option<PathBuf>,

        /// Output postings file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Corpus files; standard input when none is given
        corpus: Vec<PathBuf>,
    },

    /// Merge postings files, in the given order, into one
    Merge {
        /// Output postings file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Postings files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Write the metadata file (<postings>.meta) of a postings file
    Encode {
        /// Postings file
        postings: PathBuf,
    },

    /// Run queries read from stdin, one per line, until an empty line
    Search {
        /// Number of results per query
        #[arg(short, default_value_t = DEFAULT_K)]
        k: usize,

        /// Math mode: weigh `#` tokens by alpha and the other tokens by 1 - alpha
        #[arg(long)]
        math: bool,

        /// Math/text balance used in math mode
        #[arg(long, default_value_t = DEFAULT_MATH_ALPHA)]
        alpha: f32,

        /// Evaluation strategy: wand or exhaustive
        #[arg(long, default_value = "wand")]
        strategy: String,

        /// Tokenizer: whitespace or unicode-word
        #[arg(long, default_value = "whitespace")]
        tokenizer: String,

        /// Postings file; its metadata file must exist
        postings: PathBuf,
    },

    /// Print the document frequency and token of every indexed term
    DumpDict {
        /// Postings file; its metadata file must exist
        postings: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Invert {
            math,
            tokenizer,
            keywords,
            output,
            corpus,
        } => commands::invert::run(math, tokenizer, keywords, output, corpus),
        Commands::Merge { output, inputs } => commands::merge::run(output, inputs),
        Commands::Encode { postings } => commands::encode::run(postings),
        Commands::Search {
            k,
            math,
            alpha,
            strategy,
            tokenizer,
            postings,
        } => commands::search::run(
            commands::search::SearchArgs {
                k,
                alpha: math.then_some(alpha),
                strategy,
                tokenizer,
            },
            postings,
        ),
        Commands::DumpDict { postings } => commands::dump_dict::run(postings),
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `info`); stdout carries results.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install the logger: {e}"))
}
