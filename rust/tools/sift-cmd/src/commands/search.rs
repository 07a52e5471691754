//! Search command implementation

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use sift_index::{SearchIndex, tokenizers::create_tokenizer};
use sift_search::{SearchOptions, Searcher, Strategy};

use crate::utils;

pub struct SearchArgs {
    pub k: usize,
    /// Math mode balance, `None` for plain text search.
    pub alpha: Option<f32>,
    pub strategy: String,
    pub tokenizer: String,
}

/// Run the search command
pub fn run(args: SearchArgs, postings: PathBuf) -> Result<()> {
    utils::validate_file_exists(&postings)?;
    let options = SearchOptions {
        k: args.k,
        math_alpha: args.alpha,
        strategy: Strategy::try_from(args.strategy.as_str())?,
        ..Default::default()
    };
    let tokenizer = create_tokenizer(&args.tokenizer)?;
    let index = SearchIndex::open(&postings)
        .with_context(|| format!("Failed to open index {}", postings.display()))?;
    let searcher = Searcher::new(&index, tokenizer, options)?;

    log::info!("enter queries:");
    let mut out = utils::create_output(None)?;
    let count = searcher.run_queries(std::io::stdin().lock(), &mut out)?;
    out.flush()?;
    log::info!("answered {count} queries");
    Ok(())
}
