//! Invert command implementation

use std::{
    fs::File,
    io::{BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use sift_index::{
    ContentKind,
    tokenizers::create_tokenizer,
    trec::TrecReader,
    write::{IndexBuilder, read_keywords},
};

use crate::utils;

/// Run the invert command
pub fn run(
    math: bool,
    tokenizer: String,
    keywords: Option<PathBuf>,
    output: Option<PathBuf>,
    corpus: Vec<PathBuf>,
) -> Result<()> {
    let tokenizer = create_tokenizer(&tokenizer)?;
    let kind = if math {
        ContentKind::Math
    } else {
        ContentKind::Text
    };
    let mut builder = IndexBuilder::new(kind, tokenizer);
    if let Some(path) = &keywords {
        utils::validate_file_exists(path)?;
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let keywords = read_keywords(BufReader::new(file))
            .with_context(|| format!("Failed to read keywords from {}", path.display()))?;
        log::info!("indexing {} keywords and all math tokens", keywords.len());
        builder = builder.with_keywords(keywords);
    }

    if corpus.is_empty() {
        let read = builder
            .add_trec(TrecReader::new(std::io::stdin().lock(), "<stdin>"))
            .context("Failed to index standard input")?;
        log::info!("read {read} documents from standard input");
    }
    for path in &corpus {
        utils::validate_file_exists(path)?;
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let read = builder
            .add_trec(TrecReader::new(file, path.display().to_string()))
            .with_context(|| format!("Failed to index {}", path.display()))?;
        log::info!(
            "read {read} documents from {} ({})",
            path.display(),
            utils::file_size(path)
        );
    }

    let sink = utils::create_output(output.as_deref())?;
    builder
        .write(sink)
        .context("Failed to write the postings file")?
        .flush()?;
    if let Some(output) = &output {
        log::info!("wrote {} ({})", output.display(), utils::file_size(output));
    }
    Ok(())
}
