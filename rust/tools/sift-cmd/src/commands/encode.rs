//! Encode command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use sift_index::IndexMetadata;

use crate::utils;

/// Run the encode command
pub fn run(postings: PathBuf) -> Result<()> {
    utils::validate_file_exists(&postings)?;
    log::info!(
        "encoding {} ({})",
        postings.display(),
        utils::file_size(&postings)
    );
    let metadata = IndexMetadata::build(&postings)
        .with_context(|| format!("Failed to read {}", postings.display()))?;
    let meta_path = metadata
        .write(&postings)
        .context("Failed to write the metadata file")?;
    log::info!(
        "wrote {} ({}): {} documents, {} tokens, {} terms",
        meta_path.display(),
        utils::file_size(&meta_path),
        metadata.doc_count(),
        metadata.total_tokens(),
        metadata.dictionary().len()
    );
    Ok(())
}
