//! Merge command implementation

use std::{
    fs::File,
    io::{BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use sift_index::{postings_file::PostingsFileReader, write::merge_postings_files};

use crate::utils;

/// Run the merge command
pub fn run(output: Option<PathBuf>, inputs: Vec<PathBuf>) -> Result<()> {
    let mut readers = Vec::with_capacity(inputs.len());
    for path in &inputs {
        utils::validate_file_exists(path)?;
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let reader = PostingsFileReader::open(BufReader::new(file), path.display().to_string())
            .with_context(|| format!("Failed to read {}", path.display()))?;
        log::info!(
            "{}: {} index, {} documents",
            path.display(),
            reader.kind().name(),
            reader.doc_count()
        );
        readers.push(reader);
    }

    let sink = utils::create_output(output.as_deref())?;
    merge_postings_files(readers, sink)
        .context("Failed to merge postings files")?
        .flush()?;
    if let Some(output) = &output {
        log::info!("wrote {} ({})", output.display(), utils::file_size(output));
    }
    Ok(())
}
