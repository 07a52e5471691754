//! Dump-dict command implementation

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use sift_encodings::posting_list::ListHead;
use sift_index::SearchIndex;

use crate::utils;

/// Run the dump-dict command: one `<df>\t<token>` line per term, in dictionary order
pub fn run(postings: PathBuf) -> Result<()> {
    utils::validate_file_exists(&postings)?;
    let index = SearchIndex::open(&postings)
        .with_context(|| format!("Failed to open index {}", postings.display()))?;
    let mut out = utils::create_output(None)?;
    for entry in index.metadata().dictionary().iter() {
        let (token, offset) = entry?;
        let token = String::from_utf8_lossy(&token);
        let list = index.read_record(offset, &token)?;
        let df = ListHead::parse(&list)?.len;
        writeln!(out, "{df}\t{token}")?;
    }
    out.flush()?;
    Ok(())
}
