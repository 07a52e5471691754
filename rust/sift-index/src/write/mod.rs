//! Producing postings files.
//!
//! - [`IndexBuilder`] inverts a corpus held in memory into a single postings file,
//!   optionally restricted to a keyword list read by [`read_keywords`].
//! - [`merge_postings_files`] combines postings files built from disjoint parts of
//!   a corpus, so that large corpora can be inverted in independent shards.

mod inverter;
mod merger;

pub use inverter::{IndexBuilder, read_keywords};
pub use merger::merge_postings_files;
