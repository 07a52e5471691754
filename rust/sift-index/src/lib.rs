//! Building and opening sift search indexes.
//!
//! An index is a pair of files:
//!
//! - the *postings file*, a token-sorted sequence of term records preceded by the
//!   document table (see [`postings_file`]);
//! - the *metadata file* (`<postings>.meta`), holding the document name store and
//!   the term dictionary that points into the postings file (see [`meta`]).
//!
//! Postings files are produced by [`write::IndexBuilder`] from a tokenized corpus
//! (usually read with [`trec::TrecReader`]) and can be combined with
//! [`write::merge_postings_files`]. [`meta::IndexMetadata::build`] derives the
//! metadata file, after which [`SearchIndex`] serves posting list lookups.

pub mod index;
pub mod meta;
pub mod postings_file;
pub mod tokenizers;
pub mod trec;
pub mod write;

pub use index::SearchIndex;
pub use meta::{DocumentNameStore, IndexMetadata};
pub use postings_file::ContentKind;
