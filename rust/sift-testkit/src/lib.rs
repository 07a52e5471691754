//! Test utilities and helpers for the sift workspace.
//!
//! This crate provides deterministic generators for synthetic test data:
//! - sorted key sets with realistic shared prefixes for dictionary tests
//! - posting lists and document lengths for the query engine tests
//! - small TREC-style corpora written to temporary files for end-to-end tests
//!
//! All generators take an explicit seed so that failures are reproducible.

pub mod corpus;
pub mod data_gen;
