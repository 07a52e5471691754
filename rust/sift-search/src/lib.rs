//! BM25 top-k search over sift indexes.
//!
//! [`Searcher`] turns query text into weighted posting list cursors and ranks
//! documents with [`wand::wand_top_k`], a dynamic pruning evaluator that returns
//! the same results as the exhaustive reference [`exhaustive::exhaustive_top_k`]
//! while scoring far fewer documents.

pub mod bm25;
pub mod cursor;
pub mod exhaustive;
pub mod options;
pub mod searcher;
pub mod topk;
pub mod wand;

pub use bm25::Bm25Params;
pub use cursor::{DocumentLengths, TermCursor};
pub use options::{SearchOptions, Strategy};
pub use searcher::{Query, SearchHit, SearchResults, Searcher};
pub use topk::{ScoredDoc, TopKHeap};
pub use wand::{QueryStats, ScoringContext, TopKResults};
