//! Byte-aligned integer encodings shared by the dictionary and the postings store.
//!
//! - [`varbyte`]: variable-length unsigned integers and the packed nibble pair used
//!   for front-coding lengths, read through a bounds-checked [`ByteCursor`].
//! - [`posting_list`]: delta + var-byte encoded `(doc_id, freq)` sequences.

pub mod posting_list;
pub mod varbyte;

pub use posting_list::{Posting, PostingListBuilder, PostingListIterator};
pub use varbyte::ByteCursor;
