use sift_common::{Result, error::Error};
use sift_encodings::{Posting, PostingListIterator};
use sift_index::DocumentNameStore;

use crate::bm25::Bm25Params;

/// Token counts of the indexed documents.
pub trait DocumentLengths {
    fn doc_len(&self, doc_id: u32) -> Result<u32>;
}

impl DocumentLengths for [u32] {
    fn doc_len(&self, doc_id: u32) -> Result<u32> {
        self.get(doc_id as usize)
            .copied()
            .ok_or_else(|| Error::invalid_arg("doc_id", format!("no document {doc_id}")))
    }
}

impl DocumentLengths for Vec<u32> {
    fn doc_len(&self, doc_id: u32) -> Result<u32> {
        self.as_slice().doc_len(doc_id)
    }
}

impl DocumentLengths for DocumentNameStore {
    fn doc_len(&self, doc_id: u32) -> Result<u32> {
        self.token_count(doc_id)
    }
}

/// A query term's position in its posting list, with the term's BM25 weight.
///
/// A cursor is created positioned on the first posting and becomes exhausted
/// after its last one.
#[derive(Debug, Clone)]
pub struct TermCursor<'a> {
    postings: PostingListIterator<'a>,
    weight: f32,
    bound: f32,
    term: usize,
}

impl<'a> TermCursor<'a> {
    /// `weight` is the query term weight times idf; `term` orders cursors that sit
    /// on the same document.
    pub fn new(
        mut postings: PostingListIterator<'a>,
        weight: f32,
        term: usize,
        params: &Bm25Params,
    ) -> Result<TermCursor<'a>> {
        postings.advance()?;
        Ok(TermCursor {
            postings,
            weight,
            bound: params.upper_bound(weight),
            term,
        })
    }

    /// Number of documents in the list.
    pub fn doc_frequency(&self) -> usize {
        self.postings.len()
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Largest score contribution this term can make to any document.
    #[inline]
    pub fn bound(&self) -> f32 {
        self.bound
    }

    pub fn term(&self) -> usize {
        self.term
    }

    #[inline]
    pub fn current(&self) -> Option<Posting> {
        self.postings.current()
    }

    /// Current document id; `u32::MAX` once exhausted.
    #[inline]
    pub fn doc_id(&self) -> u32 {
        self.postings.doc_id().unwrap_or(u32::MAX)
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.postings.current().is_none()
    }

    pub fn advance(&mut self) -> Result<bool> {
        self.postings.advance()
    }

    pub fn advance_to(&mut self, target: u32) -> Result<bool> {
        self.postings.advance_to(target)
    }

    /// Weighted BM25 contribution of the current posting.
    #[inline]
    pub fn score(&self, doc_len: u32, avg_doc_len: f32, params: &Bm25Params) -> f32 {
        let freq = self.postings.current().map_or(0, |p| p.freq);
        params.term_score(freq, doc_len, avg_doc_len) * self.weight
    }
}
