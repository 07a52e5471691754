//! WAND (weak AND) top-k evaluation of disjunctive BM25 queries.
//!
//! Every cursor contributes at most `bound()` to a document's score. Cursors are
//! kept ordered by their current document; walking them in that order and
//! summing bounds yields the *pivot*, the first cursor at which the accumulated
//! bound exceeds the heap threshold. No document before the pivot's document can
//! enter the top k, so the cursors in front of the pivot skip ahead to it. When
//! they already sit on the pivot document, the document is scored, stopping early
//! once the remaining bounds can no longer lift it above the threshold.
//!
//! The result is the same as scoring every document ([`exhaustive_top_k`]), with
//! equal scores: both sum term contributions in term order.
//!
//! [`exhaustive_top_k`]: crate::exhaustive::exhaustive_top_k

use sift_common::Result;

use crate::{
    bm25::Bm25Params,
    cursor::{DocumentLengths, TermCursor},
    topk::{ScoredDoc, TopKHeap},
};

/// Work done by one query evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Posting lists taking part in the query.
    pub cursors: usize,
    /// Documents scored to completion.
    pub scored: usize,
    /// Documents whose scoring stopped early.
    pub pruned: usize,
    /// Documents that entered the top-k heap.
    pub heap_insertions: usize,
    /// Pivot moves that made lagging cursors skip ahead.
    pub skips: usize,
}

/// The `k` best documents of a query, best first, and the work it took.
#[derive(Debug, Clone, Default)]
pub struct TopKResults {
    pub docs: Vec<ScoredDoc>,
    pub stats: QueryStats,
}

/// Scoring inputs shared by the evaluation strategies.
pub struct ScoringContext<'a, D: DocumentLengths + ?Sized> {
    pub lengths: &'a D,
    pub avg_doc_len: f32,
    pub params: Bm25Params,
}

pub fn wand_top_k<D: DocumentLengths + ?Sized>(
    mut cursors: Vec<TermCursor<'_>>,
    context: &ScoringContext<'_, D>,
    k: usize,
) -> Result<TopKResults> {
    let mut heap = TopKHeap::new(k)?;
    let mut stats = QueryStats {
        cursors: cursors.len(),
        ..Default::default()
    };
    cursors.retain(|cursor| !cursor.is_exhausted());
    let mut threshold = heap.threshold();

    while !cursors.is_empty() {
        cursors.sort_unstable_by_key(|cursor| (cursor.doc_id(), cursor.term()));

        let mut upper = 0.0f32;
        let Some(mut pivot) = cursors.iter().position(|cursor| {
            upper += cursor.bound();
            upper > threshold
        }) else {
            break;
        };
        let pivot_doc = cursors[pivot].doc_id();

        if cursors[0].doc_id() != pivot_doc {
            for cursor in &mut cursors[..pivot] {
                cursor.advance_to(pivot_doc)?;
            }
            cursors.retain(|cursor| !cursor.is_exhausted());
            stats.skips += 1;
            continue;
        }

        while pivot + 1 < cursors.len() && cursors[pivot + 1].doc_id() == pivot_doc {
            pivot += 1;
            upper += cursors[pivot].bound();
        }

        let doc_len = context.lengths.doc_len(pivot_doc)?;
        let mut score = 0.0f32;
        let mut complete = true;
        for (i, cursor) in cursors[..=pivot].iter().enumerate() {
            score += cursor.score(doc_len, context.avg_doc_len, &context.params);
            upper -= cursor.bound();
            // After the last term the heap decides.
            if i < pivot && score + upper <= threshold {
                complete = false;
                break;
            }
        }
        if complete {
            stats.scored += 1;
            if heap.offer(pivot_doc, score) {
                stats.heap_insertions += 1;
                threshold = heap.threshold();
            }
        } else {
            stats.pruned += 1;
        }

        for cursor in &mut cursors[..=pivot] {
            cursor.advance()?;
        }
        cursors.retain(|cursor| !cursor.is_exhausted());
    }

    Ok(TopKResults {
        docs: heap.into_sorted_vec(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use sift_encodings::{
        Posting, PostingListIterator,
        posting_list::encode,
    };

    use super::*;

    fn run(lists: &[Vec<u8>], weights: &[f32], lengths: &[u32], k: usize) -> TopKResults {
        let params = Bm25Params::default();
        let cursors = lists
            .iter()
            .zip(weights)
            .enumerate()
            .map(|(term, (list, &weight))| {
                TermCursor::new(PostingListIterator::new(list).unwrap(), weight, term, &params)
                    .unwrap()
            })
            .collect();
        let avg = lengths.iter().sum::<u32>() as f32 / lengths.len() as f32;
        let context = ScoringContext {
            lengths,
            avg_doc_len: avg,
            params,
        };
        wand_top_k(cursors, &context, k).unwrap()
    }

    #[test]
    fn test_single_term_ranks_by_frequency() {
        let list = encode(&[Posting::new(0, 1), Posting::new(1, 4), Posting::new(3, 2)]).unwrap();
        let results = run(&[list], &[1.0], &[10, 10, 10, 10], 2);
        let ids: Vec<_> = results.docs.iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(results.docs[0].score > results.docs[1].score);
        assert_eq!(results.stats.cursors, 1);
    }

    #[test]
    fn test_no_cursors() {
        let results = run(&[], &[], &[1], 3);
        assert!(results.docs.is_empty());
        assert_eq!(results.stats, QueryStats::default());
    }

    #[test]
    fn test_rare_term_wins() {
        // Document 7 holds both terms; the heavy term alone decides the rest.
        let common: Vec<_> = (0..20).map(|doc| Posting::new(doc, 1)).collect();
        let lists = vec![
            encode(&common).unwrap(),
            encode(&[Posting::new(7, 1), Posting::new(15, 1)]).unwrap(),
        ];
        let results = run(&lists, &[0.1, 2.0], &[5; 20], 1);
        assert_eq!(results.docs.len(), 1);
        assert_eq!(results.docs[0].doc_id, 7);
        // Once the threshold is set, most common-only documents are never scored.
        assert!(results.stats.scored < 20);
    }
}
