use std::{cmp::Reverse, collections::BinaryHeap};

use ordered_float::OrderedFloat;
use sift_common::{Result, verify_arg};

/// A scored document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: u32,
    pub score: f32,
}

/// Bounded min-heap keeping the `k` best scored documents.
///
/// Until `k` documents have been accepted the threshold is negative infinity, so
/// every offer is accepted. Afterwards a document replaces the current minimum
/// only if its score is strictly greater. Among equal scores, documents offered
/// earlier are kept.
#[derive(Debug)]
pub struct TopKHeap {
    k: usize,
    heap: BinaryHeap<Reverse<(OrderedFloat<f32>, Reverse<u32>)>>,
}

impl TopKHeap {
    pub fn new(k: usize) -> Result<TopKHeap> {
        verify_arg!(k, k > 0);
        Ok(TopKHeap {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        })
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The score a document must exceed to enter the heap.
    #[inline]
    pub fn threshold(&self) -> f32 {
        if self.heap.len() < self.k {
            f32::NEG_INFINITY
        } else {
            self.heap
                .peek()
                .map_or(f32::NEG_INFINITY, |Reverse((score, _))| score.0)
        }
    }

    /// Offers a document; returns `true` if it entered the heap.
    pub fn offer(&mut self, doc_id: u32, score: f32) -> bool {
        if score <= self.threshold() {
            return false;
        }
        if self.heap.len() == self.k {
            self.heap.pop();
        }
        self.heap.push(Reverse((OrderedFloat(score), Reverse(doc_id))));
        true
    }

    /// The retained documents, best first; equal scores in ascending id order.
    pub fn into_sorted_vec(self) -> Vec<ScoredDoc> {
        // Ascending order of `Reverse` entries is descending by score.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse((score, Reverse(doc_id)))| ScoredDoc {
                doc_id,
                score: score.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(heap: TopKHeap) -> Vec<u32> {
        heap.into_sorted_vec().iter().map(|d| d.doc_id).collect()
    }

    #[test]
    fn test_keeps_best() {
        let mut heap = TopKHeap::new(3).unwrap();
        assert_eq!(heap.threshold(), f32::NEG_INFINITY);
        for (doc, score) in [(0, 1.0), (1, 5.0), (2, 3.0)] {
            assert!(heap.offer(doc, score));
        }
        assert_eq!(heap.threshold(), 1.0);
        assert!(!heap.offer(3, 0.5));
        assert!(heap.offer(4, 4.0));
        assert_eq!(heap.threshold(), 3.0);
        assert_eq!(heap.len(), 3);
        let docs = heap.into_sorted_vec();
        assert_eq!(
            docs,
            vec![
                ScoredDoc { doc_id: 1, score: 5.0 },
                ScoredDoc { doc_id: 4, score: 4.0 },
                ScoredDoc { doc_id: 2, score: 3.0 },
            ]
        );
    }

    #[test]
    fn test_ties_keep_earlier_documents() {
        let mut heap = TopKHeap::new(2).unwrap();
        assert!(heap.offer(7, 2.0));
        assert!(heap.offer(9, 2.0));
        // Equal to the threshold: rejected.
        assert!(!heap.offer(11, 2.0));
        assert!(heap.offer(12, 3.0));
        // 9 was evicted before 7.
        assert_eq!(ids(heap), vec![12, 7]);

        let mut heap = TopKHeap::new(4).unwrap();
        for doc in [5, 3, 8] {
            heap.offer(doc, 1.0);
        }
        assert_eq!(ids(heap), vec![3, 5, 8]);
    }

    #[test]
    fn test_zero_k() {
        assert!(TopKHeap::new(0).unwrap_err().is_invalid_arg());
    }
}
