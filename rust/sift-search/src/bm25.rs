//! BM25 term scoring.

use sift_common::{Result, verify_arg};

/// Free parameters of BM25.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f32,
    /// Document length normalization, `0` disables it.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn validate(&self) -> Result<()> {
        verify_arg!(k1, self.k1.is_finite() && self.k1 >= 0.0);
        verify_arg!(b, (0.0..=1.0).contains(&self.b));
        Ok(())
    }

    /// Upper bound of `term_score(..) * weight` over all documents.
    #[inline]
    pub fn upper_bound(&self, weight: f32) -> f32 {
        weight * (self.k1 + 1.0)
    }

    /// The saturated, length-normalized frequency component:
    /// `freq * (k1 + 1) / (freq + k1 * (1 - b + b * doc_len / avg_doc_len))`.
    ///
    /// Always below `k1 + 1`.
    #[inline]
    pub fn term_score(&self, freq: u32, doc_len: u32, avg_doc_len: f32) -> f32 {
        let freq = freq as f32;
        let relative_len = if avg_doc_len > 0.0 {
            doc_len as f32 / avg_doc_len
        } else {
            1.0
        };
        let norm = 1.0 - self.b + self.b * relative_len;
        freq * (self.k1 + 1.0) / (freq + self.k1 * norm)
    }
}

/// Inverse document frequency of a term found in `df` of `doc_count` documents.
pub fn idf(doc_count: usize, df: usize) -> f32 {
    let n = doc_count as f32;
    let df = df as f32;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Weight of a term occurring `count` times in the query; saturates towards 1.
pub fn query_term_weight(count: u32) -> f32 {
    let count = count as f32;
    count / (count + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idf() {
        // Rare terms weigh more, and even a term in every document stays positive.
        assert!(idf(1000, 2) > idf(1000, 100));
        assert!(idf(1000, 1000) > 0.0);
        assert!((idf(1, 1) - (1.0f32 + 0.5 / 1.5).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_query_term_weight() {
        assert_eq!(query_term_weight(10), 0.5);
        assert!(query_term_weight(1) < query_term_weight(2));
        assert!(query_term_weight(1000) < 1.0);
    }

    #[test]
    fn test_term_score() {
        let params = Bm25Params::default();
        // An average-length document with one occurrence scores exactly 1.
        assert!((params.term_score(1, 10, 10.0) - 1.0).abs() < 1e-6);
        // Longer documents score lower, more occurrences score higher.
        assert!(params.term_score(1, 40, 10.0) < params.term_score(1, 10, 10.0));
        assert!(params.term_score(3, 10, 10.0) > params.term_score(1, 10, 10.0));
        for freq in [1, 5, 100, 100_000] {
            for doc_len in [1, 10, 1000] {
                assert!(params.term_score(freq, doc_len, 50.0) < params.k1 + 1.0);
            }
        }
        assert!((params.upper_bound(0.5) - 1.1).abs() < 1e-6);
        assert!(params.term_score(1, 0, 0.0).is_finite());
    }

    #[test]
    fn test_validate() {
        assert!(Bm25Params::default().validate().is_ok());
        assert!(Bm25Params { k1: -1.0, b: 0.5 }.validate().is_err());
        assert!(Bm25Params { k1: 1.0, b: 1.5 }.validate().is_err());
    }
}
