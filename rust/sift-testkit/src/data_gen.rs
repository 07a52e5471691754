//! Data generation utilities for testing.

use std::collections::BTreeSet;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_#";

/// Generates `count` distinct keys in increasing byte order.
///
/// Keys are derived from a small pool of stems so that neighbouring keys share
/// prefixes of varying length, including prefixes and suffixes longer than 15
/// bytes. Keys never contain a zero byte; the empty key may be present.
pub fn sorted_keys(seed: u64, count: usize) -> Vec<Vec<u8>> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let stems: Vec<Vec<u8>> = (0..(count / 8).max(4))
        .map(|_| random_word(&mut rng, 0..24))
        .collect();
    let mut keys = BTreeSet::new();
    while keys.len() < count {
        let mut key = stems[rng.usize(..stems.len())].clone();
        let max_suffix = rng.usize(1..32);
        key.extend(random_word(&mut rng, 0..max_suffix));
        keys.insert(key);
    }
    keys.into_iter().collect()
}

/// Generates a random word of `len` bytes drawn from a printable alphabet.
pub fn random_word(rng: &mut fastrand::Rng, len: std::ops::Range<usize>) -> Vec<u8> {
    let len = if len.is_empty() { 0 } else { rng.usize(len) };
    (0..len)
        .map(|_| ALPHABET[rng.usize(..ALPHABET.len())])
        .collect()
}

/// Generates a posting list of `len` distinct documents out of `doc_count`,
/// as `(doc_id, freq)` pairs in increasing document order.
pub fn posting_list(
    rng: &mut fastrand::Rng,
    doc_count: u32,
    len: usize,
    max_freq: u32,
) -> Vec<(u32, u32)> {
    assert!(len as u64 <= doc_count as u64);
    assert!(max_freq >= 1);
    let mut docs = BTreeSet::new();
    while docs.len() < len {
        docs.insert(rng.u32(..doc_count));
    }
    docs.into_iter()
        .map(|doc| (doc, rng.u32(1..=max_freq)))
        .collect()
}

/// Generates document lengths (token counts) in `min..=max`.
pub fn doc_lengths(rng: &mut fastrand::Rng, doc_count: usize, min: u32, max: u32) -> Vec<u32> {
    (0..doc_count).map(|_| rng.u32(min..=max)).collect()
}
