use itertools::Itertools;

use super::Tokenizer;

/// A distinct term with the number of times it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedToken {
    pub term: String,
    pub weight: u32,
}

/// The distinct terms of a text in byte order, each with its occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightedTokens {
    tokens: Vec<WeightedToken>,
    total: u64,
}

impl WeightedTokens {
    /// Tokenizes `text` and aggregates duplicate terms.
    pub fn collect<T: Tokenizer>(tokenizer: &T, text: &str) -> WeightedTokens {
        let fold = tokenizer.folds_case();
        let mut terms: Vec<String> = tokenizer
            .terms(text)
            .map(|term| if fold { term.to_lowercase() } else { term.to_owned() })
            .collect();
        terms.sort_unstable();
        let total = terms.len() as u64;
        let tokens = terms
            .into_iter()
            .chunk_by(|term| term.clone())
            .into_iter()
            .map(|(term, group)| WeightedToken {
                term,
                weight: group.count() as u32,
            })
            .collect();
        WeightedTokens { tokens, total }
    }

    /// Keeps the terms accepted by `keep`; the total shrinks accordingly.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.tokens.retain(|token| keep(&token.term));
        self.total = self.tokens.iter().map(|token| token.weight as u64).sum();
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Total number of term occurrences (the document length).
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeightedToken> {
        self.tokens.iter()
    }
}

impl<'a> IntoIterator for &'a WeightedTokens {
    type Item = &'a WeightedToken;
    type IntoIter = std::slice::Iter<'a, WeightedToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
