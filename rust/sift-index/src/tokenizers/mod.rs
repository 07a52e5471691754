//! Tokenizers for document content and queries.
//!
//! An index must be queried with the tokenizer it was built with. Both
//! tokenizers cut the input at separator characters and yield slices of it;
//! [`WeightedTokens`] turns those slices into the sorted `(term, count)` list
//! consumed by the inverter and the searcher.

pub mod unicode_word;
mod weighted;
pub mod whitespace;

use std::str::Split;

use sift_common::{Result, error::Error};
pub use unicode_word::UnicodeWordTokenizer;
pub use weighted::{WeightedToken, WeightedTokens};
pub use whitespace::WhitespaceTokenizer;

/// Length bounds applied to every term, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermLimits {
    /// Shorter terms are dropped.
    pub min_len: usize,
    /// Longer terms are cut at the last character boundary that fits.
    pub max_len: usize,
}

impl Default for TermLimits {
    fn default() -> Self {
        TermLimits {
            min_len: 1,
            max_len: 256,
        }
    }
}

impl TermLimits {
    /// Applies the limits to a raw term. Empty terms (also after truncation)
    /// and terms holding a zero byte are rejected.
    pub fn admit<'a>(&self, term: &'a str) -> Option<&'a str> {
        if term.is_empty() || term.len() < self.min_len || term.contains('\0') {
            return None;
        }
        if term.len() <= self.max_len {
            return Some(term);
        }
        let mut end = self.max_len;
        while !term.is_char_boundary(end) {
            end -= 1;
        }
        (end > 0).then(|| &term[..end])
    }
}

/// The terms of one input: the pieces between separators that pass the limits.
pub struct Terms<'a> {
    pieces: Split<'a, fn(char) -> bool>,
    limits: TermLimits,
}

impl<'a> Terms<'a> {
    fn new(input: &'a str, is_separator: fn(char) -> bool, limits: TermLimits) -> Terms<'a> {
        Terms {
            pieces: input.split(is_separator),
            limits,
        }
    }
}

impl<'a> Iterator for Terms<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let limits = self.limits;
        self.pieces.find_map(|piece| limits.admit(piece))
    }
}

pub trait Tokenizer: Send + Sync {
    /// Splits `input` into terms.
    fn terms<'a>(&self, input: &'a str) -> Terms<'a>;

    fn kind(&self) -> TokenizerKind;

    fn limits(&self) -> TermLimits;

    /// Whether terms are lower-cased when collected.
    fn folds_case(&self) -> bool {
        self.kind() == TokenizerKind::UnicodeWord
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    Whitespace,
    UnicodeWord,
}

impl TokenizerKind {
    pub const fn name(&self) -> &'static str {
        match self {
            TokenizerKind::Whitespace => "whitespace",
            TokenizerKind::UnicodeWord => "unicode-word",
        }
    }
}

impl TryFrom<&str> for TokenizerKind {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        [TokenizerKind::Whitespace, TokenizerKind::UnicodeWord]
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| Error::invalid_arg("tokenizer", format!("unknown tokenizer '{name}'")))
    }
}

/// A tokenizer chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerType {
    Whitespace(WhitespaceTokenizer),
    UnicodeWord(UnicodeWordTokenizer),
}

impl Default for TokenizerType {
    fn default() -> Self {
        TokenizerType::Whitespace(WhitespaceTokenizer::new())
    }
}

impl Tokenizer for TokenizerType {
    fn terms<'a>(&self, input: &'a str) -> Terms<'a> {
        match self {
            TokenizerType::Whitespace(t) => t.terms(input),
            TokenizerType::UnicodeWord(t) => t.terms(input),
        }
    }

    fn kind(&self) -> TokenizerKind {
        match self {
            TokenizerType::Whitespace(_) => TokenizerKind::Whitespace,
            TokenizerType::UnicodeWord(_) => TokenizerKind::UnicodeWord,
        }
    }

    fn limits(&self) -> TermLimits {
        match self {
            TokenizerType::Whitespace(t) => t.limits(),
            TokenizerType::UnicodeWord(t) => t.limits(),
        }
    }
}

/// Creates a tokenizer by name: `whitespace` or `unicode-word`.
pub fn create_tokenizer(name: &str) -> Result<TokenizerType> {
    Ok(match TokenizerKind::try_from(name)? {
        TokenizerKind::Whitespace => TokenizerType::Whitespace(WhitespaceTokenizer::new()),
        TokenizerKind::UnicodeWord => TokenizerType::UnicodeWord(UnicodeWordTokenizer::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tokenizer() {
        assert_eq!(
            create_tokenizer("whitespace").unwrap().kind(),
            TokenizerKind::Whitespace
        );
        let words = create_tokenizer("unicode-word").unwrap();
        assert_eq!(words.kind().name(), "unicode-word");
        assert!(words.folds_case());
        assert!(create_tokenizer("porter").unwrap_err().is_invalid_arg());
        assert!(!TokenizerType::default().folds_case());
    }

    #[test]
    fn test_limits() {
        let limits = TermLimits::default();
        assert_eq!(limits.admit(&"a".repeat(300)).unwrap().len(), 256);
        assert_eq!(limits.admit(""), None);
        assert_eq!(limits.admit("a\0b"), None);

        // Cyrillic letters take two bytes each.
        let narrow = TermLimits {
            min_len: 1,
            max_len: 5,
        };
        assert_eq!(narrow.admit("Привет"), Some("Пр"));
        let tiny = TermLimits {
            min_len: 1,
            max_len: 1,
        };
        assert_eq!(tiny.admit("Привет"), None);
    }
}
