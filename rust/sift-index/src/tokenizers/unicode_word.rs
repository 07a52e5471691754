use super::{TermLimits, Terms, Tokenizer, TokenizerKind};

/// Yields maximal runs of alphanumeric characters (Unicode `Alphabetic` or
/// `Numeric`). Terms are lower-cased when collected into
/// [`WeightedTokens`](super::WeightedTokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnicodeWordTokenizer {
    limits: TermLimits,
}

impl UnicodeWordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: TermLimits) -> Self {
        UnicodeWordTokenizer { limits }
    }
}

fn is_separator(c: char) -> bool {
    !c.is_alphanumeric()
}

impl Tokenizer for UnicodeWordTokenizer {
    fn terms<'a>(&self, input: &'a str) -> Terms<'a> {
        Terms::new(input, is_separator, self.limits)
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::UnicodeWord
    }

    fn limits(&self) -> TermLimits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokenizer: &UnicodeWordTokenizer, input: &str) -> Vec<String> {
        tokenizer.terms(input).map(str::to_string).collect()
    }

    #[test]
    fn test_words() {
        let tokenizer = UnicodeWordTokenizer::new();
        assert_eq!(
            words(&tokenizer, "Depth: 3-4 levels, (mostly)"),
            ["Depth", "3", "4", "levels", "mostly"]
        );
        assert!(words(&tokenizer, "").is_empty());
        assert!(words(&tokenizer, "!@#$%^&*()").is_empty());
        assert_eq!(words(&tokenizer, "naïve café"), ["naïve", "café"]);
        assert_eq!(words(&tokenizer, "你好，世界！"), ["你好", "世界"]);
        assert_eq!(words(&tokenizer, "x\0y"), ["x", "y"]);
    }

    #[test]
    fn test_limits_apply_per_word() {
        let tokenizer = UnicodeWordTokenizer::with_limits(TermLimits {
            min_len: 2,
            max_len: 3,
        });
        // "é" is two bytes long.
        assert_eq!(
            words(&tokenizer, "a cat elephant é x"),
            ["cat", "ele", "é"]
        );
    }
}
