use super::{TermLimits, Terms, Tokenizer, TokenizerKind};

/// Splits pre-tokenized text on space, tab, carriage return and line feed.
///
/// Terms are not normalized; corpora and queries are expected to go through
/// the same external tokenizer first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WhitespaceTokenizer {
    limits: TermLimits,
}

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: TermLimits) -> Self {
        WhitespaceTokenizer { limits }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

impl Tokenizer for WhitespaceTokenizer {
    fn terms<'a>(&self, input: &'a str) -> Terms<'a> {
        Terms::new(input, is_separator, self.limits)
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::Whitespace
    }

    fn limits(&self) -> TermLimits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(tokenizer: &WhitespaceTokenizer, input: &str) -> Vec<String> {
        tokenizer.terms(input).map(str::to_string).collect()
    }

    #[test]
    fn test_splits_on_ascii_whitespace() {
        let tokenizer = WhitespaceTokenizer::new();
        assert_eq!(
            terms(&tokenizer, "  the Quick\tbrown,fox\r\n#math(x)#  "),
            ["the", "Quick", "brown,fox", "#math(x)#"]
        );
        assert!(terms(&tokenizer, " \t\r\n").is_empty());
        // No-break space belongs to the term.
        assert_eq!(terms(&tokenizer, "a\u{00A0}b").len(), 1);
        assert_eq!(terms(&tokenizer, "ok bad\0term fine"), ["ok", "fine"]);
    }

    #[test]
    fn test_custom_limits() {
        let tokenizer = WhitespaceTokenizer::with_limits(TermLimits {
            min_len: 2,
            max_len: 4,
        });
        assert_eq!(terms(&tokenizer, "a bb ccccc dddd"), ["bb", "cccc", "dddd"]);
    }
}
