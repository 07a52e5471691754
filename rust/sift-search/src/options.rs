use sift_common::{Result, error::Error, verify_arg};

use crate::bm25::Bm25Params;

pub const DEFAULT_K: usize = 10;

/// Share of the query weight given to `#`-prefixed math tokens in math mode.
pub const DEFAULT_MATH_ALPHA: f32 = 0.18;

/// How a query is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Dynamic pruning; only documents that can reach the top k are scored.
    #[default]
    Wand,
    /// Every document of every query term is scored.
    Exhaustive,
}

impl Strategy {
    pub const fn name(&self) -> &'static str {
        match self {
            Strategy::Wand => "wand",
            Strategy::Exhaustive => "exhaustive",
        }
    }
}

impl TryFrom<&str> for Strategy {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "wand" => Ok(Strategy::Wand),
            "exhaustive" => Ok(Strategy::Exhaustive),
            _ => Err(Error::invalid_arg(
                "strategy",
                format!("unknown strategy '{name}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Number of results per query.
    pub k: usize,
    /// Math mode: `Some(alpha)` weighs `#` tokens by `alpha` and all other tokens
    /// by `1 - alpha`.
    pub math_alpha: Option<f32>,
    pub strategy: Strategy,
    pub bm25: Bm25Params,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            k: DEFAULT_K,
            math_alpha: None,
            strategy: Strategy::default(),
            bm25: Bm25Params::default(),
        }
    }
}

impl SearchOptions {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_math(mut self, alpha: f32) -> Self {
        self.math_alpha = Some(alpha);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(k, self.k > 0);
        if let Some(alpha) = self.math_alpha {
            verify_arg!(alpha, (0.0..=1.0).contains(&alpha));
        }
        self.bm25.validate()
    }

    /// Scales a query term weight for math mode.
    pub fn balance(&self, token: &str, weight: f32) -> f32 {
        match self.math_alpha {
            Some(alpha) if token.starts_with('#') => weight * alpha,
            Some(alpha) => weight * (1.0 - alpha),
            None => weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(SearchOptions::default().validate().is_ok());
        assert!(SearchOptions::default().with_k(0).validate().unwrap_err().is_invalid_arg());
        assert!(SearchOptions::default().with_math(1.5).validate().is_err());
        assert!(SearchOptions::default().with_math(-0.1).validate().is_err());
        assert!(SearchOptions::default().with_math(1.0).validate().is_ok());
    }

    #[test]
    fn test_balance() {
        let text = SearchOptions::default();
        assert_eq!(text.balance("#x#", 0.5), 0.5);
        let math = SearchOptions::default().with_math(0.25);
        assert_eq!(math.balance("#x#", 0.5), 0.125);
        assert_eq!(math.balance("x", 0.5), 0.375);
    }

    #[test]
    fn test_strategy_names() {
        for strategy in [Strategy::Wand, Strategy::Exhaustive] {
            assert_eq!(Strategy::try_from(strategy.name()).unwrap(), strategy);
        }
        assert!(Strategy::try_from("bogus").is_err());
    }
}
