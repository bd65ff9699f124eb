use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A base / quote currency pair, written `BASE/QUOTE`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyPairError {
    #[error("incorrectly formatted currency pair {0:?}, expected BASE/QUOTE")]
    Format(String),
    #[error("currency pair side must be non-empty and upper-case, got {0:?}")]
    InvalidSide(String),
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self { base: base.into(), quote: quote.into() }
    }

    /// Checks both sides are non-empty and upper-case
    pub fn validate_basic(&self) -> Result<(), CurrencyPairError> {
        for side in [&self.base, &self.quote] {
            if side.is_empty() || side.to_uppercase() != *side {
                return Err(CurrencyPairError::InvalidSide(side.clone()))
            }
        }
        Ok(())
    }
}

impl FromStr for CurrencyPair {
    type Err = CurrencyPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s.split_once('/').ok_or_else(|| CurrencyPairError::Format(s.into()))?;
        if quote.contains('/') {
            return Err(CurrencyPairError::Format(s.into()))
        }
        let pair = Self::new(base, quote);
        pair.validate_basic()?;
        Ok(pair)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
