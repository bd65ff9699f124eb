use super::ProviderTicker;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, fmt};
use strum::{Display, EnumString};
use thiserror::Error;

/// Classification attached to every unresolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    Unknown,
    /// The provider could not be reached or answered with something unusable as a whole
    ApiGeneral,
    /// The provider was asked about a ticker it is not configured for
    UnknownPair,
    /// A single instrument's on-chain data was missing or malformed
    InvalidResponse,
    /// The on-chain data decoded but does not yield a price
    InvalidPrice,
}

/// An error message paired with its [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ErrorWithCode {
    message: String,
    code: ErrorCode,
}

impl ErrorWithCode {
    pub fn new(err: impl fmt::Display, code: ErrorCode) -> Self {
        Self { message: err.to_string(), code }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorWithCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

/// A resolved price and the time it was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceResult {
    pub value: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

impl PriceResult {
    pub fn new(value: BigDecimal, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedResult {
    pub error: ErrorWithCode,
}

impl From<ErrorWithCode> for UnresolvedResult {
    fn from(error: ErrorWithCode) -> Self {
        Self { error }
    }
}

pub type ResolvedPrices = HashMap<ProviderTicker, PriceResult>;
pub type UnresolvedPrices = HashMap<ProviderTicker, UnresolvedResult>;

/// The complete answer of a fetcher for one request.
///
/// Every requested ticker is expected in exactly one of the two maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceResponse {
    pub resolved: ResolvedPrices,
    pub unresolved: UnresolvedPrices,
}

impl PriceResponse {
    pub fn new(resolved: ResolvedPrices, unresolved: UnresolvedPrices) -> Self {
        Self { resolved, unresolved }
    }

    /// Marks every ticker in `tickers` unresolved with the same error.
    pub fn with_error<'a>(
        tickers: impl IntoIterator<Item = &'a ProviderTicker>,
        err: ErrorWithCode,
    ) -> Self {
        let unresolved = tickers
            .into_iter()
            .map(|ticker| (ticker.clone(), UnresolvedResult::from(err.clone())))
            .collect();
        Self { resolved: HashMap::new(), unresolved }
    }

    /// Returns `true` if the response covers exactly `tickers`, each ticker in one map only.
    pub fn covers_exactly(&self, tickers: &[ProviderTicker]) -> bool {
        let disjoint = self.resolved.keys().all(|t| !self.unresolved.contains_key(t));
        let requested = tickers
            .iter()
            .all(|t| self.resolved.contains_key(t) || self.unresolved.contains_key(t));
        let mut unique = tickers.to_vec();
        unique.sort();
        unique.dedup();
        disjoint && requested && self.resolved.len() + self.unresolved.len() == unique.len()
    }
}
