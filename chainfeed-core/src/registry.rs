//! The set of currency pairs an oracle tracks, with a per-pair update nonce.
//!
//! Only the registry's authority may add or remove pairs. Adding a pair that
//! is already tracked keeps its nonce; removing an untracked pair is a no-op.

use crate::types::{CurrencyPair, CurrencyPairError};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("authority {got} is not registry authority {expected}")]
    Unauthorized { expected: String, got: String },
    #[error(transparent)]
    InvalidPair(#[from] CurrencyPairError),
}

#[derive(Debug, Clone)]
pub struct PairRegistry {
    authority: String,
    nonces: BTreeMap<CurrencyPair, u64>,
}

impl PairRegistry {
    pub fn new(authority: impl Into<String>) -> Self {
        Self { authority: authority.into(), nonces: BTreeMap::new() }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    fn check_authority(&self, authority: &str) -> Result<(), RegistryError> {
        if authority != self.authority {
            return Err(RegistryError::Unauthorized {
                expected: self.authority.clone(),
                got: authority.to_string(),
            })
        }
        Ok(())
    }

    /// Starts tracking `pairs`. Every pair is validated before any is inserted.
    pub fn add_currency_pairs(
        &mut self,
        authority: &str,
        pairs: &[CurrencyPair],
    ) -> Result<(), RegistryError> {
        if pairs.is_empty() {
            return Err(RegistryError::EmptyMessage)
        }
        pairs.iter().try_for_each(CurrencyPair::validate_basic)?;
        self.check_authority(authority)?;

        for pair in pairs {
            if !self.nonces.contains_key(pair) {
                debug!(%pair, "tracking currency pair");
                self.nonces.insert(pair.clone(), 0);
            }
        }
        Ok(())
    }

    /// Stops tracking the pairs identified by `ids` (`BASE/QUOTE` strings).
    pub fn remove_currency_pairs(
        &mut self,
        authority: &str,
        ids: &[impl AsRef<str>],
    ) -> Result<(), RegistryError> {
        if ids.is_empty() {
            return Err(RegistryError::EmptyMessage)
        }
        self.check_authority(authority)?;

        let pairs = ids
            .iter()
            .map(|id| id.as_ref().parse::<CurrencyPair>())
            .collect::<Result<Vec<_>, _>>()?;
        for pair in pairs {
            if self.nonces.remove(&pair).is_some() {
                debug!(%pair, "removed currency pair");
            }
        }
        Ok(())
    }

    /// The number of price updates recorded for `pair`, if tracked.
    pub fn nonce(&self, pair: &CurrencyPair) -> Option<u64> {
        self.nonces.get(pair).copied()
    }

    /// Records a price update for `pair`, returning the new nonce.
    pub fn increment_nonce(&mut self, pair: &CurrencyPair) -> Option<u64> {
        let nonce = self.nonces.get_mut(pair)?;
        *nonce += 1;
        Some(*nonce)
    }

    pub fn tracked(&self) -> impl Iterator<Item = &CurrencyPair> {
        self.nonces.keys()
    }
}
