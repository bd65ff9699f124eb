use chainfeed_core::types::{ProviderTicker, Pubkey, PubkeyError};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("no vault metadata for ticker {ticker}: {source}")]
    Json {
        ticker: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {side} vault address for ticker {ticker}: {source}")]
    InvalidAddress {
        ticker: String,
        side: &'static str,
        #[source]
        source: PubkeyError,
    },
}

/// One side of a pair: the account holding the token and the token's precision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenVaultMetadata {
    /// Base58 address of the token account
    pub token_vault_address: String,
    pub token_decimals: u8,
}

/// Vault metadata carried in a ticker's JSON payload.
///
/// ```
/// use chainfeed_fetchers::TickerMetadata;
///
/// let metadata: TickerMetadata = serde_json::from_str(r#"{
///     "base_token_vault": {
///         "token_vault_address": "DQyrAcCrDXQ7NeoqGgDCZwBvWDcYmFCjSb9JtteuvPpz",
///         "token_decimals": 9
///     },
///     "quote_token_vault": {
///         "token_vault_address": "HLmqeL62xR1QoZ1HKKbXRrdN1p3phKpxRMb2VVopvBBz",
///         "token_decimals": 6
///     }
/// }"#).unwrap();
/// assert_eq!(metadata.base_token_vault.token_decimals, 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerMetadata {
    pub base_token_vault: TokenVaultMetadata,
    pub quote_token_vault: TokenVaultMetadata,
}

/// A vault address that has been checked to be a valid key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vault {
    pub address: Pubkey,
    pub decimals: u8,
}

/// The validated vaults of one ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultPair {
    pub base: Vault,
    pub quote: Vault,
}

impl TickerMetadata {
    /// Parses and validates the JSON carried by `ticker`
    pub fn from_ticker(ticker: &ProviderTicker) -> Result<Self, MetadataError> {
        serde_json::from_str(ticker.json()).map_err(|source| MetadataError::Json {
            ticker: ticker.to_string(),
            source,
        })
    }

    /// Checks both vault addresses
    pub fn resolve(&self, ticker: &str) -> Result<VaultPair, MetadataError> {
        let vault = |side: &'static str, meta: &TokenVaultMetadata| -> Result<_, MetadataError> {
            let address = meta.token_vault_address.parse().map_err(|source| {
                MetadataError::InvalidAddress { ticker: ticker.to_string(), side, source }
            })?;
            Ok(Vault { address, decimals: meta.token_decimals })
        };
        Ok(VaultPair {
            base: vault("base", &self.base_token_vault)?,
            quote: vault("quote", &self.quote_token_vault)?,
        })
    }
}

/// Vaults per off-chain ticker, filled on first use and kept for the
/// lifetime of the cache.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: DashMap<String, VaultPair>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the vaults of `ticker`, parsing its metadata if this is the
    /// first time it is seen.
    ///
    /// Concurrent callers asking for the same ticker parse it once; failures
    /// are not cached.
    pub fn get_or_resolve(&self, ticker: &ProviderTicker) -> Result<VaultPair, MetadataError> {
        match self.entries.entry(ticker.off_chain_ticker().to_string()) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let vaults =
                    TickerMetadata::from_ticker(ticker)?.resolve(ticker.off_chain_ticker())?;
                trace!(
                    %ticker,
                    base = %vaults.base.address,
                    quote = %vaults.quote.address,
                    "cached vaults"
                );
                entry.insert(vaults);
                Ok(vaults)
            }
        }
    }

    pub fn get(&self, ticker: &str) -> Option<VaultPair> {
        self.entries.get(ticker).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
