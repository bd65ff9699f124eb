use serde::{Deserialize, Serialize};
use std::fmt;

/// A ticker as understood by a single provider.
///
/// The `json` field carries provider specific metadata (for vault based
/// providers: which accounts hold the base and quote liquidity). It is opaque
/// to everything except the fetcher that owns the ticker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderTicker {
    off_chain_ticker: String,
    decimals: u64,
    #[serde(default)]
    json: String,
}

impl ProviderTicker {
    pub fn new(off_chain_ticker: impl Into<String>, decimals: u64, json: impl Into<String>) -> Self {
        Self { off_chain_ticker: off_chain_ticker.into(), decimals, json: json.into() }
    }

    /// The identifier the provider knows this ticker by
    pub fn off_chain_ticker(&self) -> &str {
        &self.off_chain_ticker
    }

    pub fn decimals(&self) -> u64 {
        self.decimals
    }

    /// Provider specific metadata, usually a JSON object
    pub fn json(&self) -> &str {
        &self.json
    }
}

impl fmt::Display for ProviderTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.off_chain_ticker)
    }
}
