#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # chainfeed
//!
//! > Prices from on-chain state, read through RPC endpoints that may be slow,
//! > stale or down.
//!
//! # Quickstart
//!
//! A prelude is provided which imports all the important things for you. A
//! fetcher is built from a provider config; with several endpoints its reads
//! go to whichever node reports the highest finalized slot.
//!
//! ```no_run
//! use chainfeed::prelude::*;
//!
//! # async fn foo(tickers: Vec<ProviderTicker>) -> Result<(), Box<dyn std::error::Error>> {
//! let config: ProviderConfig = serde_json::from_str(r#"{
//!     "name": "vault_api",
//!     "enabled": true,
//!     "timeout": "500ms",
//!     "interval": "1s",
//!     "max_queries": 1,
//!     "endpoints": [
//!         { "url": "https://api.mainnet-beta.solana.com" },
//!         { "url": "https://solana-rpc.publicnode.com" }
//!     ]
//! }"#)?;
//!
//! let fetcher = VaultPriceFetcher::new(config)?;
//! let response = fetcher.fetch(&tickers).await;
//! # Ok(())
//! # }
//! ```

/// # Core types
///
/// Account addresses, tickers, price responses, the SPL token account
/// layout, decimal price arithmetic, provider configuration and the tracked
/// currency-pair registry.
///
/// ```rust
/// use chainfeed::core::{bigdecimal::BigDecimal, types::ErrorCode, utils::calculate_price};
///
/// // 4e-8 base tokens against 2e-6 quote tokens
/// let price = calculate_price(4, 2, 8, 6).unwrap();
/// assert_eq!(price, BigDecimal::from(50));
/// assert_eq!(ErrorCode::UnknownPair.to_string(), "unknown_pair");
/// ```
pub mod core {
    pub use chainfeed_core::*;
}

// Re-export chainfeed_core::utils
pub use chainfeed_core::utils;

/// # Clients for chain RPC endpoints
///
/// Batched JSON-RPC over HTTP, the multi-endpoint [`providers::QuorumClient`]
/// and Solana account reads.
pub mod providers {
    pub use chainfeed_providers::*;
}

/// # Price fetchers
pub mod fetchers {
    pub use chainfeed_fetchers::*;
}

/// Easy import of frequently used type definitions and traits
pub mod prelude {
    pub use chainfeed_core::{
        config::{Authentication, Endpoint, ProviderConfig},
        registry::PairRegistry,
        types::*,
    };

    pub use chainfeed_providers::{
        Account, AccountsClient, BatchClient, BatchElement, Commitment, HeightProbe, Http,
        JsonRpcError, ProviderError, QuorumClient, QuorumError, SolanaRpc,
    };

    pub use chainfeed_fetchers::{PriceFetcher, VaultPriceFetcher};
}
