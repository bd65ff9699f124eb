#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # Price fetchers
//!
//! A [`PriceFetcher`] turns a list of [`ProviderTicker`]s into a
//! [`PriceResponse`]: every ticker ends up either resolved with a price or
//! unresolved with a classified error. Fetching never fails as a whole.
//!
//! [`VaultPriceFetcher`] reads the token vaults backing each ticker from a
//! Solana style chain and prices the ticker from the ratio of their balances.

mod metadata;
pub use metadata::{
    MetadataCache, MetadataError, TickerMetadata, TokenVaultMetadata, Vault, VaultPair,
};

pub mod vault;
pub use vault::{FetcherError, VaultPriceFetcher};

use async_trait::async_trait;
use auto_impl::auto_impl;
use chainfeed_core::types::{PriceResponse, ProviderTicker};
use std::fmt::Debug;

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Fetches the prices of a set of tickers from one provider
pub trait PriceFetcher: Debug + Send + Sync {
    /// Returns a response covering exactly `tickers`
    async fn fetch(&self, tickers: &[ProviderTicker]) -> PriceResponse;
}
