#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::type_complexity)]
//! # Batched clients for chain RPC endpoints
//!
//! The central abstraction is [`BatchClient`]: something that can send an
//! ordered batch of JSON-RPC requests to a node and fill every element's
//! result or error slot. [`Http`] talks to a single node; [`QuorumClient`]
//! fans the same batch out to several nodes and keeps the answers of the one
//! reporting the greatest chain height.
//!
//! ```no_run
//! use chainfeed_providers::{BatchClient, BatchElement, Http, QuorumClient};
//! use std::str::FromStr;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = QuorumClient::builder()
//!     .add_client("primary", Http::from_str("https://eth.llamarpc.com")?)
//!     .add_client("fallback", Http::from_str("https://rpc.ankr.com/eth")?)
//!     .build();
//!
//! let mut batch = [BatchElement::new("eth_chainId", serde_json::json!([]))];
//! client.batch_request(&mut batch).await?;
//! let chain_id: String = batch[0].decode()?;
//! # Ok(())
//! # }
//! ```
//!
//! Account reads for Solana style chains go through [`AccountsClient`],
//! implemented on top of any batch client by [`SolanaRpc`].

mod batch;
pub use batch::BatchElement;

mod errors;
pub use errors::{ProviderError, RpcError};

mod rpc;
pub use rpc::*;

pub mod solana;
pub use solana::{Account, AccountsClient, Commitment, MockAccountsClient, SolanaRpc};

use async_trait::async_trait;
use auto_impl::auto_impl;
use std::{error::Error, fmt::Debug};

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by transports able to execute a batch of
/// JSON-RPC requests against one endpoint.
///
/// Implementations fill the `result` or `error` slot of every element in
/// place and must neither reorder nor resize the batch. A returned error means
/// the batch as a whole failed (unreachable node, malformed reply).
pub trait BatchClient: Debug + Send + Sync {
    /// A transport error
    type Error: Error + Into<ProviderError>;

    /// Sends every element of `batch` in one round-trip
    async fn batch_request(&self, batch: &mut [BatchElement]) -> Result<(), Self::Error>;
}
