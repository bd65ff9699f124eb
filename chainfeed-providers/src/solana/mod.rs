//! Account reads against Solana style JSON-RPC nodes

mod types;
pub use types::{Account, Commitment, RpcContext, RpcResponse, UiAccount};

mod client;
pub use client::SolanaRpc;

mod mock;
pub use mock::MockAccountsClient;

use crate::ProviderError;
use async_trait::async_trait;
use auto_impl::auto_impl;
use chainfeed_core::types::Pubkey;
use std::fmt::Debug;

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Reads many accounts in a single round-trip.
///
/// The returned list has one entry per requested address, in request order.
/// An account that does not exist is `None` at its position.
pub trait AccountsClient: Debug + Send + Sync {
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        commitment: Commitment,
    ) -> Result<Vec<Option<Account>>, ProviderError>;
}
