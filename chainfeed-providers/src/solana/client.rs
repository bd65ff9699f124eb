use super::{Account, AccountsClient, Commitment, RpcResponse, UiAccount};
use crate::{BatchClient, BatchElement, ProviderError};
use async_trait::async_trait;
use chainfeed_core::types::Pubkey;
use serde_json::json;
use tracing::{instrument, trace};

/// [`AccountsClient`] speaking Solana JSON-RPC over any [`BatchClient`].
///
/// Wrapping a [`crate::QuorumClient`] makes every account read go to the
/// endpoint with the most recent slot.
///
/// # Example
///
/// ```no_run
/// use chainfeed_core::types::Pubkey;
/// use chainfeed_providers::{AccountsClient, Commitment, Http, SolanaRpc};
/// use std::str::FromStr;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let rpc = SolanaRpc::new(Http::from_str("https://api.mainnet-beta.solana.com")?);
/// let vault = Pubkey::from_str("9wFFyRfZBsuAha4YcuxcXLKwMxJR43S7fPfQLusDBzvT")?;
/// let accounts = rpc.get_multiple_accounts(&[vault], Commitment::Finalized).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SolanaRpc<C> {
    inner: C,
}

impl<C: BatchClient> SolanaRpc<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The `getMultipleAccounts` request for `addresses`
    pub fn multiple_accounts_request(addresses: &[Pubkey], commitment: Commitment) -> BatchElement {
        let addresses = addresses.iter().map(ToString::to_string).collect::<Vec<_>>();
        BatchElement::new(
            "getMultipleAccounts",
            json!([addresses, { "commitment": commitment, "encoding": "base64" }]),
        )
    }
}

#[async_trait]
impl<C: BatchClient> AccountsClient for SolanaRpc<C> {
    #[instrument(skip_all, fields(accounts = addresses.len(), commitment = %commitment))]
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        commitment: Commitment,
    ) -> Result<Vec<Option<Account>>, ProviderError> {
        let mut batch = [Self::multiple_accounts_request(addresses, commitment)];
        self.inner.batch_request(&mut batch).await.map_err(Into::into)?;

        let res: RpcResponse<Vec<Option<UiAccount>>> = batch[0].decode()?;
        trace!(slot = res.context.slot, returned = res.value.len(), "accounts read");
        res.value.into_iter().map(|account| account.map(Account::try_from).transpose()).collect()
    }
}
