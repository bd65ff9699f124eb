use crate::{
    metadata::{MetadataCache, Vault, VaultPair},
    PriceFetcher,
};
use async_trait::async_trait;
use chainfeed_core::{
    bigdecimal::BigDecimal,
    config::{ConfigError, ProviderConfig},
    types::{
        is_token_program, DecodeError, ErrorCode, ErrorWithCode, PriceResponse, PriceResult,
        ProviderTicker, Pubkey, TokenAccount,
    },
    utils::{calculate_price, PriceError},
};
use chainfeed_providers::{
    Account, AccountsClient, BatchClientWrapper, Commitment, HeightProbe, Http, HttpBuildError,
    ProviderError, QuorumClient, SolanaRpc,
};
use chrono::Utc;
use std::{fmt, time::Duration};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Name a provider config must carry to be used by [`VaultPriceFetcher`]
pub const NAME: &str = "vault_api";

/// How long a read may outlive the configured timeout before it is abandoned.
/// Endpoints behind a quorum are bounded by the configured timeout itself, so
/// a hung node fails alone and the read still completes.
const READ_GRACE: Duration = Duration::from_millis(100);

/// Errors raised while constructing a [`VaultPriceFetcher`]
#[derive(Error, Debug)]
pub enum FetcherError {
    #[error("config for {} is invalid: {0}", NAME)]
    InvalidConfig(#[from] ConfigError),
    #[error("configured name is incorrect; expected: {}, got: {0}", NAME)]
    WrongName(String),
    #[error("config for {0} is not enabled")]
    Disabled(String),
    #[error("could not build endpoint client: {0}")]
    HttpBuild(#[from] HttpBuildError),
}

/// Computes prices from the balances of the two token vaults backing each
/// ticker, typically the reserves of an AMM pool.
///
/// All vaults of a request are read in one `getMultipleAccounts` call at
/// finalized commitment. The price of a ticker is
/// `quote / base * 10^(base_decimals - quote_decimals)`.
///
/// # Example
///
/// ```no_run
/// use chainfeed_core::{config::ProviderConfig, types::ProviderTicker};
/// use chainfeed_fetchers::{PriceFetcher, VaultPriceFetcher};
///
/// # async fn foo(
/// #     config: ProviderConfig,
/// #     tickers: Vec<ProviderTicker>,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = VaultPriceFetcher::new(config)?;
/// let response = fetcher.fetch(&tickers).await;
/// for (ticker, price) in &response.resolved {
///     println!("{ticker}: {}", price.value);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct VaultPriceFetcher<C = Box<dyn AccountsClient>> {
    config: ProviderConfig,
    client: C,
    metadata: MetadataCache,
}

impl VaultPriceFetcher {
    /// Builds the fetcher and its endpoint client from `config`.
    ///
    /// A single endpoint is queried directly; several endpoints are combined
    /// as in [`VaultPriceFetcher::with_quorum`].
    pub fn new(config: ProviderConfig) -> Result<Self, FetcherError> {
        check_config(&config)?;
        let client: Box<dyn AccountsClient> = match config.endpoints.as_slice() {
            [endpoint] => Box::new(SolanaRpc::new(Http::from_endpoint(endpoint)?)),
            endpoints => {
                let probe = HeightProbe::SolanaSlot(Commitment::Finalized);
                Box::new(quorum_rpc(&config, QuorumClient::from_endpoints(endpoints, probe)?))
            }
        };
        Ok(Self { config, client, metadata: MetadataCache::new() })
    }
}

impl<T: BatchClientWrapper> VaultPriceFetcher<SolanaRpc<QuorumClient<T>>> {
    /// Builds the fetcher over a quorum of endpoints.
    ///
    /// Reads go to the endpoint reporting the highest finalized slot. Every
    /// endpoint is bounded by the configured timeout, so a node that does not
    /// answer in time is skipped while the others still serve the read.
    pub fn with_quorum(
        config: ProviderConfig,
        quorum: QuorumClient<T>,
    ) -> Result<Self, FetcherError> {
        check_config(&config)?;
        let client = quorum_rpc(&config, quorum);
        Ok(Self { config, client, metadata: MetadataCache::new() })
    }
}

fn quorum_rpc<T: BatchClientWrapper>(
    config: &ProviderConfig,
    quorum: QuorumClient<T>,
) -> SolanaRpc<QuorumClient<T>> {
    let quorum = quorum
        .with_probe(HeightProbe::SolanaSlot(Commitment::Finalized))
        .with_timeout(config.timeout);
    SolanaRpc::new(quorum)
}

impl<C: AccountsClient> VaultPriceFetcher<C> {
    /// Builds the fetcher over an existing accounts client
    pub fn new_with_client(config: ProviderConfig, client: C) -> Result<Self, FetcherError> {
        check_config(&config)?;
        Ok(Self { config, client, metadata: MetadataCache::new() })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Vaults resolved so far
    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }
}

fn check_config(config: &ProviderConfig) -> Result<(), FetcherError> {
    config.validate_basic()?;
    if config.name != NAME {
        return Err(FetcherError::WrongName(config.name.clone()))
    }
    if !config.enabled {
        return Err(FetcherError::Disabled(config.name.clone()))
    }
    Ok(())
}

fn api_error(tickers: &[ProviderTicker], err: impl fmt::Display) -> PriceResponse {
    warn!(%err, "account read failed");
    PriceResponse::with_error(
        tickers,
        ErrorWithCode::new(format!("solana json-rpc error: {err}"), ErrorCode::ApiGeneral),
    )
}

#[async_trait]
impl<C: AccountsClient> PriceFetcher for VaultPriceFetcher<C> {
    #[instrument(skip_all, fields(provider = NAME, tickers = tickers.len()))]
    async fn fetch(&self, tickers: &[ProviderTicker]) -> PriceResponse {
        if tickers.is_empty() {
            return PriceResponse::default()
        }

        let mut vaults = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            match self.metadata.get_or_resolve(ticker) {
                Ok(pair) => vaults.push(pair),
                Err(err) => {
                    warn!(%ticker, %err, "no vault metadata");
                    return PriceResponse::with_error(
                        tickers,
                        ErrorWithCode::new(err, ErrorCode::UnknownPair),
                    )
                }
            }
        }

        // base then quote for every ticker, in request order
        let addresses =
            vaults.iter().flat_map(|v| [v.base.address, v.quote.address]).collect::<Vec<_>>();

        let deadline = self.config.timeout + READ_GRACE;
        let request = self.client.get_multiple_accounts(&addresses, Commitment::Finalized);
        let accounts = match tokio::time::timeout(deadline, request).await {
            Ok(Ok(accounts)) => accounts,
            Ok(Err(err)) => return api_error(tickers, err),
            Err(_) => return api_error(tickers, ProviderError::Timeout(deadline)),
        };
        if accounts.len() != addresses.len() {
            return api_error(
                tickers,
                format!("expected {} accounts, got {}", addresses.len(), accounts.len()),
            )
        }

        let now = Utc::now();
        let mut response = PriceResponse::default();
        for ((ticker, pair), read) in tickers.iter().zip(&vaults).zip(accounts.chunks(2)) {
            match vault_price(pair, &read[0], &read[1]) {
                Ok(price) => {
                    debug!(%ticker, %price, "scaled price");
                    response.resolved.insert(ticker.clone(), PriceResult::new(price, now));
                }
                Err(err) => {
                    debug!(%ticker, %err, "could not price ticker");
                    let err = ErrorWithCode::new(&err, err.code());
                    response.unresolved.insert(ticker.clone(), err.into());
                }
            }
        }
        response
    }
}

/// Why a single ticker could not be priced
#[derive(Error, Debug)]
enum VaultError {
    #[error("{side} vault account {address} does not exist")]
    Missing { side: &'static str, address: Pubkey },
    #[error("{side} vault account {address} has no data")]
    Empty { side: &'static str, address: Pubkey },
    #[error("{side} vault account {address} is owned by {owner}, not a token program")]
    ForeignOwner { side: &'static str, address: Pubkey, owner: Pubkey },
    #[error("could not decode {side} vault account {address}: {source}")]
    Decode {
        side: &'static str,
        address: Pubkey,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Price(#[from] PriceError),
}

impl VaultError {
    fn code(&self) -> ErrorCode {
        match self {
            VaultError::Price(_) => ErrorCode::InvalidPrice,
            _ => ErrorCode::InvalidResponse,
        }
    }
}

/// Reads the raw balance held by a vault account
fn vault_balance(
    side: &'static str,
    vault: &Vault,
    account: &Option<Account>,
) -> Result<u64, VaultError> {
    let address = vault.address;
    let account = account.as_ref().ok_or(VaultError::Missing { side, address })?;
    if account.data.is_empty() {
        return Err(VaultError::Empty { side, address })
    }
    // results carry no address, so the owner is the only check that the
    // account at this position is a token account at all
    if !is_token_program(&account.owner) {
        return Err(VaultError::ForeignOwner { side, address, owner: account.owner })
    }
    let token = TokenAccount::unpack(&account.data)
        .map_err(|source| VaultError::Decode { side, address, source })?;
    Ok(token.amount)
}

fn vault_price(
    pair: &VaultPair,
    base: &Option<Account>,
    quote: &Option<Account>,
) -> Result<BigDecimal, VaultError> {
    let base_balance = vault_balance("base", &pair.base, base)?;
    let quote_balance = vault_balance("quote", &pair.quote, quote)?;
    debug!(base = base_balance, quote = quote_balance, "unscaled balances");
    Ok(calculate_price(base_balance, quote_balance, pair.base.decimals, pair.quote.decimals)?)
}
