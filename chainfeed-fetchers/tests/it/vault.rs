use crate::{config, key, ticker, token_account};
use async_trait::async_trait;
use chainfeed_core::{
    bigdecimal::BigDecimal,
    types::{ErrorCode, PriceResponse, ProviderTicker, Pubkey},
};
use chainfeed_fetchers::{PriceFetcher, VaultPriceFetcher};
use chainfeed_providers::{
    Account, AccountsClient, Commitment, MockAccountsClient, ProviderError,
};
use futures_util::future::join_all;
use std::{collections::HashMap, str::FromStr, sync::Arc, time::Duration};
use tracing_test::traced_test;

fn fetcher(mock: &MockAccountsClient) -> VaultPriceFetcher<MockAccountsClient> {
    VaultPriceFetcher::new_with_client(config(), mock.clone()).unwrap()
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn unresolved_codes(response: &PriceResponse) -> Vec<ErrorCode> {
    response.unresolved.values().map(|u| u.error.code()).collect()
}

#[tokio::test]
#[traced_test]
async fn resolves_every_ticker() {
    let mock = MockAccountsClient::new();
    mock.push_accounts(vec![
        token_account(2_000_000_000),
        token_account(300_000_000),
        token_account(5_000_000),
        token_account(10_000_000_000),
    ]);
    let tickers = [ticker("SOL/USDC", (1, 9), (2, 6)), ticker("BONK/SOL", (3, 5), (4, 9))];

    let response = fetcher(&mock).fetch(&tickers).await;
    assert!(response.covers_exactly(&tickers));
    assert!(response.unresolved.is_empty());
    assert_eq!(response.resolved[&tickers[0]].value, dec("150"));
    // 10 SOL for 50 BONK
    assert_eq!(response.resolved[&tickers[1]].value, dec("0.2"));
    assert!(logs_contain("scaled price"));

    let (addresses, commitment) = mock.next_request().unwrap();
    assert_eq!(addresses, [key(1), key(2), key(3), key(4)]);
    assert_eq!(commitment, Commitment::Finalized);
}

#[tokio::test]
async fn account_count_mismatch_fails_every_ticker() {
    let mock = MockAccountsClient::new();
    mock.push_accounts(vec![token_account(1), token_account(1), token_account(1)]);
    let tickers = [ticker("SOL/USDC", (1, 9), (2, 6)), ticker("BONK/SOL", (3, 5), (4, 9))];

    let response = fetcher(&mock).fetch(&tickers).await;
    assert!(response.covers_exactly(&tickers));
    assert!(response.resolved.is_empty());
    assert_eq!(unresolved_codes(&response), [ErrorCode::ApiGeneral; 2]);
    let message = response.unresolved[&tickers[0]].error.message().to_string();
    assert!(message.contains("expected 4 accounts, got 3"), "{message}");
}

#[tokio::test]
async fn transport_error_fails_every_ticker() {
    let mock = MockAccountsClient::new();
    mock.push_error("connection refused");
    let tickers = [ticker("SOL/USDC", (1, 9), (2, 6)), ticker("BONK/SOL", (3, 5), (4, 9))];

    let response = fetcher(&mock).fetch(&tickers).await;
    assert!(response.covers_exactly(&tickers));
    assert_eq!(unresolved_codes(&response), [ErrorCode::ApiGeneral; 2]);
}

#[tokio::test]
async fn missing_base_account_is_isolated() {
    let mock = MockAccountsClient::new();
    mock.push_accounts(vec![None, token_account(1), token_account(4), token_account(2)]);
    let tickers = [ticker("SOL/USDC", (1, 9), (2, 6)), ticker("ETH/USDC", (3, 8), (4, 6))];

    let response = fetcher(&mock).fetch(&tickers).await;
    assert!(response.covers_exactly(&tickers));
    assert_eq!(response.unresolved[&tickers[0]].error.code(), ErrorCode::InvalidResponse);
    assert_eq!(response.resolved[&tickers[1]].value, dec("50"));
}

#[tokio::test]
async fn unknown_metadata_fails_every_ticker() {
    let mock = MockAccountsClient::new();
    let tickers = [
        ticker("SOL/USDC", (1, 9), (2, 6)),
        ProviderTicker::new("MYSTERY/USDC", 8, r#"{"pool":"nowhere"}"#),
    ];

    let response = fetcher(&mock).fetch(&tickers).await;
    assert!(response.covers_exactly(&tickers));
    assert_eq!(unresolved_codes(&response), [ErrorCode::UnknownPair; 2]);
    // configuration errors are caught before any network call
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn degenerate_and_foreign_accounts() {
    let mut foreign = token_account(7);
    if let Some(account) = foreign.as_mut() {
        account.owner = Pubkey::default();
    }
    let mock = MockAccountsClient::new();
    mock.push_accounts(vec![
        token_account(0),
        token_account(1),
        token_account(1),
        foreign,
        token_account(1),
        token_account(3),
    ]);
    let tickers = [
        ticker("ZERO/USDC", (1, 6), (2, 6)),
        ticker("FOREIGN/USDC", (3, 6), (4, 6)),
        ticker("OK/USDC", (5, 6), (6, 6)),
    ];

    let response = fetcher(&mock).fetch(&tickers).await;
    assert!(response.covers_exactly(&tickers));
    assert_eq!(response.unresolved[&tickers[0]].error.code(), ErrorCode::InvalidPrice);
    assert_eq!(response.unresolved[&tickers[1]].error.code(), ErrorCode::InvalidResponse);
    assert_eq!(response.resolved[&tickers[2]].value, dec("3"));
}

#[tokio::test]
async fn price_matches_balances_and_decimals() {
    let (base, quote) = (1_234_567u64, 987_654_321u64);
    let mock = MockAccountsClient::new();
    mock.push_accounts(vec![token_account(base), token_account(quote)]);
    let tickers = [ticker("ABC/XYZ", (1, 6), (2, 9))];

    let response = fetcher(&mock).fetch(&tickers).await;
    let price = &response.resolved[&tickers[0]].value;

    // (987.654321 XYZ) / (1.234567 ABC)
    let expected = dec("987.654321") / dec("1.234567");
    assert!((price - &expected).abs() < dec("1e-30"), "{price} != {expected}");
}

#[tokio::test]
async fn empty_request_is_empty_response() {
    let mock = MockAccountsClient::new();
    let response = fetcher(&mock).fetch(&[]).await;
    assert_eq!(response, PriceResponse::default());
    assert_eq!(mock.pending_requests(), 0);
}

/// Answers account reads from a fixed set of accounts, in any order
#[derive(Debug, Default)]
struct Ledger {
    accounts: HashMap<Pubkey, Account>,
    delay: Option<Duration>,
}

#[async_trait]
impl AccountsClient for Ledger {
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        _commitment: Commitment,
    ) -> Result<Vec<Option<Account>>, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(addresses.iter().map(|address| self.accounts.get(address).cloned()).collect())
    }
}

#[tokio::test(start_paused = true)]
async fn slow_read_times_out() {
    let ledger = Ledger { delay: Some(Duration::from_secs(10)), ..Default::default() };
    let fetcher = VaultPriceFetcher::new_with_client(config(), ledger).unwrap();
    let tickers = [ticker("SOL/USDC", (1, 9), (2, 6))];

    let response = fetcher.fetch(&tickers).await;
    assert_eq!(unresolved_codes(&response), [ErrorCode::ApiGeneral]);
    assert!(response.unresolved[&tickers[0]].error.message().contains("timed out"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_fetches_share_the_cache() {
    let mut ledger = Ledger::default();
    for byte in 1..=40u8 {
        if let Some(account) = token_account(u64::from(byte) * 1_000) {
            ledger.accounts.insert(key(byte), account);
        }
    }
    let fetcher = Arc::new(VaultPriceFetcher::new_with_client(config(), ledger).unwrap());

    // 20 tickers split into 5 disjoint requests, each ticker pairing key(2i+1) with key(2i+2)
    let tickers = (0..20u8)
        .map(|i| ticker(&format!("T{i}/USD"), (2 * i + 1, 6), (2 * i + 2, 6)))
        .collect::<Vec<_>>();
    let requests = tickers.chunks(4).map(|chunk| {
        let fetcher = Arc::clone(&fetcher);
        let chunk = chunk.to_vec();
        tokio::spawn(async move {
            let response = fetcher.fetch(&chunk).await;
            (chunk, response)
        })
    });

    for handle in join_all(requests).await {
        let (chunk, response) = handle.unwrap();
        assert!(response.covers_exactly(&chunk));
        for ticker in &chunk {
            assert!(response.resolved.contains_key(ticker), "{ticker} unresolved");
        }
    }
    assert_eq!(fetcher.metadata().len(), 20);

    let first = fetcher.metadata().get("T0/USD").unwrap();
    assert_eq!((first.base.address, first.quote.address), (key(1), key(2)));
}
