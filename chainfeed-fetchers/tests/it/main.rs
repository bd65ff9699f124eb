use chainfeed_core::{
    config::{Endpoint, ProviderConfig},
    types::{AccountState, ProviderTicker, Pubkey, TokenAccount, TOKEN_PROGRAM_ID},
};
use chainfeed_fetchers::vault::NAME;
use chainfeed_providers::Account;
use serde_json::json;
use std::time::Duration;

mod vault;

pub fn config() -> ProviderConfig {
    ProviderConfig {
        name: NAME.to_string(),
        enabled: true,
        timeout: Duration::from_millis(500),
        interval: Duration::from_secs(1),
        max_queries: 1,
        endpoints: vec![Endpoint::new("https://api.mainnet-beta.solana.com")],
    }
}

pub fn key(byte: u8) -> Pubkey {
    Pubkey::new_from_array([byte; 32])
}

/// A ticker whose base vault is `key(base)` and quote vault is `key(quote)`
pub fn ticker(name: &str, base: (u8, u8), quote: (u8, u8)) -> ProviderTicker {
    let metadata = json!({
        "base_token_vault": {
            "token_vault_address": key(base.0).to_string(),
            "token_decimals": base.1
        },
        "quote_token_vault": {
            "token_vault_address": key(quote.0).to_string(),
            "token_decimals": quote.1
        }
    });
    ProviderTicker::new(name, 8, metadata.to_string())
}

/// An initialized token account holding `amount`
pub fn token_account(amount: u64) -> Option<Account> {
    let token = TokenAccount { amount, state: AccountState::Initialized, ..Default::default() };
    Some(Account {
        lamports: 2_039_280,
        owner: TOKEN_PROGRAM_ID.parse().unwrap(),
        data: token.pack(),
        executable: false,
        rent_epoch: u64::MAX,
    })
}
