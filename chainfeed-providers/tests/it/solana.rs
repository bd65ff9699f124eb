use chainfeed_core::types::{Pubkey, TokenAccount, TOKEN_PROGRAM_ID};
use chainfeed_providers::{
    AccountsClient, Commitment, HeightProbe, MockClient, MockResponse, QuorumClient, SolanaRpc,
};
use base64::{engine::general_purpose, Engine};
use serde_json::json;

fn token_account_json(amount: u64) -> serde_json::Value {
    let account = TokenAccount { amount, ..Default::default() };
    json!({
        "data": [general_purpose::STANDARD.encode(account.pack()), "base64"],
        "executable": false,
        "lamports": 2039280,
        "owner": TOKEN_PROGRAM_ID,
        "rentEpoch": 18446744073709551615u64,
        "space": TokenAccount::LEN
    })
}

#[tokio::test]
async fn token_balances_over_quorum() {
    let lagging = MockClient::new();
    lagging.push_batch(vec![
        MockResponse::Value(json!({
            "context": { "slot": 100 },
            "value": [token_account_json(1), token_account_json(1)]
        })),
        MockResponse::Value(json!(100)),
    ]);
    let fresh = MockClient::new();
    fresh.push_batch(vec![
        MockResponse::Value(json!({
            "context": { "slot": 101 },
            "value": [token_account_json(5_000), null]
        })),
        MockResponse::Value(json!("101")),
    ]);

    let quorum = QuorumClient::builder()
        .add_client("lagging", lagging.clone())
        .add_client("fresh", fresh)
        .probe(HeightProbe::SolanaSlot(Commitment::Finalized))
        .build();
    let rpc = SolanaRpc::new(quorum);

    let keys = [Pubkey::new_from_array([1; 32]), Pubkey::new_from_array([2; 32])];
    let accounts = rpc.get_multiple_accounts(&keys, Commitment::Finalized).await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts[1].is_none());

    let base = accounts[0].as_ref().unwrap();
    assert_eq!(base.owner.to_string(), TOKEN_PROGRAM_ID);
    assert_eq!(TokenAccount::unpack(&base.data).unwrap().amount, 5_000);

    let sent = lagging.next_request().unwrap();
    assert_eq!(sent[0].method, "getMultipleAccounts");
    assert_eq!(sent[0].params[1], json!({ "commitment": "finalized", "encoding": "base64" }));
    assert_eq!(sent[1].method, "getSlot");
}
