use chainfeed_providers::{JsonRpcError, MockClient, MockResponse};
use serde_json::json;

mod quorum;

mod solana;

/// A mock endpoint answering one batch with `responses`, where `None` marks
/// an element answered with a JSON-RPC error.
pub fn endpoint_with(responses: &[Option<&str>]) -> MockClient {
    let mock = MockClient::new();
    mock.push_batch(
        responses
            .iter()
            .map(|response| match response {
                Some(value) => MockResponse::Value(json!(value)),
                None => MockResponse::Error(JsonRpcError::new(-32000, "height req failed")),
            })
            .collect(),
    );
    mock
}
