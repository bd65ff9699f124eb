use crate::endpoint_with;
use chainfeed_core::config::Endpoint;
use chainfeed_providers::{
    BatchClient, BatchElement, HeightProbe, MockClient, QuorumClient, QuorumError,
};
use serde_json::json;
use std::time::Duration;
use tracing_test::traced_test;

#[tokio::test]
async fn no_endpoints_is_a_noop() {
    let client = QuorumClient::<MockClient>::builder().build();
    let mut batch = [BatchElement::default()];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0], BatchElement::default());
}

#[tokio::test]
async fn empty_batch_is_a_noop() {
    // nothing is scripted, so any call to the endpoint would fail
    let mock = MockClient::new();
    let client = QuorumClient::builder().add_client("idle", mock.clone()).build();
    client.batch_request(&mut []).await.unwrap();
    assert!(mock.next_request().is_err());
}

#[tokio::test]
async fn single_endpoint_failed_height_request() {
    let client =
        QuorumClient::builder().add_client("one", endpoint_with(&[Some(""), None])).build();
    let err = client.batch_request(&mut [BatchElement::default()]).await.unwrap_err();
    assert!(err.to_string().contains("endpoint request failed"), "{err}");
}

#[tokio::test]
async fn single_endpoint_undecodable_height() {
    let client = QuorumClient::builder()
        .add_client("one", endpoint_with(&[Some(""), Some("zzzzzz")]))
        .build();
    let err = client.batch_request(&mut [BatchElement::default()]).await.unwrap_err();
    assert!(err.to_string().contains("could not decode hex eth height"), "{err}");
}

#[tokio::test]
async fn single_endpoint_success() {
    let client = QuorumClient::builder()
        .add_client("foobar", endpoint_with(&[Some("some value"), Some("0x12c781c")]))
        .build();
    let mut batch = [BatchElement::default()];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0].decode::<String>().unwrap(), "some value");
    assert!(batch[0].error.is_none());
}

#[tokio::test]
#[traced_test]
async fn two_endpoints_one_failed_height_request() {
    let client = QuorumClient::builder()
        .add_client("foobar", endpoint_with(&[Some(""), None]))
        .add_client("baz", endpoint_with(&[Some("some value"), Some("0x12c781c")]))
        .build();
    let mut batch = [BatchElement::default()];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0].decode::<String>().unwrap(), "some value");
    assert!(logs_contain("skipping endpoint"));
}

#[tokio::test]
async fn two_endpoints_different_heights() {
    let client = QuorumClient::builder()
        .add_client("foobar", endpoint_with(&[Some("value1"), Some("0x12c781b")]))
        .add_client("baz", endpoint_with(&[Some("value2"), Some("0x12c781c")]))
        .build();
    let mut batch = [BatchElement::default()];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0].decode::<String>().unwrap(), "value2");
}

#[tokio::test]
async fn selection_ignores_configuration_order() {
    let client = QuorumClient::builder()
        .add_client("baz", endpoint_with(&[Some("value2"), Some("0x12c781c")]))
        .add_client("foobar", endpoint_with(&[Some("value1"), Some("0x12c781b")]))
        .build();
    let mut batch = [BatchElement::default()];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0].decode::<String>().unwrap(), "value2");
}

#[tokio::test]
async fn equal_heights_keep_first_endpoint() {
    let client = QuorumClient::builder()
        .add_client("foobar", endpoint_with(&[Some("value1"), Some("0x12c781c")]))
        .add_client("baz", endpoint_with(&[Some("value2"), Some("0x12c781c")]))
        .build();
    let mut batch = [BatchElement::default()];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0].decode::<String>().unwrap(), "value1");
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn endpoint_past_the_timeout_is_skipped() {
    let hung = endpoint_with(&[Some("stale"), Some("0x999")]).with_delay(Duration::from_secs(3));
    let client = QuorumClient::builder()
        .add_client("hung", hung)
        .add_client("healthy", endpoint_with(&[Some("fresh"), Some("0x1")]))
        .timeout(Duration::from_millis(500))
        .build();
    let mut batch = [BatchElement::default()];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0].decode::<String>().unwrap(), "fresh");
    assert!(logs_contain("timed out"));

    // with every endpoint hung the timeout surfaces per endpoint
    let hung = endpoint_with(&[Some("a"), Some("0x1")]).with_delay(Duration::from_secs(3));
    let client = QuorumClient::builder()
        .add_client("hung", hung)
        .build()
        .with_timeout(Duration::from_millis(500));
    let err = client.batch_request(&mut [BatchElement::default()]).await.unwrap_err();
    assert!(err.to_string().contains("endpoint request failed (hung)"));
}

#[tokio::test]
async fn every_endpoint_gets_its_own_copy() {
    let first = endpoint_with(&[Some("a"), Some("b"), Some("0x1")]);
    let second = endpoint_with(&[Some("c"), Some("d"), Some("0x2")]);
    let client = QuorumClient::builder()
        .add_client("first", first.clone())
        .add_client("second", second.clone())
        .build();

    let mut batch = [
        BatchElement::new("eth_getBalance", json!(["0x0", "latest"])),
        BatchElement::new("eth_chainId", json!([])),
    ];
    client.batch_request(&mut batch).await.unwrap();
    assert_eq!(batch[0].decode::<String>().unwrap(), "c");
    assert_eq!(batch[1].decode::<String>().unwrap(), "d");

    for mock in [first, second] {
        let sent = mock.next_request().unwrap();
        let methods = sent.iter().map(|e| e.method.as_str()).collect::<Vec<_>>();
        assert_eq!(methods, ["eth_getBalance", "eth_chainId", "eth_blockNumber"]);
        assert!(sent.iter().all(|e| e.result.is_none() && e.error.is_none()));
    }
}

#[tokio::test]
async fn summarized_error_lists_each_endpoint() {
    let down = MockClient::new();
    down.push_failure("connection refused");
    let client = QuorumClient::builder()
        .add_client("down", down)
        .add_client("garbled", endpoint_with(&[Some(""), Some("12c781c")]))
        .build();

    let err = client.batch_request(&mut [BatchElement::default()]).await.unwrap_err();
    let QuorumError::NoUsableEndpoint { failures } = &err;
    let endpoints = failures.iter().map(|f| f.endpoint()).collect::<Vec<_>>();
    assert_eq!(endpoints, ["down", "garbled"]);
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn from_endpoints_labels_by_url() {
    let endpoints = [
        Endpoint::new("https://a.example.com"),
        Endpoint::new("https://b.example.com").with_authentication("x-api-key", "secret"),
    ];
    let client = QuorumClient::from_endpoints(&endpoints, HeightProbe::EthBlockNumber).unwrap();
    let labels = client.clients().iter().map(|c| c.label()).collect::<Vec<_>>();
    assert_eq!(labels, ["https://a.example.com", "https://b.example.com"]);
    assert_eq!(client.probe(), HeightProbe::EthBlockNumber);
    assert_eq!(client.timeout(), None);

    assert!(QuorumClient::from_endpoints(&[Endpoint::new("::")], HeightProbe::default()).is_err());
}
