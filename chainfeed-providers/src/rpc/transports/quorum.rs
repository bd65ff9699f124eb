use crate::{
    errors::ProviderError, solana::Commitment, BatchClient, BatchElement, Http, HttpBuildError,
    JsonRpcError,
};
use async_trait::async_trait;
use chainfeed_core::{config::Endpoint, utils::parse_hex_height};
use futures_util::future::join_all;
use serde_json::{json, Value};
use std::{fmt::Debug, time::Duration};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

/// A client that sends every batch to all of its endpoints and keeps the
/// answers of the freshest one.
///
/// Each outgoing batch is extended with a height probe (by default
/// `eth_blockNumber`). Once every endpoint has answered, the endpoint that
/// reported the greatest height wins and its results are copied into the
/// caller's batch. Endpoints that fail, or whose probe cannot be decoded, are
/// skipped; the call only fails when no endpoint is usable. On equal heights
/// the endpoint added first wins.
///
/// # Example
///
/// Create a `QuorumClient` over a homogeneous set of `Http` endpoints.
///
/// ```
/// use chainfeed_providers::{Http, QuorumClient};
/// use std::{str::FromStr, time::Duration};
///
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = QuorumClient::builder()
///     .add_client("alpha", Http::from_str("http://localhost:8545")?)
///     .add_client("beta", Http::from_str("http://localhost:8546")?)
///     .timeout(Duration::from_secs(2))
///     .build();
/// assert_eq!(client.clients().len(), 2);
/// # Ok(())
/// # }
/// ```
///
/// # Example
///
/// Create a `QuorumClient` consisting of different client types
///
/// ```
/// use chainfeed_providers::{Http, MockClient, QuorumClient};
/// use std::str::FromStr;
///
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let client: QuorumClient = QuorumClient::dyn_rpc()
///     .add_client("http", Box::new(Http::from_str("http://localhost:8545")?))
///     .add_client("mock", Box::new(MockClient::new()))
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QuorumClient<T = Box<dyn BatchClientWrapper>> {
    /// All the endpoints this client fans out to, in configuration order
    clients: Vec<LabeledClient<T>>,
    /// How the chain height of an endpoint is queried
    probe: HeightProbe,
    /// Upper bound for a single endpoint's answer
    timeout: Option<Duration>,
}

impl QuorumClient<Box<dyn BatchClientWrapper>> {
    /// Create a `QuorumClient` for different `BatchClient` types
    pub fn dyn_rpc() -> QuorumClientBuilder<Box<dyn BatchClientWrapper>> {
        Self::builder()
    }
}

impl QuorumClient<Http> {
    /// Builds one [`Http`] client per configured endpoint, labelled by its url.
    pub fn from_endpoints(
        endpoints: &[Endpoint],
        probe: HeightProbe,
    ) -> Result<Self, HttpBuildError> {
        let mut builder = Self::builder().probe(probe);
        for endpoint in endpoints {
            builder = builder.add_client(endpoint.url.clone(), Http::from_endpoint(endpoint)?);
        }
        Ok(builder.build())
    }
}

impl<T> QuorumClient<T> {
    /// Convenience method for creating a `QuorumClientBuilder` with same `BatchClient` types
    pub fn builder() -> QuorumClientBuilder<T> {
        QuorumClientBuilder::default()
    }

    /// Return a reference to the labelled clients
    pub fn clients(&self) -> &[LabeledClient<T>] {
        &self.clients
    }

    pub fn probe(&self) -> HeightProbe {
        self.probe
    }

    /// Replace how endpoint heights are queried
    pub fn with_probe(mut self, probe: HeightProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Upper bound for a single endpoint's answer, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Treat an endpoint that has not answered within `timeout` as failed
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a client to the set
    pub fn add_client(&mut self, label: impl Into<String>, client: T) {
        self.clients.push(LabeledClient::new(label, client));
    }
}

#[derive(Debug, Clone)]
pub struct QuorumClientBuilder<T> {
    clients: Vec<LabeledClient<T>>,
    probe: HeightProbe,
    timeout: Option<Duration>,
}

impl<T> Default for QuorumClientBuilder<T> {
    fn default() -> Self {
        Self { clients: Vec::new(), probe: HeightProbe::default(), timeout: None }
    }
}

impl<T> QuorumClientBuilder<T> {
    pub fn add_client(mut self, label: impl Into<String>, client: T) -> Self {
        self.clients.push(LabeledClient::new(label, client));
        self
    }

    pub fn add_clients(mut self, clients: impl IntoIterator<Item = LabeledClient<T>>) -> Self {
        self.clients.extend(clients);
        self
    }

    /// Set how endpoint heights are queried
    pub fn probe(mut self, probe: HeightProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Treat an endpoint that has not answered within `timeout` as failed
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> QuorumClient<T> {
        QuorumClient { clients: self.clients, probe: self.probe, timeout: self.timeout }
    }
}

/// A client and the name it is reported under in logs and errors
#[derive(Debug, Clone)]
pub struct LabeledClient<T> {
    label: String,
    inner: T,
}

impl<T> LabeledClient<T> {
    pub fn new(label: impl Into<String>, inner: T) -> Self {
        Self { label: label.into(), inner }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

/// The request appended to every batch to learn how fresh an endpoint is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeightProbe {
    /// `eth_blockNumber`, answered with a `0x` prefixed hex quantity
    #[default]
    EthBlockNumber,
    /// `getSlot` at the given commitment, answered with an integer
    SolanaSlot(Commitment),
}

impl HeightProbe {
    /// The probe element appended to an outgoing batch
    pub fn request(&self) -> BatchElement {
        match self {
            HeightProbe::EthBlockNumber => BatchElement::new("eth_blockNumber", json!([])),
            HeightProbe::SolanaSlot(commitment) => {
                BatchElement::new("getSlot", json!([{ "commitment": commitment }]))
            }
        }
    }

    /// Reads the height from an answered probe element
    fn decode(&self, endpoint: &str, probe: &BatchElement) -> Result<u64, EndpointFailure> {
        if let Some(error) = &probe.error {
            return Err(EndpointFailure::ProbeFailed {
                endpoint: endpoint.to_string(),
                error: error.clone(),
            })
        }
        let result = probe.result.as_ref().unwrap_or(&Value::Null);
        match self {
            HeightProbe::EthBlockNumber => result
                .as_str()
                .and_then(|s| parse_hex_height(s).ok())
                .ok_or_else(|| EndpointFailure::HexHeight {
                    endpoint: endpoint.to_string(),
                    value: result.to_string(),
                }),
            HeightProbe::SolanaSlot(_) => {
                let slot = match result {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.parse().ok(),
                    _ => None,
                };
                slot.ok_or_else(|| EndpointFailure::SlotHeight {
                    endpoint: endpoint.to_string(),
                    value: result.to_string(),
                })
            }
        }
    }
}

impl<T: BatchClientWrapper> QuorumClient<T> {
    /// Sends `elements` (the caller's batch plus the probe) to one endpoint
    /// and returns its decoded height alongside the caller's part of the batch.
    async fn query_endpoint(
        &self,
        client: &LabeledClient<T>,
        mut elements: Vec<BatchElement>,
    ) -> Result<(u64, Vec<BatchElement>), EndpointFailure> {
        let endpoint = client.label.as_str();
        let request = client.inner.batch_request(&mut elements);
        let res = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, request)
                .await
                .unwrap_or(Err(ProviderError::Timeout(timeout))),
            None => request.await,
        };
        res.map_err(|source| EndpointFailure::RequestFailed {
            endpoint: endpoint.to_string(),
            source,
        })?;

        // the probe is always the last element of a non-empty batch
        let probe_idx = elements.len() - 1;
        let height = self.probe.decode(endpoint, &elements[probe_idx])?;
        elements.truncate(probe_idx);
        trace!(endpoint, height, "endpoint answered");
        Ok((height, elements))
    }
}

#[async_trait]
impl<C> BatchClient for QuorumClient<C>
where
    C: BatchClientWrapper,
{
    type Error = QuorumError;

    #[instrument(skip_all, fields(len = batch.len(), endpoints = self.clients.len()))]
    async fn batch_request(&self, batch: &mut [BatchElement]) -> Result<(), QuorumError> {
        if self.clients.is_empty() || batch.is_empty() {
            return Ok(())
        }

        let mut augmented = batch.to_vec();
        augmented.push(self.probe.request());

        // every endpoint gets its own copy of the result slots
        let outcomes = join_all(
            self.clients.iter().map(|client| self.query_endpoint(client, augmented.clone())),
        )
        .await;

        let mut selected: Option<(usize, u64, Vec<BatchElement>)> = None;
        let mut failures = Vec::new();
        for (idx, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok((height, elements)) => {
                    // strictly greater, so the first endpoint wins a tie
                    if selected.as_ref().map_or(true, |(_, best, _)| height > *best) {
                        selected = Some((idx, height, elements));
                    }
                }
                Err(failure) => {
                    debug!(%failure, "skipping endpoint");
                    failures.push(failure);
                }
            }
        }

        match selected {
            Some((idx, height, elements)) => {
                debug!(endpoint = %self.clients[idx].label, height, "selected endpoint");
                batch.clone_from_slice(&elements);
                Ok(())
            }
            None => {
                warn!(failed = failures.len(), "no endpoint returned a usable response");
                Err(QuorumError::NoUsableEndpoint { failures })
            }
        }
    }
}

/// Why a single endpoint's answer was discarded
#[derive(Error, Debug)]
pub enum EndpointFailure {
    /// The batch could not be delivered or was rejected as a whole
    #[error("endpoint request failed ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: ProviderError,
    },
    /// The height probe itself carried an error
    #[error("endpoint request failed ({endpoint}): height probe returned {error}")]
    ProbeFailed { endpoint: String, error: JsonRpcError },
    #[error("could not decode hex eth height ({endpoint}): {value}")]
    HexHeight { endpoint: String, value: String },
    #[error("could not decode slot height ({endpoint}): {value}")]
    SlotHeight { endpoint: String, value: String },
}

impl EndpointFailure {
    pub fn endpoint(&self) -> &str {
        match self {
            EndpointFailure::RequestFailed { endpoint, .. } |
            EndpointFailure::ProbeFailed { endpoint, .. } |
            EndpointFailure::HexHeight { endpoint, .. } |
            EndpointFailure::SlotHeight { endpoint, .. } => endpoint,
        }
    }
}

fn join_failures(failures: &[EndpointFailure]) -> String {
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Error, Debug)]
/// Error returned when no endpoint of a `QuorumClient` could be used
pub enum QuorumError {
    #[error("no endpoint returned a usable response: [{}]", join_failures(.failures))]
    NoUsableEndpoint {
        /// Why each endpoint was discarded, in configuration order
        failures: Vec<EndpointFailure>,
    },
}

impl crate::RpcError for QuorumError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        None
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        None
    }
}

impl From<QuorumError> for ProviderError {
    fn from(src: QuorumError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}

/// Wrapper trait for [`crate::BatchClient`] that erases generics and is
/// object-safe. This trait is not intended for outside implementation
#[async_trait]
pub trait BatchClientWrapper: Send + Sync + Debug {
    /// Send a batch, as [`crate::BatchClient`]
    async fn batch_request(&self, batch: &mut [BatchElement]) -> Result<(), ProviderError>;
}

#[async_trait]
impl<C: BatchClient> BatchClientWrapper for C {
    async fn batch_request(&self, batch: &mut [BatchElement]) -> Result<(), ProviderError> {
        BatchClient::batch_request(self, batch).await.map_err(C::Error::into)
    }
}

#[async_trait]
impl BatchClientWrapper for Box<dyn BatchClientWrapper> {
    async fn batch_request(&self, batch: &mut [BatchElement]) -> Result<(), ProviderError> {
        self.as_ref().batch_request(batch).await
    }
}
