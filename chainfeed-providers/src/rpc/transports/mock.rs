use crate::{BatchClient, BatchElement, JsonRpcError, ProviderError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use thiserror::Error;

/// Helper response type for `MockClient`, allowing custom JSON-RPC errors to be provided.
/// `Value` for successful elements, `Error` for per-element JSON-RPC errors.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Successful response with a `serde_json::Value`.
    Value(Value),

    /// Error response with a `JsonRpcError`.
    Error(JsonRpcError),
}

/// What the mock answers to the next batch
#[derive(Clone, Debug)]
enum MockBatch {
    Elements(Vec<MockResponse>),
    Failure(String),
}

#[derive(Clone, Debug, Default)]
/// Mock transport used in test environments.
///
/// Every call to [`BatchClient::batch_request`] records the batch it was given
/// and answers with the oldest scripted batch, so answers are consumed in the
/// order they were pushed.
pub struct MockClient {
    requests: Arc<Mutex<VecDeque<Vec<BatchElement>>>>,
    responses: Arc<Mutex<VecDeque<MockBatch>>>,
    delay: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl BatchClient for MockClient {
    type Error = MockError;

    async fn batch_request(&self, batch: &mut [BatchElement]) -> Result<(), MockError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        lock(&self.requests).push_back(batch.to_vec());
        let next = lock(&self.responses).pop_front().ok_or(MockError::EmptyResponses)?;
        let responses = match next {
            MockBatch::Elements(responses) => responses,
            MockBatch::Failure(reason) => return Err(MockError::TransportFailure(reason)),
        };
        if responses.len() != batch.len() {
            return Err(MockError::LengthMismatch { expected: batch.len(), got: responses.len() })
        }

        for (elem, response) in batch.iter_mut().zip(responses) {
            match response {
                MockResponse::Value(value) => {
                    elem.result = Some(value);
                    elem.error = None;
                }
                MockResponse::Error(error) => {
                    elem.result = None;
                    elem.error = Some(error);
                }
            }
        }
        Ok(())
    }
}

impl MockClient {
    /// Instantiates a mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` before answering each batch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues the answer for one batch, one response per element
    pub fn push_batch(&self, responses: Vec<MockResponse>) {
        lock(&self.responses).push_back(MockBatch::Elements(responses));
    }

    /// Queues a batch answered entirely with successful values
    pub fn push_values<T: Serialize>(&self, values: &[T]) -> Result<(), MockError> {
        let responses = values
            .iter()
            .map(|v| serde_json::to_value(v).map(MockResponse::Value))
            .collect::<Result<Vec<_>, _>>()?;
        self.push_batch(responses);
        Ok(())
    }

    /// Queues a failure of the whole batch, as if the endpoint were unreachable
    pub fn push_failure(&self, reason: impl Into<String>) {
        lock(&self.responses).push_back(MockBatch::Failure(reason.into()));
    }

    /// Pops the oldest batch this mock was asked to send
    pub fn next_request(&self) -> Result<Vec<BatchElement>, MockError> {
        lock(&self.requests).pop_front().ok_or(MockError::EmptyRequests)
    }

    /// Checks that the oldest recorded batch consisted of `(method, params)` in order
    pub fn assert_batch(&self, expected: &[(&str, Value)]) -> Result<(), MockError> {
        let batch = self.next_request()?;
        let sent = batch.iter().map(|e| (e.method.as_str(), e.params.clone())).collect::<Vec<_>>();
        assert_eq!(sent, expected);
        Ok(())
    }
}

#[derive(Error, Debug)]
/// Errors for the `MockClient`
pub enum MockError {
    /// (De)Serialization error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Empty requests array
    #[error("empty requests array, please send some requests")]
    EmptyRequests,

    /// Empty responses array
    #[error("empty responses array, please push some responses")]
    EmptyResponses,

    /// The scripted answer does not match the batch size
    #[error("scripted {got} responses for a batch of {expected}")]
    LengthMismatch { expected: usize, got: usize },

    /// Scripted failure of the whole batch
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl crate::RpcError for MockError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        None
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            MockError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MockError> for ProviderError {
    fn from(src: MockError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}
