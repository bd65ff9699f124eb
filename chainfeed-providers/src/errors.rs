use std::{error::Error, fmt::Debug, time::Duration};
use thiserror::Error;

use crate::JsonRpcError;

/// An `RpcError` is an abstraction over error types returned by a
/// [`crate::BatchClient`].
///
/// All clients can return [`JsonRpcError`] responses, as
/// well as serde deserialization errors. However, because client errors are
/// typically type-erased via the [`ProviderError`], the error info can be
/// difficult to access. This trait provides convenient access to the
/// underlying error types.
pub trait RpcError: Error + Debug + Send + Sync {
    /// Access an underlying JSON-RPC error (if any)
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// Returns `true` if the underlying error is a JSON-RPC error response
    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    /// Access an underlying `serde_json` error (if any)
    ///
    /// ### Implementor's Note
    ///
    /// When writing a stacked [`crate::BatchClient`] abstraction (e.g. the
    /// quorum client), be sure to account for `serde_json` errors at your
    /// layer, as well as at lower layers.
    fn as_serde_error(&self) -> Option<&serde_json::Error>;

    /// Returns `true` if the underlying error is a serde_json (de)serialization
    /// error.
    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }
}

#[derive(Debug, Error)]
/// An error thrown when making a call to an endpoint
pub enum ProviderError {
    /// An internal error in the RPC client
    #[error("{0}")]
    JsonRpcClientError(Box<dyn RpcError + Send + Sync>),

    /// Error in underlying lib `serde_json`
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Error in underlying lib `base64`
    #[error(transparent)]
    Base64Error(#[from] base64::DecodeError),

    /// Error in underlying lib `reqwest`
    #[error(transparent)]
    HTTPError(#[from] reqwest::Error),

    /// The request did not complete in time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Custom error from unknown source
    #[error("custom error: {0}")]
    CustomError(String),
}

impl RpcError for ProviderError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let ProviderError::JsonRpcClientError(err) = self {
            err.as_error_response()
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ProviderError::JsonRpcClientError(e) => e.as_serde_error(),
            ProviderError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

impl RpcError for JsonRpcError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        Some(self)
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        None
    }
}
