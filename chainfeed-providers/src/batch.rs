use crate::{JsonRpcError, ProviderError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One request of a batch together with the slots its answer is written to.
///
/// The request half (`method`, `params`) is set by the caller; a
/// [`crate::BatchClient`] fills exactly one of `result` or `error`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchElement {
    pub method: String,
    pub params: Value,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

impl BatchElement {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self { method: method.into(), params, result: None, error: None }
    }

    /// Deserializes the result slot, surfacing a per-element error first.
    pub fn decode<R: DeserializeOwned>(&self) -> Result<R, ProviderError> {
        if let Some(err) = &self.error {
            return Err(ProviderError::JsonRpcClientError(Box::new(err.clone())))
        }
        let result = self.result.as_ref().ok_or_else(|| {
            ProviderError::CustomError(format!("no result for request {}", self.method))
        })?;
        Ok(R::deserialize(result)?)
    }

    /// Clears both answer slots, keeping the request.
    pub fn reset(&mut self) {
        self.result = None;
        self.error = None;
    }
}
