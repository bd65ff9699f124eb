// Code adapted from: https://github.com/althea-net/guac_rs/tree/master/web3/src/jsonrpc

use super::common::{Authorization, JsonRpcError, Request, Response};
use crate::{errors::ProviderError, BatchClient, BatchElement};
use async_trait::async_trait;
use chainfeed_core::config::Endpoint;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue},
    Client, Error as ReqwestError,
};
use std::{
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;
use tracing::trace;
use url::Url;

/// A low-level JSON-RPC batch client over HTTP.
///
/// # Example
///
/// ```no_run
/// use chainfeed_providers::{BatchClient, BatchElement, Http};
/// use std::str::FromStr;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Http::from_str("http://localhost:8545")?;
/// let mut batch = [BatchElement::new("eth_blockNumber", serde_json::json!([]))];
/// provider.batch_request(&mut batch).await?;
/// let block_number: String = batch[0].decode()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Provider {
    id: AtomicU64,
    client: Client,
    url: Url,
}

#[derive(Error, Debug)]
/// Error thrown when sending an HTTP request
pub enum ClientError {
    /// Thrown if the request failed
    #[error(transparent)]
    ReqwestError(#[from] ReqwestError),
    #[error(transparent)]
    /// Thrown if the endpoint rejected the batch as a whole
    JsonRpcError(#[from] JsonRpcError),

    #[error("Deserialization Error: {err}. Response: {text}")]
    /// Serde JSON Error
    SerdeJson {
        /// Underlying error
        err: serde_json::Error,
        /// The contents of the HTTP response that could not be deserialized
        text: String,
    },
}

impl From<ClientError> for ProviderError {
    fn from(src: ClientError) -> Self {
        match src {
            ClientError::ReqwestError(err) => ProviderError::HTTPError(err),
            _ => ProviderError::JsonRpcClientError(Box::new(src)),
        }
    }
}

impl crate::RpcError for ClientError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let ClientError::JsonRpcError(err) = self {
            Some(err)
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ClientError::SerdeJson { err, .. } => Some(err),
            _ => None,
        }
    }
}

#[async_trait]
impl BatchClient for Provider {
    type Error = ClientError;

    async fn batch_request(&self, batch: &mut [BatchElement]) -> Result<(), ClientError> {
        if batch.is_empty() {
            return Ok(())
        }

        // ids are allocated as one contiguous range so a reply maps back by offset
        let first_id = self.id.fetch_add(batch.len() as u64, Ordering::SeqCst);
        let payload = batch
            .iter()
            .enumerate()
            .map(|(idx, elem)| Request::new(first_id + idx as u64, &elem.method, &elem.params))
            .collect::<Vec<_>>();

        trace!(url = %self.url, len = batch.len(), "sending batch");
        let res = self.client.post(self.url.as_ref()).json(&payload).send().await?;
        let body = res.bytes().await?;

        let responses: Vec<Response<'_>> = match serde_json::from_slice(&body) {
            Ok(responses) => responses,
            Err(err) => {
                // some nodes answer a rejected batch with a single error object
                if let Ok(Response::Error { error, .. }) = serde_json::from_slice(&body) {
                    return Err(error.into())
                }
                return Err(ClientError::SerdeJson {
                    err,
                    text: String::from_utf8_lossy(&body).to_string(),
                })
            }
        };

        batch.iter_mut().for_each(BatchElement::reset);
        for response in responses {
            let Some(idx) = response
                .id()
                .and_then(|id| id.checked_sub(first_id))
                .and_then(|offset| usize::try_from(offset).ok())
                .filter(|idx| *idx < batch.len())
            else {
                trace!(?response, "dropping response with unknown id");
                continue
            };

            let elem = &mut batch[idx];
            match response {
                Response::Success { result, .. } => {
                    match serde_json::from_str(result.get()) {
                        Ok(value) => elem.result = Some(value),
                        Err(err) => {
                            return Err(ClientError::SerdeJson { err, text: result.to_string() })
                        }
                    }
                }
                Response::Error { error, .. } => elem.error = Some(error),
            }
        }

        for elem in batch.iter_mut().filter(|e| e.result.is_none() && e.error.is_none()) {
            elem.error =
                Some(JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, "missing response in batch"));
        }

        Ok(())
    }
}

impl Provider {
    /// Initializes a new HTTP Client
    ///
    /// # Example
    ///
    /// ```
    /// use chainfeed_providers::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost:8545").unwrap();
    /// let provider = Http::new(url);
    /// ```
    pub fn new(url: impl Into<Url>) -> Self {
        Self::new_with_client(url, Client::new())
    }

    /// The Url to which requests are made
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Initializes a new HTTP Client with authentication
    ///
    /// # Example
    ///
    /// ```
    /// use chainfeed_providers::{Authorization, Http};
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost:8545").unwrap();
    /// let provider = Http::new_with_auth(url, Authorization::basic("admin", "good_password"));
    /// ```
    pub fn new_with_auth(url: impl Into<Url>, auth: Authorization) -> Result<Self, HttpBuildError> {
        let mut auth_value = HeaderValue::from_str(&auth.to_string())?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self::new_with_client(url, client))
    }

    /// Initializes a new HTTP Client sending `key` in the `header` of every request
    pub fn new_with_api_key(
        url: impl Into<Url>,
        header: &str,
        key: &str,
    ) -> Result<Self, HttpBuildError> {
        let name = HeaderName::from_bytes(header.as_bytes())?;
        let mut value = HeaderValue::from_str(key)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, value);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self::new_with_client(url, client))
    }

    /// Builds a client for a configured endpoint, applying its authentication
    pub fn from_endpoint(endpoint: &Endpoint) -> Result<Self, HttpBuildError> {
        let url = Url::parse(&endpoint.url)?;
        match &endpoint.authentication {
            Some(auth) => Self::new_with_api_key(url, &auth.api_key_header, &auth.api_key),
            None => Ok(Self::new(url)),
        }
    }

    /// Allows to customize the provider by providing your own http client
    pub fn new_with_client(url: impl Into<Url>, client: reqwest::Client) -> Self {
        Self { id: AtomicU64::new(1), client, url: url.into() }
    }
}

impl FromStr for Provider {
    type Err = url::ParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(src)?;
        Ok(Provider::new(url))
    }
}

impl Clone for Provider {
    fn clone(&self) -> Self {
        Self { id: AtomicU64::new(1), client: self.client.clone(), url: self.url.clone() }
    }
}

#[derive(Error, Debug)]
/// Error thrown when building Http clients
pub enum HttpBuildError {
    /// Thrown if the endpoint url is invalid
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// Thrown if unable to build headers for client
    #[error(transparent)]
    InvalidHeader(#[from] InvalidHeaderValue),

    /// Thrown if the configured header name is invalid
    #[error(transparent)]
    InvalidHeaderName(#[from] InvalidHeaderName),

    /// Thrown if unable to build client
    #[error(transparent)]
    ClientBuild(#[from] reqwest::Error),
}
