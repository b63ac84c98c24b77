//! The HTTP seam. The interceptor works on these plain request/response
//! values so it can be exercised without a network.

use crate::APP_USER_AGENT;
use reqwest::{header::HeaderMap, Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::debug;

/// Default request timeout applied by [`ReqwestTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, or a path relative to the application origin.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST with a JSON body.
    ///
    /// # Errors
    /// Returns an error if `body` cannot be encoded as JSON.
    pub fn post_json<B: Serialize + ?Sized>(
        url: impl Into<String>,
        body: &B,
    ) -> Result<Self, serde_json::Error> {
        let mut request = Self::new(Method::POST, url);
        request.body = Some(serde_json::to_value(body)?);
        Ok(request)
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Unable to reach the server: {0}")]
    Network(String),
    #[error("Failed to build request: {0}")]
    Request(String),
}

/// Sends one request and returns the full response, whatever its status.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// # Errors
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_request_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_request_error)?.to_vec();

        debug!(%status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_request_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::Request(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}
