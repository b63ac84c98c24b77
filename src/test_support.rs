//! Fixtures shared by unit tests.

use crate::api::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use base64ct::{Base64UrlUnpadded, Encoding};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    StatusCode,
};
use serde_json::Value;
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

pub const BASE_URL: &str = "https://admin.uportal.test";

/// Unsigned three-segment token around `claims`.
pub fn mint_token(claims: &Value) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Fresh directory path under the system temp dir; not created.
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("uportal-test-{}", ulid::Ulid::new()))
}

pub fn envelope_response(status: u16, body: &Value) -> Result<HttpResponse, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(HttpResponse {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        headers,
        body: body.to_string().into_bytes(),
    })
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<HttpResponse, TransportError>>,
    requests: Vec<HttpRequest>,
}

/// Replays queued responses in order and records what was sent.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn push(&self, response: Result<HttpResponse, TransportError>) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .responses
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .clone()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no response queued".to_string())))
    }
}
