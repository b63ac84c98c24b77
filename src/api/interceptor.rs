//! Request/response interception for calls to the application's own API.
//!
//! Order per same-origin response: capture `Set-Token` first, then inspect
//! the envelope, so a refreshed token is kept even when the call fails. The
//! interceptor never retries and never navigates; a 401 envelope comes back
//! as [`RequestError::AuthenticationRequired`] for the caller to act on.

use super::{
    envelope::{ApiError, Envelope, CODE_OK, CODE_UNAUTHORIZED},
    transport::{HttpRequest, HttpResponse, Transport},
};
use crate::{notify::Notifier, session::SessionStore};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    StatusCode,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Response header carrying a refreshed session token.
pub const SET_TOKEN_HEADER: &str = "set-token";

/// Shown when a transport failure has no usable message.
pub const FALLBACK_MESSAGE: &str = "Service unavailable, please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("authentication required")]
    AuthenticationRequired,
    #[error(transparent)]
    Api(ApiError),
    #[error("transport failure: {0}")]
    Transport(ApiError),
}

pub struct Interceptor<T> {
    transport: T,
    session: SessionStore,
    base_url: Url,
    notifier: Arc<dyn Notifier>,
}

impl<T: Transport> Interceptor<T> {
    /// `base_url` defines the application origin; relative request URLs are
    /// resolved against it.
    #[must_use]
    pub fn new(
        transport: T,
        session: SessionStore,
        base_url: Url,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            session,
            base_url,
            notifier,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends `request`, attaching credentials and normalizing the envelope for
    /// same-origin targets. Cross-origin requests and responses pass through
    /// untouched.
    ///
    /// # Errors
    /// - [`RequestError::AuthenticationRequired`] for a `401` envelope code.
    /// - [`RequestError::Api`] for any other non-zero code.
    /// - [`RequestError::Transport`] when no envelope could be obtained; the
    ///   user has already been notified.
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn handle(&self, mut request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let target = match self.base_url.join(&request.url) {
            Ok(target) => target,
            Err(err) => {
                let message = format!("Invalid request URL: {err}");
                return Err(self.transport_failure(0, &message));
            }
        };
        request.url = target.to_string();

        if target.origin() != self.base_url.origin() {
            debug!("cross-origin request, forwarding as is");
            return self
                .transport
                .send(request)
                .await
                .map_err(|err| RequestError::Transport(ApiError::new(0, err.to_string())));
        }

        if let Some(token) = self.session.get() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    request.headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("session token is not a valid header value"),
            }
        }

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => return Err(self.transport_failure(0, &err.to_string())),
        };

        if let Some(refreshed) = response
            .headers
            .get(SET_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            let accepted = self.session.set(refreshed);
            debug!(accepted, "received refreshed session token");
        }

        let status = response.status;
        let Some(envelope) = Envelope::parse(&response.body) else {
            let message = if status.is_success() {
                "Failed to decode response."
            } else {
                status_message(status)
            };
            return Err(self.transport_failure(i64::from(status.as_u16()), message));
        };

        match envelope.code {
            CODE_OK if status.is_success() => Ok(response),
            CODE_OK => Err(self.transport_failure(
                i64::from(status.as_u16()),
                status_message(status),
            )),
            CODE_UNAUTHORIZED => {
                debug!("session rejected by the server");
                Err(RequestError::AuthenticationRequired)
            }
            code => {
                debug!(code, "application error");
                Err(RequestError::Api(envelope.to_error()))
            }
        }
    }

    fn transport_failure(&self, code: i64, message: &str) -> RequestError {
        let message = if message.trim().is_empty() {
            FALLBACK_MESSAGE
        } else {
            message
        };
        warn!(code, "request failed: {message}");
        self.notifier.error(message);
        RequestError::Transport(ApiError::new(code, message))
    }
}

fn status_message(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or(FALLBACK_MESSAGE)
}
