//! Typed calls over the interceptor. This is the layer that turns an
//! `AuthenticationRequired` outcome into the login redirect.

use super::{
    envelope::{ApiError, Envelope},
    interceptor::{Interceptor, RequestError},
    transport::{HttpRequest, HttpResponse, Transport},
};
use crate::{
    notify::Notifier,
    router::{redirect_to_login, Navigator},
    session::SessionStore,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of a call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Data(T),
    /// The session was rejected and the user has been sent to login.
    LoginRequired,
}

impl<T> Reply<T> {
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Data(data) => Some(data),
            Self::LoginRequired => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Self::Data(data) => Reply::Data(f(data)),
            Self::LoginRequired => Reply::LoginRequired,
        }
    }
}

pub struct ApiClient<T> {
    interceptor: Interceptor<T>,
    navigator: Arc<dyn Navigator>,
}

impl<T: Transport> ApiClient<T> {
    #[must_use]
    pub fn new(interceptor: Interceptor<T>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            interceptor,
            navigator,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        self.interceptor.session()
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        self.interceptor.notifier()
    }

    #[must_use]
    pub fn interceptor(&self) -> &Interceptor<T> {
        &self.interceptor
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<Reply<R>, ApiError> {
        self.send(HttpRequest::get(path)).await
    }

    /// # Errors
    /// See [`ApiClient::send`]; also fails if `body` cannot be encoded.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<Reply<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = HttpRequest::post_json(path, body)
            .map_err(|err| ApiError::new(0, format!("Failed to encode request: {err}")))?;
        self.send(request).await
    }

    /// Sends `request` and decodes the envelope's `data` into `R`. A missing
    /// `data` decodes as JSON `null`.
    ///
    /// A `401` envelope resolves to [`Reply::LoginRequired`] after exactly one
    /// redirect to login, returning to the location currently displayed.
    ///
    /// # Errors
    /// Returns the envelope's `{code, message}` for application errors, or the
    /// HTTP status and a message for transport failures.
    #[instrument(skip_all, fields(url = %request.url))]
    pub async fn send<R: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<Reply<R>, ApiError> {
        match self.interceptor.handle(request).await {
            Ok(response) => decode_data(&response).map(Reply::Data),
            Err(RequestError::AuthenticationRequired) => {
                let return_to = self
                    .navigator
                    .current()
                    .map_or_else(|| "/".to_string(), |location| location.to_string());
                redirect_to_login(self.navigator.as_ref(), &return_to);
                Ok(Reply::LoginRequired)
            }
            Err(RequestError::Api(err) | RequestError::Transport(err)) => Err(err),
        }
    }
}

fn decode_data<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ApiError> {
    let status = i64::from(response.status.as_u16());
    let data = Envelope::parse(&response.body)
        .ok_or_else(|| ApiError::new(status, "Failed to decode response."))?
        .data
        .unwrap_or(Value::Null);

    serde_json::from_value(data).map_err(|err| {
        debug!("unexpected response data: {err}");
        ApiError::new(status, format!("Failed to decode response: {err}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::NoticeLog;
    use crate::router::{Location, MemoryRouter, LOGIN_PATH, REFERER_QUERY_KEY};
    use crate::test_support::{envelope_response, MockTransport, BASE_URL};
    use serde::Deserialize;
    use serde_json::json;
    use url::Url;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Plan {
        id: u32,
        name: String,
    }

    fn client(router: &Arc<MemoryRouter>) -> (MockTransport, ApiClient<MockTransport>) {
        let transport = MockTransport::default();
        let base_url = Url::parse(BASE_URL).unwrap();
        let interceptor = Interceptor::new(
            transport.clone(),
            SessionStore::in_memory(),
            base_url,
            Arc::new(NoticeLog::default()),
        );
        (transport, ApiClient::new(interceptor, router.clone()))
    }

    #[tokio::test]
    async fn success_yields_data_unchanged() {
        let router = Arc::new(MemoryRouter::default());
        let (transport, client) = client(&router);
        let data = json!({ "rows": [1, 2, 3], "total": 3 });
        transport.push(envelope_response(200, &json!({ "code": 0, "data": data })));

        let reply: Result<Reply<Value>, ApiError> = client.get("/admin/recharge/plans").await;
        assert_eq!(reply, Ok(Reply::Data(data)));
        assert!(router.history().is_empty());
    }

    #[tokio::test]
    async fn success_decodes_typed_data() {
        let router = Arc::new(MemoryRouter::default());
        let (transport, client) = client(&router);
        transport.push(envelope_response(
            200,
            &json!({ "code": 0, "data": { "id": 4, "name": "gold" } }),
        ));

        let reply = client.get::<Plan>("/admin/recharge/plans/4").await;
        assert_eq!(
            reply,
            Ok(Reply::Data(Plan {
                id: 4,
                name: "gold".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn missing_data_decodes_as_unit() {
        let router = Arc::new(MemoryRouter::default());
        let (transport, client) = client(&router);
        transport.push(envelope_response(200, &json!({ "code": 0 })));

        let reply = client.post::<_, ()>("/admin/goods", &json!({ "name": "x" })).await;
        assert_eq!(reply, Ok(Reply::Data(())));
        assert_eq!(transport.requests()[0].body, Some(json!({ "name": "x" })));
    }

    #[tokio::test]
    async fn application_error_rejects() {
        let router = Arc::new(MemoryRouter::default());
        let (transport, client) = client(&router);
        transport.push(envelope_response(200, &json!({ "code": 7, "message": "boom" })));

        let reply = client.get::<Value>("/admin/goods").await;
        assert_eq!(reply, Err(ApiError::new(7, "boom")));
    }

    #[tokio::test]
    async fn unauthorized_resolves_and_redirects_once() {
        let router = Arc::new(MemoryRouter::starting_at(Location::parse(
            "/token/task?page=2",
        )));
        let (transport, client) = client(&router);
        transport.push(envelope_response(200, &json!({ "code": 401 })));

        let reply = client.get::<Value>("/admin/token/tasks").await;
        assert_eq!(reply, Ok(Reply::LoginRequired));

        let history = router.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].path(), LOGIN_PATH);
        assert_eq!(
            history[1].query(REFERER_QUERY_KEY),
            Some("/token/task?page=2")
        );
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn mismatched_data_is_an_error() {
        let router = Arc::new(MemoryRouter::default());
        let (transport, client) = client(&router);
        transport.push(envelope_response(200, &json!({ "code": 0, "data": "text" })));

        let reply = client.get::<Plan>("/admin/recharge/plans/4").await;
        assert!(matches!(reply, Err(ref err) if err.code == 200));
    }

    #[test]
    fn reply_helpers() {
        assert_eq!(Reply::Data(2).map(|n| n * 2), Reply::Data(4));
        assert_eq!(Reply::<u8>::LoginRequired.map(|n| n * 2), Reply::LoginRequired);
        assert_eq!(Reply::Data("x").into_data(), Some("x"));
        assert_eq!(Reply::<u8>::LoginRequired.into_data(), None);
    }
}
