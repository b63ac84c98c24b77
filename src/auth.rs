//! Sign-in and sign-out flows around the session slot.

use crate::{
    api::{ApiClient, ApiError, Reply, Transport},
    router::{Location, LOGIN_PATH, REFERER_QUERY_KEY},
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

/// Where a sign-in lands when no usable referer was given.
pub const DEFAULT_LANDING_PATH: &str = "/user/management";

/// Nested redirect route that may wrap the real return target.
const REDIRECT_PATH: &str = "/redirect";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error(transparent)]
    Rejected(#[from] ApiError),
    #[error("login succeeded but no valid session token was issued")]
    MissingToken,
}

/// Signs in and navigates to the post-login target derived from the
/// `referer` of the location currently displayed.
///
/// # Errors
/// Returns [`LoginError`] after notifying the user.
#[instrument(skip_all, fields(username = %username.trim()))]
pub async fn login<T: Transport>(
    client: &ApiClient<T>,
    username: &str,
    password: &SecretString,
) -> Result<Location, LoginError> {
    let username = username.trim();
    let password = SecretString::from(password.expose_secret().trim().to_string());
    if username.is_empty() || password.expose_secret().is_empty() {
        client
            .notifier()
            .warning("Please fill in both username and password.");
        return Err(LoginError::MissingCredentials);
    }

    match client.login(username, &password).await {
        Ok(Reply::Data(())) => {}
        Ok(Reply::LoginRequired) => {
            client.notifier().error("Sign-in was rejected.");
            return Err(LoginError::Rejected(ApiError::new(401, "Sign-in was rejected.")));
        }
        Err(err) => {
            client
                .notifier()
                .error("Sign-in request failed, please try again later.");
            return Err(LoginError::Rejected(err));
        }
    }

    if client.session().get().is_none() {
        client
            .notifier()
            .error("Sign-in did not return a usable session.");
        return Err(LoginError::MissingToken);
    }

    let current = client.navigator().current();
    let target = post_login_target(current.as_ref(), client.interceptor().base_url());
    info!(target = %target, "signed in");
    client.notifier().success("Signed in, redirecting.");
    client.navigator().navigate(target.clone());
    Ok(target)
}

/// Clears the session and shows the login route.
pub fn logout<T: Transport>(client: &ApiClient<T>) {
    client.session().clear();
    client.navigator().navigate(Location::new(LOGIN_PATH));
}

/// Resolves the `referer` of a login location into the route to show after
/// sign-in. Absolute URLs are only honoured on the application origin, and a
/// `/redirect?referer=` wrapper is unwrapped.
#[must_use]
pub fn post_login_target(login: Option<&Location>, origin: &Url) -> Location {
    let referer = login
        .and_then(|location| location.query(REFERER_QUERY_KEY))
        .map(str::trim)
        .unwrap_or_default();

    let Some(target) = resolve_referer(referer, origin) else {
        return Location::new(DEFAULT_LANDING_PATH);
    };

    if target.path() == REDIRECT_PATH {
        let inner = target.query(REFERER_QUERY_KEY).unwrap_or_default();
        return resolve_referer(inner, origin)
            .unwrap_or_else(|| Location::new(DEFAULT_LANDING_PATH));
    }

    target
}

fn resolve_referer(referer: &str, origin: &Url) -> Option<Location> {
    if referer.is_empty() || referer == "/" {
        return None;
    }

    match Url::parse(referer) {
        Ok(url) if url.origin() == origin.origin() => {
            let mut path = url.path().to_string();
            if let Some(query) = url.query() {
                path.push('?');
                path.push_str(query);
            }
            Some(Location::parse(&path))
        }
        Ok(_) => None,
        Err(_) if referer.starts_with("//") => None,
        Err(_) if referer.starts_with('/') => Some(Location::parse(referer)),
        Err(_) => Some(Location::parse(&format!("/{referer}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{Interceptor, SET_TOKEN_HEADER};
    use crate::notify::{Level, NoticeLog};
    use crate::router::{login_location, MemoryRouter, Navigator};
    use crate::session::{token, SessionStore};
    use crate::test_support::{envelope_response, mint_token, MockTransport, BASE_URL};
    use reqwest::header::HeaderValue;
    use serde_json::json;
    use std::sync::Arc;

    fn origin() -> Url {
        Url::parse(BASE_URL).unwrap()
    }

    struct Fixture {
        transport: MockTransport,
        router: Arc<MemoryRouter>,
        notices: Arc<NoticeLog>,
        client: ApiClient<MockTransport>,
    }

    fn fixture(start: Location) -> Fixture {
        let transport = MockTransport::default();
        let router = Arc::new(MemoryRouter::starting_at(start));
        let notices = Arc::new(NoticeLog::default());
        let interceptor = Interceptor::new(
            transport.clone(),
            SessionStore::in_memory(),
            origin(),
            notices.clone(),
        );
        let client = ApiClient::new(interceptor, router.clone());
        Fixture {
            transport,
            router,
            notices,
            client,
        }
    }

    #[test]
    fn default_landing_without_referer() {
        let origin = origin();
        assert_eq!(
            post_login_target(None, &origin),
            Location::new(DEFAULT_LANDING_PATH)
        );
        assert_eq!(
            post_login_target(Some(&Location::new("/login")), &origin),
            Location::new(DEFAULT_LANDING_PATH)
        );
        assert_eq!(
            post_login_target(Some(&login_location("/")), &origin),
            Location::new(DEFAULT_LANDING_PATH)
        );
        assert_eq!(
            post_login_target(Some(&login_location("")), &origin),
            Location::new(DEFAULT_LANDING_PATH)
        );
    }

    #[test]
    fn relative_referer_is_used_as_is() {
        let target = post_login_target(Some(&login_location("/goods/price?id=3")), &origin());
        assert_eq!(target, Location::new("/goods/price").with_query("id", "3"));

        let target = post_login_target(Some(&login_location("token")), &origin());
        assert_eq!(target, Location::new("/token"));
    }

    #[test]
    fn absolute_referer_must_share_origin() {
        let same = login_location(&format!("{BASE_URL}/system/config?tab=2"));
        assert_eq!(
            post_login_target(Some(&same), &origin()),
            Location::new("/system/config").with_query("tab", "2")
        );

        let foreign = login_location("https://evil.example/phish");
        assert_eq!(
            post_login_target(Some(&foreign), &origin()),
            Location::new(DEFAULT_LANDING_PATH)
        );

        let protocol_relative = login_location("//evil.example/phish");
        assert_eq!(
            post_login_target(Some(&protocol_relative), &origin()),
            Location::new(DEFAULT_LANDING_PATH)
        );
    }

    #[test]
    fn nested_redirect_is_unwrapped() {
        let inner = "/recharge/orders?page=2";
        let wrapped = Location::new(REDIRECT_PATH)
            .with_query(REFERER_QUERY_KEY, inner)
            .to_string();
        let login = login_location(&format!("{BASE_URL}{wrapped}"));

        assert_eq!(
            post_login_target(Some(&login), &origin()),
            Location::new("/recharge/orders").with_query("page", "2")
        );
    }

    #[tokio::test]
    async fn login_stores_token_and_follows_referer() {
        let f = fixture(login_location("/token"));
        let issued = mint_token(&json!({ "exp": token::now() + 3600, "username": "root" }));
        let mut response = envelope_response(200, &json!({ "code": 0 }));
        if let Ok(ref mut inner) = response {
            inner.headers.insert(
                SET_TOKEN_HEADER,
                HeaderValue::from_str(&issued).unwrap(),
            );
        }
        f.transport.push(response);

        let target = login(&f.client, "  root ", &SecretString::from(" pw ")).await;
        assert_eq!(target, Ok(Location::new("/token")));
        assert_eq!(f.client.session().get(), Some(issued));
        assert_eq!(f.router.current(), Some(Location::new("/token")));
        assert_eq!(
            f.transport.requests()[0].body,
            Some(json!({ "username": "root", "password": "pw" }))
        );
        assert_eq!(f.notices.at(Level::Success).len(), 1);
    }

    #[tokio::test]
    async fn login_requires_credentials() {
        let f = fixture(Location::new(LOGIN_PATH));
        let result = login(&f.client, "   ", &SecretString::from("pw")).await;
        assert_eq!(result, Err(LoginError::MissingCredentials));
        assert!(f.transport.requests().is_empty());
        assert_eq!(f.notices.at(Level::Warning).len(), 1);
    }

    #[tokio::test]
    async fn login_without_token_fails() {
        let f = fixture(Location::new(LOGIN_PATH));
        f.transport.push(envelope_response(200, &json!({ "code": 0 })));

        let result = login(&f.client, "root", &SecretString::from("pw")).await;
        assert_eq!(result, Err(LoginError::MissingToken));
        assert_eq!(f.router.history().len(), 1);
    }

    #[tokio::test]
    async fn rejected_login_stays_put() {
        let f = fixture(Location::new(LOGIN_PATH));
        f.transport.push(envelope_response(
            200,
            &json!({ "code": 1001, "message": "bad credentials" }),
        ));

        let result = login(&f.client, "root", &SecretString::from("nope")).await;
        assert_eq!(
            result,
            Err(LoginError::Rejected(ApiError::new(1001, "bad credentials")))
        );
        assert_eq!(f.router.history().len(), 1);
        assert_eq!(f.notices.at(Level::Error).len(), 1);
    }

    #[test]
    fn logout_clears_and_shows_login() {
        let f = fixture(Location::new("/dashboard"));
        f.client
            .session()
            .set(&mint_token(&json!({ "exp": token::now() + 3600 })));

        logout(&f.client);
        assert!(f.client.session().get().is_none());
        assert_eq!(f.router.current(), Some(Location::new(LOGIN_PATH)));
    }
}
