//! Navigation primitives: locations, the navigator seam and the single
//! login-redirect helper shared by the guard and the API client.

pub mod guard;

pub use guard::{Activation, AuthGuard};

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};
use tracing::debug;
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/login";
pub const REFERER_QUERY_KEY: &str = "referer";

/// An application route: a path plus ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Parses `path?query`; a fragment, if any, is dropped.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.split_once('#').map_or(value, |(head, _)| head);
        let (path, query) = value.split_once('?').unwrap_or((value, ""));
        let path = if path.is_empty() { "/" } else { path };

        Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of `key`.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// The router as seen by this crate.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: Location);

    /// Location currently displayed, if any.
    fn current(&self) -> Option<Location>;
}

/// Login route that returns to `return_to` afterwards.
#[must_use]
pub fn login_location(return_to: &str) -> Location {
    Location::new(LOGIN_PATH).with_query(REFERER_QUERY_KEY, return_to)
}

/// Sends the user to the login route. Guard and client both go through here.
pub fn redirect_to_login(navigator: &dyn Navigator, return_to: &str) {
    debug!(return_to, "redirecting to login");
    navigator.navigate(login_location(return_to));
}

/// History-stack router kept in memory.
#[derive(Debug, Default)]
pub struct MemoryRouter {
    history: Mutex<Vec<Location>>,
}

impl MemoryRouter {
    #[must_use]
    pub fn starting_at(location: Location) -> Self {
        Self {
            history: Mutex::new(vec![location]),
        }
    }

    /// Every location visited, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Location> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Pops the current entry and returns the one now displayed.
    pub fn back(&self) -> Option<Location> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.len() > 1 {
            history.pop();
        }
        history.last().cloned()
    }
}

impl Navigator for MemoryRouter {
    fn navigate(&self, location: Location) {
        debug!(to = %location.path(), "navigate");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location);
    }

    fn current(&self) -> Option<Location> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_parses_path_and_query() {
        let location = Location::parse("/user/detail?id=7&tab=orders%20list#top");
        assert_eq!(location.path(), "/user/detail");
        assert_eq!(location.query("id"), Some("7"));
        assert_eq!(location.query("tab"), Some("orders list"));
        assert_eq!(location.query("missing"), None);

        assert_eq!(Location::parse("").path(), "/");
        assert_eq!(Location::parse("?a=1").query("a"), Some("1"));
    }

    #[test]
    fn location_display_round_trips() {
        let location = Location::new("/goods/price")
            .with_query("q", "a b&c")
            .with_query("page", "2");
        let rendered = location.to_string();
        assert_eq!(rendered, "/goods/price?q=a+b%26c&page=2");
        assert_eq!(Location::parse(&rendered), location);
        assert_eq!(Location::new("/plain").to_string(), "/plain");
    }

    #[test]
    fn login_location_encodes_referer() {
        let target = "/recharge/orders?status=paid&page=3";
        let login = login_location(target);
        let rendered = login.to_string();

        assert!(rendered.starts_with("/login?referer="));
        assert!(!rendered.contains("status=paid"));
        assert_eq!(Location::parse(&rendered).query(REFERER_QUERY_KEY), Some(target));
    }

    #[test]
    fn memory_router_tracks_history() {
        let router = MemoryRouter::starting_at(Location::new("/"));
        router.navigate(Location::new("/a"));
        router.navigate(Location::new("/b"));

        assert_eq!(router.current(), Some(Location::new("/b")));
        assert_eq!(router.history().len(), 3);
        assert_eq!(router.back(), Some(Location::new("/a")));
        assert_eq!(router.back(), Some(Location::new("/")));
        assert_eq!(router.back(), Some(Location::new("/")));
    }

    #[test]
    fn redirect_to_login_navigates_once() {
        let router = MemoryRouter::default();
        redirect_to_login(&router, "/token");

        let history = router.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].path(), LOGIN_PATH);
        assert_eq!(history[0].query(REFERER_QUERY_KEY), Some("/token"));
    }
}
