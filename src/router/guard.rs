use super::{redirect_to_login, Location, Navigator};
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Allow,
    Deny,
}

/// Child-route activation check for protected routes.
///
/// UX-only: the API still rejects requests without a valid token.
#[derive(Clone)]
pub struct AuthGuard {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl AuthGuard {
    #[must_use]
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// Re-validates the session on every call. Without a valid token the user
    /// is sent to login with `requested` as the return target and activation
    /// is denied.
    #[instrument(skip_all, fields(requested = %requested.path()))]
    pub fn can_activate_child(&self, requested: &Location) -> Activation {
        if self.session.get().is_some() {
            return Activation::Allow;
        }

        debug!("no valid session token");
        redirect_to_login(self.navigator.as_ref(), &requested.to_string());
        Activation::Deny
    }

    /// Navigates to `requested` when activation is allowed.
    pub fn navigate(&self, requested: Location) -> Activation {
        let activation = self.can_activate_child(&requested);
        if activation == Activation::Allow {
            self.navigator.navigate(requested);
        }
        activation
    }
}
