//! Runtime settings for a back-office client and the wiring they drive.

use crate::{
    api::{ApiClient, Interceptor, ReqwestTransport, TransportError, DEFAULT_TIMEOUT},
    notify::Notifier,
    router::Navigator,
    session::{FileStorage, SessionStore},
    wizard::{WizardOptions, DEFAULT_FLOW_TTL, DEFAULT_MIN_PASSWORD_LEN},
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use url::Url;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application origin; requests elsewhere never get the session token.
    pub base_url: Url,
    /// Directory holding the persisted session token.
    pub token_dir: PathBuf,
    pub timeout: Duration,
    pub min_password_len: usize,
    pub flow_ttl: Duration,
    pub verify_old_password: bool,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url, token_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url,
            token_dir: token_dir.into(),
            timeout: DEFAULT_TIMEOUT,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
            flow_ttl: DEFAULT_FLOW_TTL,
            verify_old_password: true,
        }
    }

    /// Per-user default location for the token file.
    #[must_use]
    pub fn default_token_dir() -> PathBuf {
        std::env::var_os("XDG_STATE_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/state"))
            })
            .unwrap_or_else(std::env::temp_dir)
            .join("uportal")
    }

    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(Arc::new(FileStorage::new(&self.token_dir)))
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn transport(&self) -> Result<ReqwestTransport, TransportError> {
        ReqwestTransport::new(self.timeout)
    }

    #[must_use]
    pub fn wizard_options(&self) -> WizardOptions {
        WizardOptions {
            min_password_len: self.min_password_len,
            flow_ttl: self.flow_ttl,
            verify_old_against_session: self.verify_old_password,
        }
    }

    /// Assembles the client stack: file-backed session, reqwest transport and
    /// interceptor bound to `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(
        &self,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<ApiClient<ReqwestTransport>, TransportError> {
        let interceptor = Interceptor::new(
            self.transport()?,
            self.session_store(),
            self.base_url.clone(),
            notifier,
        );
        Ok(ApiClient::new(interceptor, navigator))
    }
}
