//! Session token slot shared by the guard, the interceptor and the wizard.
//!
//! There is exactly one token per session. Reads and writes go through an
//! in-memory cache backed by a [`TokenStorage`] adapter; every operation is a
//! single lock acquisition, so concurrent writers resolve as last write wins.
//! Storage failures are logged and never surface to callers.

pub mod storage;
pub mod token;

pub use storage::{FileStorage, MemoryStorage, StorageError, TokenStorage, TOKEN_STORAGE_KEY};
pub use token::Claims;

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

struct Inner {
    storage: Arc<dyn TokenStorage>,
    cache: RwLock<Option<String>>,
}

/// Cheap to clone handle over the session slot.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.has_stored_token())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Opens the store, priming the cache from `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let cached = storage.load().unwrap_or_else(|err| {
            warn!("failed to load session token: {err}");
            None
        });

        Self {
            inner: Arc::new(Inner {
                storage,
                cache: RwLock::new(cached),
            }),
        }
    }

    /// Store with a process-local slot.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    /// Returns the stored token only while it is valid. An expired token is
    /// left in place; it is just never handed out.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.get_at(token::now())
    }

    /// Same as [`SessionStore::get`] against an explicit clock.
    #[must_use]
    pub fn get_at(&self, now: i64) -> Option<String> {
        let cache = self
            .inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        cache
            .as_deref()
            .filter(|value| token::check_at(value, now))
            .map(str::to_string)
    }

    /// Stores `value` if it is currently valid; invalid tokens are ignored.
    /// Returns whether the token was accepted.
    pub fn set(&self, value: &str) -> bool {
        self.set_at(value, token::now())
    }

    /// Same as [`SessionStore::set`] against an explicit clock.
    pub fn set_at(&self, value: &str, now: i64) -> bool {
        if !token::check_at(value, now) {
            debug!("ignoring invalid or expired session token");
            return false;
        }

        let mut cache = self
            .inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = self.inner.storage.save(value) {
            warn!("session token kept in memory only: {err}");
        }
        *cache = Some(value.to_string());
        true
    }

    /// Removes the token unconditionally.
    pub fn clear(&self) {
        let mut cache = self
            .inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = self.inner.storage.delete() {
            warn!("failed to delete persisted session token: {err}");
        }
        *cache = None;
    }

    /// Claims of the current valid token.
    #[must_use]
    pub fn claims(&self) -> Option<Claims> {
        self.get().as_deref().and_then(token::decode)
    }

    /// True if any token, valid or not, is held.
    #[must_use]
    pub fn has_stored_token(&self) -> bool {
        self.inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
