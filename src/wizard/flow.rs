//! Short-lived holders for the values captured across wizard steps.
//!
//! A flow is addressed by an opaque random id carried in the route; the
//! passwords themselves never leave this process. Each write extends the
//! flow's lifetime, expired flows are purged on access.

use secrecy::SecretString;
use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};
use tracing::debug;
use ulid::Ulid;

pub const DEFAULT_FLOW_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(Ulid);

impl FlowId {
    fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FlowId {
    type Err = ulid::DecodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(value).map(Self)
    }
}

/// Values captured so far.
#[derive(Debug, Clone, Default)]
pub struct FlowState {
    pub old: Option<SecretString>,
    pub new: Option<SecretString>,
}

#[derive(Debug)]
struct Entry {
    state: FlowState,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct FlowStore {
    ttl: Duration,
    entries: Mutex<HashMap<FlowId, Entry>>,
}

impl Default for FlowStore {
    fn default() -> Self {
        Self::new(DEFAULT_FLOW_TTL)
    }
}

impl FlowStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a flow holding `state`.
    pub fn create(&self, state: FlowState) -> FlowId {
        let now = Instant::now();
        let id = FlowId::generate();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        purge_expired(&mut entries, now);
        entries.insert(
            id,
            Entry {
                state,
                expires_at: now + self.ttl,
            },
        );
        debug!(flow = %id, "password change flow opened");
        id
    }

    /// Snapshot of a live flow.
    #[must_use]
    pub fn get(&self, id: FlowId) -> Option<FlowState> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        purge_expired(&mut entries, Instant::now());
        entries.get(&id).map(|entry| entry.state.clone())
    }

    /// Applies `update` to a live flow and extends its lifetime. Returns
    /// `false` if the flow is unknown or expired.
    pub fn update(&self, id: FlowId, update: impl FnOnce(&mut FlowState)) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        purge_expired(&mut entries, now);
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        update(&mut entry.state);
        entry.expires_at = now + self.ttl;
        true
    }

    pub fn remove(&self, id: FlowId) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Number of live flows.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        purge_expired(&mut entries, Instant::now());
        entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn purge_expired(entries: &mut HashMap<FlowId, Entry>, now: Instant) {
    entries.retain(|_, entry| entry.expires_at > now);
}
