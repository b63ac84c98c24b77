//! Three-step password change: old password, new password, confirmation,
//! then a single commit against the API.
//!
//! Captured values are kept in a [`FlowStore`] and only the flow id travels
//! in the route (`/change-password/step{n}?flow=<id>`). The current step and
//! the in-flight state of the commit are exposed as `watch` signals for the
//! presentation layer.

pub mod flow;
pub mod step;

pub use flow::{FlowId, FlowState, FlowStore, DEFAULT_FLOW_TTL};
pub use step::{Step, FLOW_QUERY_KEY, WIZARD_BASE_PATH};

use crate::{
    api::{ApiClient, ApiError, Reply, Transport},
    router::{Location, LOGIN_PATH},
};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct WizardOptions {
    pub min_password_len: usize,
    pub flow_ttl: Duration,
    /// Compare the old password with the session's `password` claim before
    /// leaving step 1. The API still verifies it on commit.
    pub verify_old_against_session: bool,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
            flow_ttl: DEFAULT_FLOW_TTL,
            verify_old_against_session: true,
        }
    }
}

/// Rejections of a step's input. None of these leave the current step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("a value is required")]
    Required,
    #[error("the old password is incorrect")]
    PasswordMismatch,
    #[error("the new password must be at least {0} characters")]
    TooShort(usize),
    #[error("the new password must differ from the old one")]
    SameAsOld,
    #[error("the passwords do not match")]
    ConfirmMismatch,
    #[error("the password change expired, please start again")]
    FlowExpired,
}

/// Outcome of the final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// Password changed; the session is gone and login is displayed.
    Changed,
    /// Captured values were missing; the wizard restarted at step 1.
    Restarted,
    /// The API refused the change; the wizard stays on step 3.
    Failed(ApiError),
    /// The session was rejected and the client redirected to login.
    LoginRequired,
}

pub struct PasswordChange<T> {
    client: Arc<ApiClient<T>>,
    flows: FlowStore,
    options: WizardOptions,
    step: watch::Sender<Step>,
    loading: watch::Sender<bool>,
}

impl<T: Transport> PasswordChange<T> {
    #[must_use]
    pub fn new(client: Arc<ApiClient<T>>, options: WizardOptions) -> Self {
        Self {
            client,
            flows: FlowStore::new(options.flow_ttl),
            options,
            step: watch::Sender::new(Step::OldPassword),
            loading: watch::Sender::new(false),
        }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<ApiClient<T>> {
        &self.client
    }

    #[must_use]
    pub fn flows(&self) -> &FlowStore {
        &self.flows
    }

    #[must_use]
    pub fn subscribe_step(&self) -> watch::Receiver<Step> {
        self.step.subscribe()
    }

    #[must_use]
    pub fn current_step(&self) -> Step {
        *self.step.borrow()
    }

    #[must_use]
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn set_step(&self, step: Step) {
        self.step.send_replace(step);
    }

    /// Marks `step` as displayed and returns the value to prefill its input
    /// with: the captured old password on step 1, the new one on step 2.
    #[must_use]
    pub fn enter(&self, step: Step, location: &Location) -> Option<SecretString> {
        self.set_step(step);
        let state = self.flow_of(location).and_then(|id| self.flows.get(id))?;
        match step {
            Step::OldPassword => state.old,
            Step::NewPassword => state.new,
            Step::Confirm => None,
        }
    }

    /// Step 1. Captures the old password and moves on to step 2.
    ///
    /// # Errors
    /// [`StepError::Required`] for an empty value, [`StepError::PasswordMismatch`]
    /// when it differs from the password recorded in the session.
    pub fn submit_old(
        &self,
        location: &Location,
        old: &SecretString,
    ) -> Result<Location, StepError> {
        if old.expose_secret().is_empty() {
            return Err(StepError::Required);
        }

        if self.options.verify_old_against_session {
            let recorded = self.client.session().claims().and_then(|claims| claims.password());
            if let Some(recorded) = recorded {
                if recorded.expose_secret() != old.expose_secret() {
                    return Err(StepError::PasswordMismatch);
                }
            }
        }

        let id = match self.flow_of(location) {
            Some(id) if self.flows.update(id, |state| state.old = Some(old.clone())) => id,
            _ => self.flows.create(FlowState {
                old: Some(old.clone()),
                new: None,
            }),
        };

        Ok(self.advance(Step::NewPassword, id))
    }

    /// Step 2. Captures the new password and moves on to confirmation.
    ///
    /// # Errors
    /// [`StepError::Required`], [`StepError::TooShort`] or
    /// [`StepError::SameAsOld`] for a rejected value, [`StepError::FlowExpired`]
    /// after restarting when step 1 was never completed or has expired.
    pub fn submit_new(
        &self,
        location: &Location,
        new: &SecretString,
    ) -> Result<Location, StepError> {
        let value = new.expose_secret();
        if value.is_empty() {
            return Err(StepError::Required);
        }
        if value.chars().count() < self.options.min_password_len {
            return Err(StepError::TooShort(self.options.min_password_len));
        }

        let Some((id, state)) = self.live_flow(location) else {
            return Err(self.expired());
        };
        if state
            .old
            .as_ref()
            .is_some_and(|old| old.expose_secret() == value)
        {
            return Err(StepError::SameAsOld);
        }

        self.flows.update(id, |state| state.new = Some(new.clone()));
        Ok(self.advance(Step::Confirm, id))
    }

    /// Step 3. Checks the confirmation and commits the change.
    ///
    /// # Errors
    /// [`StepError::Required`] or [`StepError::ConfirmMismatch`] when the
    /// confirmation does not repeat the new password, [`StepError::FlowExpired`]
    /// after restarting when the captured values are gone.
    pub async fn submit_confirm(
        &self,
        location: &Location,
        confirm: &SecretString,
    ) -> Result<Commit, StepError> {
        if confirm.expose_secret().is_empty() {
            return Err(StepError::Required);
        }

        let Some((_, state)) = self.live_flow(location) else {
            return Err(self.expired());
        };
        match state.new {
            Some(ref new) if new.expose_secret() == confirm.expose_secret() => {}
            _ => return Err(StepError::ConfirmMismatch),
        }

        Ok(self.submit_change(location).await)
    }

    /// Sends the captured values to the API.
    #[instrument(skip_all)]
    pub async fn submit_change(&self, location: &Location) -> Commit {
        let captured = self.live_flow(location).and_then(|(id, state)| {
            let FlowState {
                old: Some(old),
                new: Some(new),
            } = state
            else {
                return None;
            };
            Some((id, old, new))
        });
        let Some((id, old, new)) = captured else {
            debug!("password change attempted without captured values");
            self.client
                .notifier()
                .error("Please fill in the old and new passwords first.");
            self.reset_process();
            return Commit::Restarted;
        };

        self.loading.send_replace(true);
        let result = self.client.change_password(&old, &new).await;
        self.loading.send_replace(false);

        match result {
            Ok(Reply::Data(())) => {
                info!("password changed");
                self.flows.remove(id);
                self.client
                    .notifier()
                    .success("Password changed, please sign in again.");
                self.client.session().clear();
                self.client.navigator().navigate(Location::new(LOGIN_PATH));
                self.reset_state();
                Commit::Changed
            }
            Ok(Reply::LoginRequired) => Commit::LoginRequired,
            Err(err) => {
                debug!(code = err.code, "password change refused");
                self.client.notifier().error(&err.message);
                Commit::Failed(err)
            }
        }
    }

    /// Returns to the previous step of the one displayed at `location`.
    /// Going back to step 1 forgets the new password.
    pub fn go_back(&self, location: &Location) -> Option<Location> {
        let previous = Step::from_path(location.path())?.previous()?;

        let flow = self.flow_of(location);
        if let (Some(id), Step::OldPassword) = (flow, previous) {
            self.flows.update(id, |state| state.new = None);
        }

        let target = match flow {
            Some(id) => previous
                .location()
                .with_query(FLOW_QUERY_KEY, id.to_string()),
            None => previous.location(),
        };
        self.set_step(previous);
        self.client.navigator().navigate(target.clone());
        Some(target)
    }

    pub fn reset_state(&self) {
        self.set_step(Step::OldPassword);
    }

    /// Starts over on a blank step 1.
    pub fn reset_process(&self) {
        self.reset_state();
        self.client.navigator().navigate(Step::OldPassword.location());
    }

    fn flow_of(&self, location: &Location) -> Option<FlowId> {
        location.query(FLOW_QUERY_KEY)?.parse().ok()
    }

    fn live_flow(&self, location: &Location) -> Option<(FlowId, FlowState)> {
        let id = self.flow_of(location)?;
        self.flows.get(id).map(|state| (id, state))
    }

    fn advance(&self, step: Step, id: FlowId) -> Location {
        let target = step.location().with_query(FLOW_QUERY_KEY, id.to_string());
        self.set_step(step);
        self.client.navigator().navigate(target.clone());
        target
    }

    fn expired(&self) -> StepError {
        self.client.notifier().error("The password change expired, please start again.");
        self.reset_process();
        StepError::FlowExpired
    }
}
