pub mod change_password;
pub mod get;
pub mod login;
pub mod logout;
pub mod prompt;
pub mod whoami;

mod run;

use crate::{
    api::{ApiClient, ReqwestTransport},
    config::ClientConfig,
    notify::ConsoleNotifier,
    router::{Location, MemoryRouter},
};
use anyhow::{Context, Result};
use std::sync::Arc;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout(ClientConfig),
    WhoAmI(ClientConfig),
    Get(get::Args),
    ChangePassword(ClientConfig),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Client wired to stderr notices and an in-memory router opened at `start`.
fn connect(
    config: &ClientConfig,
    start: Location,
) -> Result<(Arc<MemoryRouter>, ApiClient<ReqwestTransport>)> {
    let router = Arc::new(MemoryRouter::starting_at(start));
    let client = config
        .client(router.clone(), Arc::new(ConsoleNotifier))
        .context("failed to build HTTP client")?;
    Ok((router, client))
}
