//! Interactive password change. The step shown is whatever route the wizard
//! navigated to last; `:back` returns one step, `:quit` abandons the change.

use super::prompt::Prompt;
use crate::{
    api::Transport,
    config::ClientConfig,
    router::{Activation, AuthGuard, Location, Navigator, LOGIN_PATH},
    wizard::{Commit, PasswordChange, Step, StepError},
};
use anyhow::{bail, Result};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::io::AsyncBufRead;

const BACK: &str = ":back";
const QUIT: &str = ":quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Cancelled,
    LoginRequired,
}

/// # Errors
/// Returns an error if there is no valid session or input cannot be read.
pub async fn execute(config: &ClientConfig) -> Result<()> {
    let (router, client) = super::connect(config, Location::new("/"))?;

    let guard = AuthGuard::new(client.session().clone(), router.clone());
    if guard.navigate(Step::OldPassword.location()) == Activation::Deny {
        bail!("not signed in, run `uportal login`");
    }

    let wizard = PasswordChange::new(Arc::new(client), config.wizard_options());
    eprintln!("Type {BACK} to return to the previous step or {QUIT} to abandon.");

    match run(&wizard, router.as_ref(), &mut Prompt::stdin()).await? {
        Outcome::Changed => {
            println!("Password changed, sign in again with `uportal login`.");
            Ok(())
        }
        Outcome::Cancelled => {
            println!("Password unchanged.");
            Ok(())
        }
        Outcome::LoginRequired => bail!("the session was rejected, run `uportal login`"),
    }
}

/// Drives the wizard from `prompt` until it commits or is abandoned.
///
/// # Errors
/// Returns an error if input cannot be read.
pub async fn run<T, R>(
    wizard: &PasswordChange<T>,
    navigator: &dyn Navigator,
    prompt: &mut Prompt<R>,
) -> Result<Outcome>
where
    T: Transport,
    R: AsyncBufRead + Unpin,
{
    loop {
        let Some(here) = navigator.current() else {
            return Ok(Outcome::Cancelled);
        };
        let Some(step) = Step::from_path(here.path()) else {
            if here.path() == LOGIN_PATH {
                return Ok(Outcome::LoginRequired);
            }
            return Ok(Outcome::Cancelled);
        };

        let prefill = wizard.enter(step, &here);
        let Some(input) = prompt.secret(&label(step, prefill.is_some())).await? else {
            wizard.reset_state();
            return Ok(Outcome::Cancelled);
        };

        match input.expose_secret() {
            QUIT => {
                wizard.reset_state();
                return Ok(Outcome::Cancelled);
            }
            BACK => {
                if wizard.go_back(&here).is_none() {
                    eprintln!("already at the first step");
                }
                continue;
            }
            _ => {}
        }

        let value = match prefill {
            Some(kept) if input.expose_secret().is_empty() => kept,
            _ => input,
        };

        let result = match step {
            Step::OldPassword => wizard.submit_old(&here, &value).map(drop),
            Step::NewPassword => wizard.submit_new(&here, &value).map(drop),
            Step::Confirm => match wizard.submit_confirm(&here, &value).await {
                Ok(Commit::Changed) => return Ok(Outcome::Changed),
                Ok(Commit::LoginRequired) => return Ok(Outcome::LoginRequired),
                Ok(Commit::Restarted | Commit::Failed(_)) => Ok(()),
                Err(err) => Err(err),
            },
        };

        // expiry was already reported by the wizard
        if let Err(err) = result {
            if err != StepError::FlowExpired {
                eprintln!("{err}");
            }
        }
    }
}

fn label(step: Step, keeps_value: bool) -> String {
    let prompt = match step {
        Step::OldPassword => "old password",
        Step::NewPassword => "new password",
        Step::Confirm => "repeat new password",
    };
    if keeps_value {
        format!("[{}/3] {prompt} (enter keeps the previous value)", step.number())
    } else {
        format!("[{}/3] {prompt}", step.number())
    }
}
