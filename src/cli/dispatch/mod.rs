//! Maps parsed arguments to the action the binary runs.

use crate::cli::actions::{get, login, Action};
use crate::cli::commands::{
    self, client, password, ARG_PASSWORD, ARG_PATH, ARG_REFERER, ARG_USERNAME,
};
use anyhow::{bail, Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let mut config = client::Options::parse(matches)?.into_config();

    let non_empty = |sub: &clap::ArgMatches, id: &str| {
        sub.get_one::<String>(id)
            .cloned()
            .filter(|value| !value.trim().is_empty())
    };

    match matches.subcommand() {
        Some((commands::CMD_LOGIN, sub)) => Ok(Action::Login(login::Args {
            config,
            username: non_empty(sub, ARG_USERNAME),
            password: non_empty(sub, ARG_PASSWORD).map(SecretString::from),
            referer: non_empty(sub, ARG_REFERER),
        })),
        Some((commands::CMD_LOGOUT, _)) => Ok(Action::Logout(config)),
        Some((commands::CMD_WHOAMI, _)) => Ok(Action::WhoAmI(config)),
        Some((commands::CMD_GET, sub)) => Ok(Action::Get(get::Args {
            config,
            path: non_empty(sub, ARG_PATH).context("missing required argument: <path>")?,
        })),
        Some((commands::CMD_CHANGE_PASSWORD, sub)) => {
            password::apply(sub, &mut config);
            Ok(Action::ChangePassword(config))
        }
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("missing command"),
    }
}
