use crate::config::ClientConfig;
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::{path::PathBuf, time::Duration};
use url::Url;

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_TOKEN_DIR: &str = "token-dir";
pub const ARG_TIMEOUT: &str = "timeout";

#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: Url,
    pub token_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Options {
    /// Parse connection arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the base URL is missing or not an absolute URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let base_url = matches
            .get_one::<String>(ARG_BASE_URL)
            .filter(|value| !value.trim().is_empty())
            .context("missing required argument: --base-url")?;
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid --{ARG_BASE_URL}: {base_url}"))?;

        Ok(Self {
            base_url,
            token_dir: matches
                .get_one::<String>(ARG_TOKEN_DIR)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            timeout: Duration::from_secs(
                matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10),
            ),
        })
    }

    #[must_use]
    pub fn into_config(self) -> ClientConfig {
        let token_dir = self.token_dir.unwrap_or_else(ClientConfig::default_token_dir);
        let mut config = ClientConfig::new(self.base_url, token_dir);
        config.timeout = self.timeout;
        config
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_URL)
                .short('u')
                .long(ARG_BASE_URL)
                .help("Back-office application origin, example: https://admin.example.com")
                .env("UPORTAL_BASE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_DIR)
                .long(ARG_TOKEN_DIR)
                .help("Directory holding the session token (default: $XDG_STATE_HOME/uportal)")
                .env("UPORTAL_TOKEN_DIR"),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("UPORTAL_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
