use super::prompt::Prompt;
use crate::{
    auth,
    config::ClientConfig,
    router::{login_location, Location, LOGIN_PATH},
};
use anyhow::{Context, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub config: ClientConfig,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    /// Route the sign-in should return to.
    pub referer: Option<String>,
}

/// # Errors
/// Returns an error if the credentials are refused or no session was issued.
pub async fn execute(args: Args) -> Result<()> {
    let start = args
        .referer
        .as_deref()
        .map_or_else(|| Location::new(LOGIN_PATH), login_location);
    let (_, client) = super::connect(&args.config, start)?;

    let mut prompt = Prompt::stdin();
    let username = match args.username {
        Some(username) => username,
        None => prompt.line("username").await?.unwrap_or_default(),
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt.secret("password").await?.unwrap_or_default(),
    };

    let target = auth::login(&client, &username, &password)
        .await
        .context("sign-in failed")?;

    println!("Signed in as {}, continue at {target}", username.trim());
    Ok(())
}
