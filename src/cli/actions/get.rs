use crate::{
    api::Reply,
    config::ClientConfig,
    router::{Activation, AuthGuard, Location},
};
use anyhow::{bail, Context, Result};
use serde_json::Value;

#[derive(Debug)]
pub struct Args {
    pub config: ClientConfig,
    pub path: String,
}

/// GETs `path` with the stored session and prints the envelope's `data`.
///
/// # Errors
/// Returns an error if there is no valid session or the API refuses the call.
pub async fn execute(args: Args) -> Result<()> {
    let (router, client) = super::connect(&args.config, Location::new("/"))?;

    let guard = AuthGuard::new(client.session().clone(), router);
    if guard.navigate(Location::parse(&args.path)) == Activation::Deny {
        bail!("not signed in, run `uportal login`");
    }

    match client.get::<Value>(&args.path).await.context("request failed")? {
        Reply::Data(data) => {
            let rendered = serde_json::to_string_pretty(&data)?;
            println!("{rendered}");
            Ok(())
        }
        Reply::LoginRequired => bail!("the session was rejected, run `uportal login`"),
    }
}
