use crate::{auth, config::ClientConfig, router::Location};
use anyhow::Result;

/// # Errors
/// Returns an error if the client cannot be built.
pub fn execute(config: &ClientConfig) -> Result<()> {
    let (_, client) = super::connect(config, Location::new("/"))?;
    let had_session = client.session().has_stored_token();
    auth::logout(&client);

    if had_session {
        println!("Signed out.");
    } else {
        println!("No session was stored.");
    }
    Ok(())
}
