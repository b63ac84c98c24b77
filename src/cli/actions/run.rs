use crate::cli::{
    actions::{change_password, get, login, logout, whoami, Action},
    telemetry,
};
use anyhow::Result;

/// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let result = match action {
        Action::Login(args) => login::execute(args).await,
        Action::Logout(config) => logout::execute(&config),
        Action::WhoAmI(config) => whoami::execute(&config),
        Action::Get(args) => get::execute(args).await,
        Action::ChangePassword(config) => change_password::execute(&config).await,
    };

    telemetry::shutdown_tracer();
    result
}
