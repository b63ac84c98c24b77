pub mod client;
pub mod logging;
pub mod password;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_GET: &str = "get";
pub const CMD_CHANGE_PASSWORD: &str = "change-password";

pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_REFERER: &str = "referer";
pub const ARG_PATH: &str = "path";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("uportal")
        .about("uPortal back-office client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in and store the session token")
                .arg(
                    Arg::new(ARG_USERNAME)
                        .long(ARG_USERNAME)
                        .help("Account name, prompted for when absent")
                        .env("UPORTAL_USERNAME"),
                )
                .arg(
                    Arg::new(ARG_PASSWORD)
                        .long(ARG_PASSWORD)
                        .help("Account password, prompted for when absent")
                        .env("UPORTAL_PASSWORD")
                        .hide_env_values(true),
                )
                .arg(
                    Arg::new(ARG_REFERER)
                        .long(ARG_REFERER)
                        .help("Route to return to after signing in"),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Forget the stored session token"))
        .subcommand(Command::new(CMD_WHOAMI).about("Show the account of the stored session"))
        .subcommand(
            Command::new(CMD_GET)
                .about("GET an API path with the session and print its data")
                .arg(
                    Arg::new(ARG_PATH)
                        .help("API path, example: /admin/recharge/plans")
                        .required(true),
                ),
        )
        .subcommand(password::with_args(
            Command::new(CMD_CHANGE_PASSWORD).about("Change the account password step by step"),
        ));

    let command = client::with_args(command);
    logging::with_args(command)
}
