use crate::config::ClientConfig;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;

pub const ARG_MIN_LENGTH: &str = "min-length";
pub const ARG_FLOW_TTL: &str = "flow-ttl";
pub const ARG_SKIP_OLD_CHECK: &str = "skip-old-password-check";

/// Apply the password-change arguments to `config`.
pub fn apply(matches: &ArgMatches, config: &mut ClientConfig) {
    if let Some(min) = matches.get_one::<usize>(ARG_MIN_LENGTH) {
        config.min_password_len = *min;
    }
    if let Some(ttl) = matches.get_one::<u64>(ARG_FLOW_TTL) {
        config.flow_ttl = Duration::from_secs(*ttl);
    }
    config.verify_old_password = !matches.get_flag(ARG_SKIP_OLD_CHECK);
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MIN_LENGTH)
                .long(ARG_MIN_LENGTH)
                .help("Minimum length of the new password")
                .env("UPORTAL_MIN_PASSWORD_LEN")
                .default_value("6")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new(ARG_FLOW_TTL)
                .long(ARG_FLOW_TTL)
                .help("Seconds the entered passwords are kept between steps")
                .env("UPORTAL_FLOW_TTL")
                .default_value("600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SKIP_OLD_CHECK)
                .long(ARG_SKIP_OLD_CHECK)
                .help("Do not compare the old password with the session before submitting")
                .env("UPORTAL_SKIP_OLD_PASSWORD_CHECK")
                .action(ArgAction::SetTrue),
        )
}
