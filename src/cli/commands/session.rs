use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_SESSION_COOKIE_NAME: &str = "session-cookie-name";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";

#[derive(Debug)]
pub struct Options {
    pub cookie_name: String,
    pub ttl_seconds: u64,
    pub cookie_secure: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            cookie_name: matches
                .get_one::<String>(ARG_SESSION_COOKIE_NAME)
                .cloned()
                .context("missing required argument: --session-cookie-name")?,
            ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .context("missing required argument: --session-ttl-seconds")?,
            cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_COOKIE_NAME)
                .long(ARG_SESSION_COOKIE_NAME)
                .help("Name of the session cookie")
                .env("AUTHGATE_SESSION_COOKIE_NAME")
                .default_value("authgate_session"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session lifetime in seconds")
                .env("AUTHGATE_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("AUTHGATE_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}
