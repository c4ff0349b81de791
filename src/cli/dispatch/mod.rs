use crate::cli::{
    actions::{server::Args, Action},
    commands::{self, session},
};
use anyhow::Result;
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(8080);
    let dsn = matches.get_one::<String>(commands::ARG_DSN).cloned();
    let db_username = matches
        .get_one::<String>(commands::ARG_DB_USERNAME)
        .cloned();
    let db_password = matches
        .get_one::<String>(commands::ARG_DB_PASSWORD)
        .cloned()
        .map(SecretString::from);
    let cors_origin = matches
        .get_one::<String>(commands::ARG_CORS_ORIGIN)
        .cloned();

    let session = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        db_username,
        db_password,
        cors_origin,
        session_cookie_name: session.cookie_name,
        session_ttl_seconds: session.ttl_seconds,
        session_cookie_secure: session.cookie_secure,
    }))
}
