use crate::cli::{
    actions::Action,
    commands::{self, logging::ARG_VERBOSITY},
    dispatch::handler,
    telemetry,
};
use anyhow::Result;
use clap::ArgMatches;
use tracing::Level;

/// Parse the command line, set up logging and return the action to run.
/// # Errors
/// Returns an error if telemetry cannot be initialized or arguments are inconsistent.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(get_verbosity_level(&matches))?;

    handler(&matches)
}

fn get_verbosity_level(matches: &ArgMatches) -> Option<Level> {
    let level = match matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0) {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    Some(level)
}
