pub mod logging;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_DB_USERNAME: &str = "db-username";
pub const ARG_DB_PASSWORD: &str = "db-password";
pub const ARG_CORS_ORIGIN: &str = "cors-origin";

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

    let command = Command::new("authgate")
        .about("Session-based authentication API")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("AUTHGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .long_help(
                    "Postgres connection string. When omitted, users and sessions are kept in memory and lost on restart.",
                )
                .env("AUTHGATE_DSN"),
        )
        .arg(
            Arg::new(ARG_DB_USERNAME)
                .long(ARG_DB_USERNAME)
                .help("Database username, injected into the DSN")
                .env("AUTHGATE_DB_USERNAME")
                .requires(ARG_DSN),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long(ARG_DB_PASSWORD)
                .help("Database password, injected into the DSN")
                .env("AUTHGATE_DB_PASSWORD")
                .hide_env_values(true)
                .requires(ARG_DSN),
        )
        .arg(
            Arg::new(ARG_CORS_ORIGIN)
                .long(ARG_CORS_ORIGIN)
                .help("Allowed CORS origin (credentials enabled), example: https://app.example.com")
                .env("AUTHGATE_CORS_ORIGIN"),
        );

    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 9] = [
        "AUTHGATE_PORT",
        "AUTHGATE_DSN",
        "AUTHGATE_DB_USERNAME",
        "AUTHGATE_DB_PASSWORD",
        "AUTHGATE_CORS_ORIGIN",
        "AUTHGATE_LOG_LEVEL",
        "AUTHGATE_SESSION_COOKIE_NAME",
        "AUTHGATE_SESSION_TTL_SECONDS",
        "AUTHGATE_SESSION_COOKIE_SECURE",
    ];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        ENV_VARS.iter().map(|name| (*name, None)).collect()
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "authgate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Session-based authentication API".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_dsn() {
        temp_env::with_vars(unset_all(), || {
            let command = new();
            let matches = command.get_matches_from(vec![
                "authgate",
                "--port",
                "8080",
                "--dsn",
                "postgres://localhost:5432/authgate",
                "--db-username",
                "authgate",
                "--db-password",
                "secret",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<String>(ARG_DSN).cloned(),
                Some("postgres://localhost:5432/authgate".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(ARG_DB_USERNAME).cloned(),
                Some("authgate".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(ARG_DB_PASSWORD).cloned(),
                Some("secret".to_string())
            );
        });
    }

    #[test]
    fn test_dsn_is_optional() {
        temp_env::with_vars(unset_all(), || {
            let matches = new().get_matches_from(vec!["authgate"]);
            assert_eq!(matches.get_one::<String>(ARG_DSN), None);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
        });
    }

    #[test]
    fn test_db_credentials_require_dsn() {
        temp_env::with_vars(unset_all(), || {
            let result = new().try_get_matches_from(vec!["authgate", "--db-username", "u"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("AUTHGATE_PORT", Some("443")),
                ("AUTHGATE_DSN", Some("postgres://localhost:5432/authgate")),
                ("AUTHGATE_CORS_ORIGIN", Some("https://app.example.com")),
                ("AUTHGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["authgate"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(ARG_DSN).cloned(),
                    Some("postgres://localhost:5432/authgate".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_CORS_ORIGIN).cloned(),
                    Some("https://app.example.com".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("AUTHGATE_LOG_LEVEL", Some(level))], || {
                let command = new();
                let matches = command.get_matches_from(vec!["authgate"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("AUTHGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["authgate".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
