//! Installs the `tracing` subscriber, filtered by [`GlobalConfig::log_level`].

use std::io::IsTerminal;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Error, GlobalConfig, LogLevel};

/// Overrides the directive built from the configured log level.
const LOG_VAR: &str = "RUST_LOG";

/// The crates targeted by the default log level.
const TARGET_CRATES: [&str; 2] = ["ibc_multihop_relayer", "ibc_multihop_types"];

/// A tracing directive setting the log level of the multi-hop crates to
/// `log_level`.
pub fn default_directive(log_level: LogLevel) -> String {
    TARGET_CRATES
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn build_tracing_filter(log_level: LogLevel) -> Result<EnvFilter, Error> {
    let directive =
        std::env::var(LOG_VAR).unwrap_or_else(|_| default_directive(log_level));

    parse_filter(directive)
}

fn parse_filter(directive: String) -> Result<EnvFilter, Error> {
    EnvFilter::try_new(&directive).map_err(|e| Error::invalid_log_directive(directive, e))
}

/// Installs a global subscriber writing to stderr, as JSON lines when `json`
/// is set. Fails if a global subscriber is already installed.
pub fn init_tracing(config: &GlobalConfig, json: bool) -> Result<(), Error> {
    let filter = build_tracing_filter(config.log_level)?;

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(true);

    if json {
        builder
            .with_ansi(false)
            .json()
            .finish()
            .try_init()
            .map_err(Error::tracing_init)
    } else {
        builder
            .with_ansi(enable_ansi())
            .finish()
            .try_init()
            .map_err(Error::tracing_init)
    }
}

/// Colored output only when both stdout and stderr are terminals.
pub fn enable_ansi() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
