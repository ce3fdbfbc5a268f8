//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt subscriber writing to stderr. The
//! filter comes from `PACTLINE_LOG`, else the `-v` count, else
//! `logging.level` from the config.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub const ENV_LOG: &str = "PACTLINE_LOG";

/// Pick the filter directive by precedence
pub fn filter_directive(env: Option<String>, verbosity: u8, logging: &LoggingConfig) -> String {
    if let Some(directive) = env.filter(|d| !d.trim().is_empty()) {
        return directive;
    }
    match verbosity {
        0 => logging.level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbosity: u8, logging: &LoggingConfig) {
    let directive = filter_directive(std::env::var(ENV_LOG).ok(), verbosity, logging);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
