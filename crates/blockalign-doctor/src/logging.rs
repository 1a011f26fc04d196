use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "BLOCKALIGN_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Filter from [`LOG_ENV`], or `warn` when unset or unparsable.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber. Stdout carries command output only.
///
/// A second call is a no-op.
pub fn init() {
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .with_target(false)
        .try_init();
}
