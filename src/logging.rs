//! Tracing setup.
//!
//! Logs always go to stderr: in server mode stdout carries the LSP stream.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "PHPANTOM_LOG";

/// Build the filter: `PHPANTOM_LOG` wins, then `level`, then `info`.
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber.  Calling it twice is harmless; the
/// second call leaves the first subscriber in place.
pub fn init_logging(level: Option<&str>) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(stderr_layer)
        .try_init();
}
