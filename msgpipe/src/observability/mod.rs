//! Logging setup.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. Returns false if a
/// global subscriber was already installed, in which case nothing changes.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
