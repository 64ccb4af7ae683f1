//! Subscriber installation.
//!
//! Filtering comes from `RUST_LOG` and falls back to `info`. Credentials and
//! token strings are never recorded by the portal crates, so both formats are
//! safe to ship to a log collector.

use tracing_subscriber::EnvFilter;

use crate::LogFormat;

/// Install the global subscriber. Later calls are no-ops.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(%format, "logging initialized");
    }
}
