//! Diagnostic logging for the binary
//!
//! Logs go to stderr so they never mix with generated code on stdout. The
//! filter comes from `CURLSHARP_LOG` (same syntax as `RUST_LOG`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

pub const LOG_ENV: &str = "CURLSHARP_LOG";

/// Install the global subscriber
///
/// Without `CURLSHARP_LOG` nothing is logged unless `verbose` is set, which
/// enables `debug`. Conversion warnings are printed by the driver itself.
/// Calling this twice is a no-op.
pub fn init_logging(format: LogFormat, verbose: bool) {
    let fallback = if verbose { "debug" } else { "off" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}
