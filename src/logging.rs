use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{NasMetricsError, Result};

/// Sets up the logging subscriber for the plugin.
///
/// Logs go to stderr; stdout is reserved for the values read by the host
/// agent. `RUST_LOG` overrides `default_level`.
pub fn init_logger(default_level: Level) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), default_level))
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| NasMetricsError::Internal(format!("Failed to initialize logger: {}", e)))
}
