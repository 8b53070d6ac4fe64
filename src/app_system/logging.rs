use tracing_subscriber::fmt::time::{uptime, SystemTime};
use tracing_subscriber::EnvFilter;

use super::LogFormat;

/// Configure tracing once at startup for the whole process.
///
/// `RUST_LOG` controls verbosity (default `info`):
/// ```bash
/// RUST_LOG=debug cargo run
/// RUST_LOG=inventory_tracker::change_bus=debug,info cargo run
/// ```
/// Later calls are no-ops.
pub fn setup_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let _ = match format {
        LogFormat::Compact => builder.with_timer(uptime()).compact().try_init(),
        LogFormat::Json => builder
            .json()
            .with_timer(SystemTime)
            .with_target(false)
            .try_init(),
    };
}
