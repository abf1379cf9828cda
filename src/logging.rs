//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber on stdout.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stdout).with_ansi(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
            .try_init()
    };
}
