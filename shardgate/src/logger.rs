//! Logging setup.

use std::io::IsTerminal;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shardgate_config::LogFormat;

use crate::config::config;

/// Install the global tracing subscriber.
///
/// Level defaults to INFO and is overridden with `RUST_LOG`.
/// Output format comes from `general.log_format`.
pub fn logger() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);

    match config().general.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_file(false),
            )
            .init(),
    }
}
