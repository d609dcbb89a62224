//! Structured logging with tracing
//!
//! Configures the tracing subscriber once at startup: level filter from the
//! `LIBRIS_LOG` environment variable or the configured level, optional JSON
//! output, optional daily-rotated file appender. The MCP transport owns
//! stdout, so console logs go to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use libris_domain::error::Result;

use crate::config::LoggingConfig;
use crate::constants::LOG_FILTER_ENV;

/// Initialize logging with the provided configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));
    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| std::ffi::OsStr::new("libris")),
        )
    });

    let registry = Registry::default().with(filter);
    if config.json_format {
        let stderr = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer().json().with_writer(appender).with_ansi(false);
                registry.with(stderr).with(file).init();
            }
            None => registry.with(stderr).init(),
        }
    } else {
        let stderr = fmt::layer().with_writer(std::io::stderr).with_target(true);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer().with_writer(appender).with_ansi(false);
                registry.with(stderr).with(file).init();
            }
            None => registry.with(stderr).init(),
        }
    }

    tracing::info!(level = %config.level, "logging initialized");
    Ok(())
}
