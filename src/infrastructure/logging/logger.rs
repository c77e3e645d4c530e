//! Logger initialization using tracing.

use anyhow::{anyhow, Result};
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::domain::models::LoggingConfig;

/// Holds the non-blocking writer guard; dropping it flushes file output.
pub struct Logger {
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Initialize the global subscriber from configuration.
    ///
    /// Stdout gets the configured format; when `log_dir` is set, a daily
    /// rolling file additionally receives JSON lines.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

        let guard = if let Some(ref log_dir) = config.log_dir {
            let file_appender = rolling::daily(log_dir, "shiftwatch.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true);

            match config.format.as_str() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(file_layer)
                        .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                        .init();
                }
                "pretty" => {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(file_layer)
                        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                        .init();
                }
                other => return Err(anyhow!("unknown log format: {other}")),
            }
            Some(guard)
        } else {
            match config.format.as_str() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                        .init();
                }
                "pretty" => {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                        .init();
                }
                other => return Err(anyhow!("unknown log format: {other}")),
            }
            None
        };

        Ok(Self { _guard: guard })
    }
}
