//! Logging bootstrap using `tracing` and `tracing-subscriber`.
//!
//! - `error`: fatal pipeline failures
//! - `warn`: recovered conditions (coerced values, crosswalk collisions)
//! - `info`: pipeline stage progress and summary counts
//! - `debug`: per-sheet detail

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::fmt;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Honor `RUST_LOG` when no explicit verbosity flag was given.
    pub use_env_filter: bool,
    pub format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            format: LogFormat::default(),
            log_file: None,
            with_ansi: true,
        }
    }
}

pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = if config.use_env_filter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level_filter.to_string()))
    } else {
        EnvFilter::new(config.level_filter.to_string())
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.with_ansi);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            let builder = builder
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false);
            match config.format {
                LogFormat::Pretty => builder.init(),
                LogFormat::Compact => builder.compact().init(),
                LogFormat::Json => builder.json().init(),
            }
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            match config.format {
                LogFormat::Pretty => builder.init(),
                LogFormat::Compact => builder.compact().init(),
                LogFormat::Json => builder.json().init(),
            }
        }
    }
    Ok(())
}
