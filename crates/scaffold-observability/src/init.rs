// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always installed; with the `file-logging` feature a JSON
//! log file is written into a timestamped run folder as well.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Logging initialization result
///
/// Keep it alive for as long as logs should be flushed.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder the log files are written to, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the `EnvFilter` directive string for a configuration and flags
pub fn filter_directives(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> String {
    debug_flags.to_filter_string(&config.level.to_lowercase())
}

/// Initialize the global subscriber
///
/// # Errors
///
/// Fails if the filter directives are invalid, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    let directives = filter_directives(config, debug_flags);
    let env_filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter: {}", directives))?;

    let mut layers = Vec::new();

    let console_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter.clone())
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(env_filter.clone())
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = match &config.log_dir {
        Some(base_log_dir) => {
            let (layer, guard, run_folder) = file_layer(base_log_dir, env_filter)?;
            layers.push(layer);
            (vec![guard], Some(run_folder))
        }
        None => (Vec::new(), None),
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

#[cfg(feature = "file-logging")]
type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// JSON file layer writing into a timestamped run folder under `base_log_dir`
#[cfg(feature = "file-logging")]
fn file_layer(
    base_log_dir: &Path,
    env_filter: EnvFilter,
) -> Result<(BoxedLayer, tracing_appender::non_blocking::WorkerGuard, PathBuf)> {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_folder = base_log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    let appender = tracing_appender::rolling::never(&run_folder, "scaffold.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(env_filter)
        .boxed();

    Ok((layer, guard, run_folder))
}

/// Initialize logging from a compiler verbosity level and the process flags
pub fn init_logging_for_verbosity(verbosity: u8) -> Result<LoggingGuard> {
    init_logging(
        &LoggingConfig::from_verbosity(verbosity),
        &crate::cli::parse_debug_flags(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_lowercase_level() {
        let config = LoggingConfig {
            level: "WARN".to_string(),
            ..Default::default()
        };
        let flags = CrateDebugFlags::from_args(vec!["--debug-scaffold-config".to_string()]);
        assert_eq!(filter_directives(&config, &flags), "scaffold-config=debug,warn");
        assert!(EnvFilter::try_new(filter_directives(&config, &flags)).is_ok());
    }
}
