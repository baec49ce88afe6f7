//! Observability configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text or json)
    pub format: LogFormat,

    /// Directory for per-run log files (only used with `file-logging`)
    pub log_dir: Option<PathBuf>,
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Build a logging configuration from the compiler's verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        LoggingConfig {
            level: verbosity_level(verbosity).to_string(),
            ..Default::default()
        }
    }
}

/// Map the compiler verbosity (0-3) to a tracing level name
///
/// 0: errors only, 1: + warnings, 2: + progress reports, 3: + details
pub fn verbosity_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(verbosity_level(0), "error");
        assert_eq!(verbosity_level(1), "warn");
        assert_eq!(verbosity_level(2), "info");
        assert_eq!(verbosity_level(3), "debug");
        assert_eq!(verbosity_level(7), "debug");
        assert_eq!(LoggingConfig::from_verbosity(2).level, "info");
    }
}
