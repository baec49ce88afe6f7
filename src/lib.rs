// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Scaffold - network configuration compiler
//!
//! Compiles a declarative network document (layers, cell types, connection
//! types, simulations) into a resolved, cross-referenced [`ScaffoldConfig`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scaffold::prelude::*;
//!
//! let settings = scaffold::load_settings_or_default(None, None)?;
//! let compiler = ConfigCompiler::with_settings(settings);
//! let config = compiler.compile_file("mouse_cerebellum")?;
//!
//! for (name, layer) in config.layers() {
//!     println!("{}: {:?}", name, layer.dimensions);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`logging`** (default): [`init_logging`] through `scaffold-observability`
//! - **`file-logging`**: JSON log files per run

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use scaffold_compiler as compiler;
pub use scaffold_config as settings;

pub use scaffold_compiler::{CompileError, CompileResult, ConfigCompiler, DocumentSource, NodePath, ScaffoldConfig};
pub use scaffold_config::{load_settings, load_settings_or_default, ScaffoldSettings};

#[cfg(feature = "logging")]
pub use scaffold_observability as observability;

/// Commonly used types
pub mod prelude {
    pub use scaffold_compiler::{
        ClassRef, CompileError, CompileResult, ConfigCompiler, Configurable, ConnectionStrategy, DocumentSource,
        Morphology, NodePath, OutputFormatter, PlacementStrategy, ScaffoldConfig, SimulationComponent,
        SimulatorAdapter, TypeRegistry,
    };
    pub use scaffold_config::ScaffoldSettings;
}

/// Logging configuration derived from the `[logging]` and `[compiler]`
/// settings
///
/// An explicit `logging.level` wins over the compiler verbosity; the default
/// level defers to it.
#[cfg(feature = "logging")]
pub fn logging_config(settings: &ScaffoldSettings) -> observability::LoggingConfig {
    let default_level = scaffold_config::LoggingSettings::default().level;
    let mut config = if settings.logging.level == default_level {
        observability::LoggingConfig::from_verbosity(settings.compiler.verbosity)
    } else {
        observability::LoggingConfig {
            level: settings.logging.level.clone(),
            ..Default::default()
        }
    };
    if settings.logging.json {
        config.format = observability::LogFormat::Json;
    }
    config
}

/// Install the global subscriber for `settings` and the process' debug flags
#[cfg(feature = "logging")]
pub fn init_logging(settings: &ScaffoldSettings) -> anyhow::Result<observability::LoggingGuard> {
    observability::init_logging(&logging_config(settings), &observability::parse_debug_flags())
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;

    #[test]
    fn test_logging_level_follows_verbosity() {
        let mut settings = ScaffoldSettings::default();
        settings.compiler.verbosity = 3;
        assert_eq!(logging_config(&settings).level, "debug");

        settings.logging.level = "error".to_string();
        settings.logging.json = true;
        let config = logging_config(&settings);
        assert_eq!(config.level, "error");
        assert_eq!(config.format, observability::LogFormat::Json);
    }
}
