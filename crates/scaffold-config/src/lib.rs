// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Scaffold Settings
//!
//! Settings for the scaffold configuration compiler, layered as:
//! - TOML file (`scaffold_settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! Settings describe *how* the compiler runs (where documents are searched,
//! how verbose it is). The network document itself is compiled by
//! `scaffold-compiler`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scaffold_config::load_settings_or_default;
//!
//! let settings = load_settings_or_default(None, None).expect("Failed to load settings");
//! println!("Verbosity: {}", settings.compiler.verbosity);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_settings_file, load_settings,
    load_settings_or_default, SETTINGS_FILE_NAME,
};
pub use types::*;
pub use validation::{validate_settings, SettingsValidationError};

/// Re-export for convenience
pub use serde;

/// Settings error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Settings file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for SettingsError {
    fn from(err: toml::de::Error) -> Self {
        SettingsError::ParseError(err.to_string())
    }
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ScaffoldSettings::default();
        assert!(validate_settings(&settings).is_ok());
    }
}
