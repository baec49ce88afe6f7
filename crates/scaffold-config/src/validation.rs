// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Settings validation
//!
//! Collects every problem before failing so a broken settings file can be
//! fixed in one pass.

use crate::{ScaffoldSettings, SettingsError, SettingsResult};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

/// Validation errors that can occur during settings validation
#[derive(Debug, Clone)]
pub enum SettingsValidationError {
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for SettingsValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid settings value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete settings
///
/// # Errors
///
/// Returns `SettingsError::ValidationError` listing every problem found
pub fn validate_settings(settings: &ScaffoldSettings) -> SettingsResult<()> {
    let mut errors = Vec::new();

    let extension = &settings.documents.extension;
    if extension.is_empty() || extension.starts_with('.') {
        errors.push(SettingsValidationError::InvalidValue {
            field: "documents.extension".to_string(),
            reason: format!("'{}' must be a non-empty extension without a leading dot", extension),
        });
    }

    if settings.compiler.verbosity > 3 {
        errors.push(SettingsValidationError::InvalidValue {
            field: "compiler.verbosity".to_string(),
            reason: format!("{} is outside the range 0-3", settings.compiler.verbosity),
        });
    }

    let level = settings.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(SettingsValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", settings.logging.level, LOG_LEVELS.join(", ")),
        });
    }

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(SettingsError::ValidationError(format!(
            "Settings validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_errors_are_reported() {
        let mut settings = ScaffoldSettings::default();
        settings.documents.extension = ".json".to_string();
        settings.compiler.verbosity = 9;
        settings.logging.level = "loud".to_string();

        let err = validate_settings(&settings).unwrap_err().to_string();
        assert!(err.contains("documents.extension"));
        assert!(err.contains("compiler.verbosity"));
        assert!(err.contains("logging.level"));
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut settings = ScaffoldSettings::default();
        settings.logging.level = "WARNING".to_string();
        assert!(validate_settings(&settings).is_ok());
    }
}
