// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Settings file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ScaffoldSettings, SettingsError, SettingsResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "scaffold_settings.toml";

/// Find the scaffold settings file
///
/// Search order:
/// 1. `SCAFFOLD_SETTINGS_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `SettingsError::FileNotFound` if no settings file is found in any location
pub fn find_settings_file() -> SettingsResult<PathBuf> {
    if let Ok(env_path) = env::var("SCAFFOLD_SETTINGS_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(SettingsError::FileNotFound(format!(
                "Settings file specified by SCAFFOLD_SETTINGS_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(SETTINGS_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(SETTINGS_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(SettingsError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SCAFFOLD_SETTINGS_PATH to specify a custom location.",
        SETTINGS_FILE_NAME, search_list
    )))
}

/// Load settings from a TOML file
///
/// # Arguments
///
/// * `settings_path` - Optional path to the settings file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found, contains invalid TOML, or fails validation
pub fn load_settings(
    settings_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> SettingsResult<ScaffoldSettings> {
    let settings_file = if let Some(path) = settings_path {
        path.to_path_buf()
    } else {
        find_settings_file()?
    };

    let content = fs::read_to_string(&settings_file)?;
    let mut settings: ScaffoldSettings = toml::from_str(&content)?;

    apply_environment_overrides(&mut settings);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut settings, cli);
    }

    crate::validate_settings(&settings)?;
    Ok(settings)
}

/// Like [`load_settings`], but a missing settings file yields the defaults
/// (with overrides still applied) instead of an error.
pub fn load_settings_or_default(
    settings_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> SettingsResult<ScaffoldSettings> {
    match load_settings(settings_path, cli_args) {
        Err(SettingsError::FileNotFound(_)) => {
            let mut settings = ScaffoldSettings::default();
            apply_environment_overrides(&mut settings);
            if let Some(cli) = cli_args {
                apply_cli_overrides(&mut settings, cli);
            }
            crate::validate_settings(&settings)?;
            Ok(settings)
        }
        other => other,
    }
}

/// Apply environment variable overrides
///
/// Supported environment variables:
/// - `SCAFFOLD_DOCUMENT_PATH` -> prepended to `documents.search_paths` (path-separator list)
/// - `SCAFFOLD_VERBOSITY` -> `compiler.verbosity`
/// - `SCAFFOLD_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(settings: &mut ScaffoldSettings) {
    if let Some(value) = env::var_os("SCAFFOLD_DOCUMENT_PATH") {
        let extra: Vec<PathBuf> = env::split_paths(&value).collect();
        prepend_search_paths(settings, extra);
    }
    if let Ok(value) = env::var("SCAFFOLD_VERBOSITY") {
        if let Ok(verbosity) = value.parse::<u8>() {
            settings.compiler.verbosity = verbosity;
        }
    }
    if let Ok(value) = env::var("SCAFFOLD_LOG_LEVEL") {
        settings.logging.level = value;
    }
}

/// Apply CLI argument overrides
///
/// # Arguments
///
/// * `settings` - Settings to modify
/// * `cli_args` - e.g. `{"verbosity": "3", "log_level": "debug", "document_path": "./configs"}`
pub fn apply_cli_overrides(settings: &mut ScaffoldSettings, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("verbosity") {
        if let Ok(verbosity) = value.parse::<u8>() {
            settings.compiler.verbosity = verbosity;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        settings.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("document_path") {
        prepend_search_paths(settings, vec![PathBuf::from(value)]);
    }
    if let Some(value) = cli_args.get("strict_attributes") {
        settings.compiler.strict_attributes = value.to_lowercase() == "true" || value == "1";
    }
}

fn prepend_search_paths(settings: &mut ScaffoldSettings, mut paths: Vec<PathBuf>) {
    paths.retain(|p| !p.as_os_str().is_empty());
    paths.extend(settings.documents.search_paths.drain(..));
    settings.documents.search_paths = paths;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_settings_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let settings_path = dir.path().join("custom_settings.toml");
        File::create(&settings_path).unwrap();

        env::set_var("SCAFFOLD_SETTINGS_PATH", settings_path.to_str().unwrap());
        let result = find_settings_file();
        env::remove_var("SCAFFOLD_SETTINGS_PATH");

        assert_eq!(result.unwrap(), settings_path);
    }

    #[test]
    fn test_missing_env_path_is_not_found() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("SCAFFOLD_SETTINGS_PATH", "/definitely/not/here.toml");
        let result = find_settings_file();
        env::remove_var("SCAFFOLD_SETTINGS_PATH");

        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_settings() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::remove_var("SCAFFOLD_VERBOSITY");
        env::remove_var("SCAFFOLD_DOCUMENT_PATH");
        let dir = tempdir().unwrap();
        let settings_path = dir.path().join(SETTINGS_FILE_NAME);

        let mut file = File::create(&settings_path).unwrap();
        writeln!(file, "[compiler]").unwrap();
        writeln!(file, "verbosity = 2").unwrap();
        writeln!(file, "[documents]").unwrap();
        writeln!(file, "search_paths = [\"networks\"]").unwrap();

        let settings = load_settings(Some(&settings_path), None).unwrap();

        assert_eq!(settings.compiler.verbosity, 2);
        assert_eq!(settings.documents.search_paths, vec![PathBuf::from("networks")]);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let settings_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&settings_path, "[compiler\nverbosity = ").unwrap();

        let result = load_settings(Some(&settings_path), None);
        assert!(matches!(result, Err(SettingsError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut settings = ScaffoldSettings::default();

        env::set_var("SCAFFOLD_VERBOSITY", "3");
        env::set_var("SCAFFOLD_LOG_LEVEL", "debug");
        env::set_var("SCAFFOLD_DOCUMENT_PATH", "/opt/networks");

        apply_environment_overrides(&mut settings);

        env::remove_var("SCAFFOLD_VERBOSITY");
        env::remove_var("SCAFFOLD_LOG_LEVEL");
        env::remove_var("SCAFFOLD_DOCUMENT_PATH");

        assert_eq!(settings.compiler.verbosity, 3);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.documents.search_paths[0], PathBuf::from("/opt/networks"));
        assert_eq!(settings.documents.search_paths[1], PathBuf::from("configurations"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = ScaffoldSettings::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("verbosity".to_string(), "0".to_string());
        cli_args.insert("strict_attributes".to_string(), "true".to_string());

        apply_cli_overrides(&mut settings, &cli_args);

        assert_eq!(settings.compiler.verbosity, 0);
        assert!(settings.compiler.strict_attributes);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let settings_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&settings_path, "[compiler]\nverbosity = 1\n[logging]\nlevel = \"warn\"\n")
            .unwrap();

        env::set_var("SCAFFOLD_VERBOSITY", "2");
        env::set_var("SCAFFOLD_LOG_LEVEL", "debug");

        let mut cli_args = HashMap::new();
        cli_args.insert("verbosity".to_string(), "3".to_string());

        let settings = load_settings(Some(&settings_path), Some(&cli_args)).unwrap();

        env::remove_var("SCAFFOLD_VERBOSITY");
        env::remove_var("SCAFFOLD_LOG_LEVEL");

        // CLI wins for verbosity, env wins for the log level (no CLI override)
        assert_eq!(settings.compiler.verbosity, 3);
        assert_eq!(settings.logging.level, "debug");
    }
}
