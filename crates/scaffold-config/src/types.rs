// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Settings type definitions
//!
//! Each struct maps to a table in `scaffold_settings.toml`. Every table is
//! optional; missing values fall back to their `Default`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root settings structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScaffoldSettings {
    pub documents: DocumentSettings,
    pub compiler: CompilerSettings,
    pub logging: LoggingSettings,
}

/// Where configuration documents are looked up
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Directories searched, in order, when a document is not found at the
    /// path it was given with
    pub search_paths: Vec<PathBuf>,
    /// Extension appended to document names that lack it (without the dot)
    pub extension: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("configurations")],
            extension: "json".to_string(),
        }
    }
}

/// Compiler behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// 0: errors only, 1: + warnings, 2: + progress, 3: + details
    pub verbosity: u8,
    /// Warn about section keys that built-in strategies do not recognise
    pub strict_attributes: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            verbosity: 1,
            strict_attributes: false,
        }
    }
}

/// Log output
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
