// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Raw document loading
//!
//! A file document is looked up first at the path it was given with, then in
//! every configured search directory. The settings extension is appended to
//! names that lack it.

use std::fs;
use std::path::{Path, PathBuf};

use scaffold_config::DocumentSettings;
use tracing::debug;

use crate::types::{CompileError, CompileResult};

/// Name reported for documents read from memory
pub const STREAM_NAME: &str = "<stream>";

/// Where a configuration document comes from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A document file, resolved against the search paths
    File(PathBuf),
    /// Document text that is already in memory
    Stream(String),
}

impl DocumentSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DocumentSource::File(path.into())
    }

    pub fn stream(text: impl Into<String>) -> Self {
        DocumentSource::Stream(text.into())
    }
}

/// Raw document text and the name it was loaded under
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// File name (without directories) or [`STREAM_NAME`]
    pub name: String,
    /// Resolved file path, `None` for streams
    pub path: Option<PathBuf>,
    pub text: String,
}

/// Append the settings extension to a document name that lacks it
fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let suffix = format!(".{}", extension);
    if path.to_string_lossy().ends_with(&suffix) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Find the file a document name refers to
///
/// Returns the first existing candidate, or [`CompileError::DocumentNotFound`]
/// listing every location that was tried.
pub fn resolve_document_path(path: &Path, settings: &DocumentSettings) -> CompileResult<PathBuf> {
    let file = with_extension(path, &settings.extension);

    let mut candidates = vec![file.clone()];
    if file.is_relative() {
        candidates.extend(settings.search_paths.iter().map(|dir| dir.join(&file)));
    }

    for candidate in &candidates {
        if candidate.is_file() {
            debug!(target: "scaffold-compiler", "[DOCUMENT] Resolved '{}' to {}", path.display(), candidate.display());
            return Ok(candidate.clone());
        }
    }

    Err(CompileError::DocumentNotFound {
        name: file.display().to_string(),
        searched: candidates,
    })
}

/// Read the raw text of a document
///
/// The file handle is only held for the duration of the read.
pub fn read_document(source: &DocumentSource, settings: &DocumentSettings) -> CompileResult<RawDocument> {
    match source {
        DocumentSource::Stream(text) => Ok(RawDocument {
            name: STREAM_NAME.to_string(),
            path: None,
            text: text.clone(),
        }),
        DocumentSource::File(path) => {
            let resolved = resolve_document_path(path, settings)?;
            let text = fs::read_to_string(&resolved).map_err(|e| CompileError::Io {
                path: resolved.clone(),
                message: e.to_string(),
            })?;
            let name = resolved
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| resolved.display().to_string());
            Ok(RawDocument {
                name,
                path: Some(resolved),
                text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_with(dir: &Path) -> DocumentSettings {
        DocumentSettings {
            search_paths: vec![dir.to_path_buf()],
            extension: "json".to_string(),
        }
    }

    #[test]
    fn test_extension_appended_once() {
        assert_eq!(with_extension(Path::new("mouse"), "json"), PathBuf::from("mouse.json"));
        assert_eq!(with_extension(Path::new("mouse.json"), "json"), PathBuf::from("mouse.json"));
    }

    #[test]
    fn test_found_in_search_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mouse_cerebellum.json"), "{}").unwrap();

        let doc = read_document(
            &DocumentSource::file("mouse_cerebellum"),
            &settings_with(dir.path()),
        )
        .unwrap();
        assert_eq!(doc.name, "mouse_cerebellum.json");
        assert_eq!(doc.text, "{}");
    }

    #[test]
    fn test_not_found_lists_search_locations() {
        let dir = TempDir::new().unwrap();
        let err = read_document(&DocumentSource::file("missing"), &settings_with(dir.path())).unwrap_err();
        match err {
            CompileError::DocumentNotFound { name, searched } => {
                assert_eq!(name, "missing.json");
                assert_eq!(searched.len(), 2);
                assert_eq!(searched[1], dir.path().join("missing.json"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_stream_source() {
        let doc = read_document(&DocumentSource::stream("{\"a\": 1}"), &DocumentSettings::default()).unwrap();
        assert_eq!(doc.name, STREAM_NAME);
        assert!(doc.path.is_none());
    }
}
