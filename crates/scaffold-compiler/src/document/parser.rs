// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Document parsing into a generic value tree

use serde_json::{Map, Value};

use super::loader::RawDocument;
use crate::types::{CompileError, CompileResult, NodePath};

/// A textual document format
pub trait DocumentFormat {
    /// File extension of the format, without the dot
    fn extension(&self) -> &'static str;

    /// Parse raw text into a value tree
    fn parse(&self, source_name: &str, text: &str) -> CompileResult<Value>;
}

/// JSON documents
///
/// Object keys keep their document order, which is the order entries of a
/// collection are initialised in.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl DocumentFormat for JsonFormat {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn parse(&self, source_name: &str, text: &str) -> CompileResult<Value> {
        serde_json::from_str(text).map_err(|e| CompileError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        })
    }
}

/// Parse a raw document and check that its root is a mapping
pub fn parse_document(format: &dyn DocumentFormat, document: &RawDocument) -> CompileResult<Map<String, Value>> {
    match format.parse(&document.name, &document.text)? {
        Value::Object(root) => Ok(root),
        other => Err(CompileError::configuration(
            &NodePath::root(),
            format!("The document root must be a mapping, found {}", value_kind(&other)),
        )),
    }
}

/// Human-readable name of a JSON value's kind, for error messages
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawDocument {
        RawDocument {
            name: "test.json".to_string(),
            path: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_keys_keep_document_order() {
        let root = parse_document(&JsonFormat, &raw(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#)).unwrap();
        let keys: Vec<&str> = root.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = parse_document(&JsonFormat, &raw("{\n  \"layers\": [,]\n}")).unwrap_err();
        match err {
            CompileError::Parse { source_name, line, .. } => {
                assert_eq!(source_name, "test.json");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = parse_document(&JsonFormat, &raw("[1, 2]")).unwrap_err();
        assert!(matches!(err, CompileError::Configuration { .. }));
    }
}
