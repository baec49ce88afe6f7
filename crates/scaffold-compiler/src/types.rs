// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for the configuration compiler.

Every error that concerns a document node carries its dotted [`NodePath`]
(e.g. `connection_types.pf_goc.from_cell_types.0`) so a failure can be located
without a stack trace.
*/

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Dotted location of a node inside the configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a top-level section
    pub fn of(segment: impl Into<String>) -> Self {
        Self::root().child(segment.into())
    }

    /// Path of a child node
    pub fn child(&self, segment: impl ToString) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, or `None` for the root
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "configuration")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Error types for configuration compilation
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Could not find the configuration document '{name}' in any of these locations: {}", display_paths(.searched))]
    DocumentNotFound { name: String, searched: Vec<PathBuf> },

    #[error("I/O error reading '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("Error while parsing {source_name}: {message} (line {line}, column {column})")]
    Parse {
        source_name: String,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Missing '{key}' section in {node}")]
    MissingSection { node: NodePath, key: String },

    #[error("Missing '{key}' attribute in {node}")]
    MissingField { node: NodePath, key: String },

    #[error("Class not found: '{qualified_name}' (specified in {node})")]
    TypeNotFound { node: NodePath, qualified_name: String },

    #[error("Configurable class '{type_name}' specified in {node} must implement {expected}")]
    CapabilityMismatch {
        node: NodePath,
        type_name: String,
        expected: String,
    },

    #[error("Invalid configuration in {node}: {message}")]
    Configuration { node: NodePath, message: String },

    #[error("Unknown simulator '{simulator}' in {node}. Registered simulators: {}", .known.join(", "))]
    UnknownSimulator {
        node: NodePath,
        simulator: String,
        known: Vec<String>,
    },

    #[error("Simulation kernel '{kernel}' is locked: {message}")]
    KernelLocked { kernel: String, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CompileError {
    /// Shorthand for a [`CompileError::Configuration`]
    pub fn configuration(node: &NodePath, message: impl Into<String>) -> Self {
        CompileError::Configuration {
            node: node.clone(),
            message: message.into(),
        }
    }

    pub fn missing_field(node: &NodePath, key: &str) -> Self {
        CompileError::MissingField {
            node: node.clone(),
            key: key.to_string(),
        }
    }

    /// Document node the error refers to, if any
    pub fn node(&self) -> Option<&NodePath> {
        match self {
            CompileError::MissingSection { node, .. }
            | CompileError::MissingField { node, .. }
            | CompileError::TypeNotFound { node, .. }
            | CompileError::CapabilityMismatch { node, .. }
            | CompileError::Configuration { node, .. }
            | CompileError::UnknownSimulator { node, .. } => Some(node),
            CompileError::DocumentNotFound { .. }
            | CompileError::Io { .. }
            | CompileError::Parse { .. }
            | CompileError::KernelLocked { .. } => None,
        }
    }
}
