// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Build state of one compilation
//!
//! Entities are placed into name-indexed arenas while a collection is
//! initialised; finalizers resolve cross-references by lookup into the same
//! arenas.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::attributes::{coerce_f64, unknown_attributes, Configurable};
use crate::capabilities::{ConnectionStrategy, OutputFormatter, SimulatorAdapter};
use crate::config::ScaffoldConfig;
use crate::document::parser::value_kind;
use crate::models::{CellType, ConnectionType, Layer, Simulation, Stack, Volume};
use crate::registry::{ClassRef, TypeRegistry};
use crate::sections::Section;
use crate::types::{CompileError, CompileResult, NodePath};

/// A connection type whose cell type references are not resolved yet
#[derive(Debug)]
pub(crate) struct PendingConnectionType {
    pub strategy: Box<dyn ConnectionStrategy>,
    pub from_cell_types: Vec<Value>,
    pub to_cell_types: Vec<Value>,
}

pub(crate) struct ConfigBuilder<'c> {
    pub registry: &'c TypeRegistry,
    pub simulators: &'c IndexMap<String, ClassRef<dyn SimulatorAdapter>>,
    pub strict_attributes: bool,
    pub volume: Volume,
    pub output_formatter: Option<Box<dyn OutputFormatter>>,
    pub layers: IndexMap<String, Layer>,
    pub stacks: BTreeMap<i64, Stack>,
    pub cell_types: IndexMap<String, CellType>,
    pub pending_connections: IndexMap<String, PendingConnectionType>,
    pub connection_types: IndexMap<String, ConnectionType>,
    pub simulations: IndexMap<String, Simulation>,
}

impl<'c> ConfigBuilder<'c> {
    pub fn new(
        registry: &'c TypeRegistry,
        simulators: &'c IndexMap<String, ClassRef<dyn SimulatorAdapter>>,
        strict_attributes: bool,
    ) -> Self {
        Self {
            registry,
            simulators,
            strict_attributes,
            volume: Volume { x: 0.0, z: 0.0 },
            output_formatter: None,
            layers: IndexMap::new(),
            stacks: BTreeMap::new(),
            cell_types: IndexMap::new(),
            pending_connections: IndexMap::new(),
            connection_types: IndexMap::new(),
            simulations: IndexMap::new(),
        }
    }

    /// Warn about keys a built-in implementation does not use
    pub fn report_unknown_attributes<T: Configurable + ?Sized>(&self, target: &T, node: &NodePath) {
        if self.strict_attributes {
            warn_unknown_attributes(target, node);
        }
    }

    pub fn into_config(self, source_name: String, raw: String) -> CompileResult<ScaffoldConfig> {
        let output_formatter = self
            .output_formatter
            .ok_or_else(|| CompileError::MissingSection {
                node: NodePath::root(),
                key: "output".to_string(),
            })?;
        Ok(ScaffoldConfig {
            source_name,
            raw,
            volume: self.volume,
            output_formatter,
            layers: self.layers,
            stacks: self.stacks,
            cell_types: self.cell_types,
            connection_types: self.connection_types,
            simulations: self.simulations,
        })
    }
}

pub(crate) fn warn_unknown_attributes<T: Configurable + ?Sized>(target: &T, node: &NodePath) {
    for key in unknown_attributes(target) {
        warn!(target: "scaffold-compiler",
            "⚠️  [COMPILE] Unknown attribute '{}' for {} in {}",
            key, target.class_name(), node
        );
    }
}

/// String value of a required key
pub(crate) fn require_string<'a>(section: &'a Section, key: &str, node: &NodePath) -> CompileResult<&'a str> {
    match section.get(key) {
        None => Err(CompileError::missing_field(node, key)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(CompileError::configuration(
            &node.child(key),
            format!("Expected a string, found {}", value_kind(other)),
        )),
    }
}

/// Float value of a required key
pub(crate) fn require_f64(section: &Section, key: &str, node: &NodePath) -> CompileResult<f64> {
    let value = section.get(key).ok_or_else(|| CompileError::missing_field(node, key))?;
    coerce_f64(value, &node.child(key))
}

/// Array value of a required key
pub(crate) fn require_array<'a>(section: &'a Section, key: &str, node: &NodePath) -> CompileResult<&'a Vec<Value>> {
    match section.get(key) {
        None => Err(CompileError::missing_field(node, key)),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(CompileError::configuration(
            &node.child(key),
            format!("Expected an array, found {}", value_kind(other)),
        )),
    }
}

/// Boolean flag, `default` when absent
pub(crate) fn optional_bool(section: &Section, key: &str, default: bool, node: &NodePath) -> CompileResult<bool> {
    match section.get(key) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(CompileError::configuration(
            &node.child(key),
            format!("Expected a boolean, found {}", value_kind(other)),
        )),
    }
}

/// Exactly three coordinates
pub(crate) fn float_triple(value: &Value, node: &NodePath) -> CompileResult<[f64; 3]> {
    let items = match value {
        Value::Array(items) if items.len() == 3 => items,
        _ => {
            return Err(CompileError::configuration(
                node,
                format!("Invalid position '{}': expected exactly 3 numbers", value),
            ))
        }
    };
    let mut triple = [0.0; 3];
    for (i, item) in items.iter().enumerate() {
        triple[i] = coerce_f64(item, &node.child(i))?;
    }
    Ok(triple)
}
