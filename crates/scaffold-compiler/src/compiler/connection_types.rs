// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `connection_types` section
//!
//! Cell type references are kept raw at init and resolved at finalize, once
//! every cell type exists.

use serde_json::Value;
use tracing::debug;

use super::builder::{require_array, require_string, ConfigBuilder, PendingConnectionType};
use crate::attributes::copy_attributes;
use crate::capabilities::ConnectionStrategy;
use crate::document::parser::value_kind;
use crate::models::{CellTypeId, ConnectionType, DEFAULT_FROM_COMPARTMENTS, DEFAULT_TO_COMPARTMENTS};
use crate::registry::{ClassRef, Parameters};
use crate::sections::Section;
use crate::types::{CompileError, CompileResult, NodePath};

const CONNECTION_RESERVED: &[&str] = &["class", "from_cell_types", "to_cell_types", "simulation"];

/// Resolved references of one direction
type Endpoints = (Vec<CellTypeId>, Vec<Vec<String>>);

impl<'c> ConfigBuilder<'c> {
    pub fn init_connection_type(&mut self, name: &str, section: &Section, node: &NodePath) -> CompileResult<()> {
        let class = require_string(section, "class", node)?;
        let mut strategy = self.registry.instantiate::<dyn ConnectionStrategy>(
            name,
            &ClassRef::named(class),
            &Parameters::new(),
            &node.child("class"),
        )?;
        copy_attributes(strategy.attributes_mut(), section, CONNECTION_RESERVED);

        let from_cell_types = require_array(section, "from_cell_types", node)?.clone();
        let to_cell_types = require_array(section, "to_cell_types", node)?.clone();
        self.pending_connections.insert(
            name.to_string(),
            PendingConnectionType {
                strategy,
                from_cell_types,
                to_cell_types,
            },
        );
        Ok(())
    }

    pub fn finalize_connection_type(&mut self, name: &str, _section: &Section, node: &NodePath) -> CompileResult<()> {
        let Some(pending) = self.pending_connections.shift_remove(name) else {
            return Ok(());
        };
        let PendingConnectionType {
            mut strategy,
            from_cell_types,
            to_cell_types,
        } = pending;

        let (from_ids, from_compartments) =
            self.resolve_endpoints(&from_cell_types, DEFAULT_FROM_COMPARTMENTS, &node.child("from_cell_types"))?;
        let (to_ids, to_compartments) =
            self.resolve_endpoints(&to_cell_types, DEFAULT_TO_COMPARTMENTS, &node.child("to_cell_types"))?;

        strategy.validate(node)?;
        self.report_unknown_attributes(&*strategy, node);

        debug!(target: "scaffold-compiler",
            "[SECTION] Connection type '{}': {} source(s), {} target(s)",
            name, from_ids.len(), to_ids.len()
        );
        self.connection_types.insert(
            name.to_string(),
            ConnectionType {
                name: name.to_string(),
                strategy,
                from_cell_types: from_ids,
                from_compartments,
                to_cell_types: to_ids,
                to_compartments,
            },
        );
        Ok(())
    }

    fn resolve_endpoints(&self, references: &[Value], default_compartments: &[&str], node: &NodePath) -> CompileResult<Endpoints> {
        let mut ids = Vec::with_capacity(references.len());
        let mut compartments = Vec::with_capacity(references.len());

        for (i, reference) in references.iter().enumerate() {
            let reference_node = node.child(i);
            let reference = reference.as_object().ok_or_else(|| {
                CompileError::configuration(
                    &reference_node,
                    format!("Expected a cell type reference, found {}", value_kind(reference)),
                )
            })?;
            let cell_type_name = require_string(reference, "type", &reference_node)?;
            let cell_type = self.cell_types.get(cell_type_name).ok_or_else(|| {
                CompileError::configuration(
                    &reference_node,
                    format!("Unknown cell type '{}'", cell_type_name),
                )
            })?;
            ids.push(cell_type.id);

            let tags = match reference.get("compartments") {
                None => default_compartments.iter().map(|c| c.to_string()).collect(),
                Some(Value::Array(tags)) => tags
                    .iter()
                    .enumerate()
                    .map(|(j, tag)| {
                        tag.as_str().map(str::to_string).ok_or_else(|| {
                            CompileError::configuration(
                                &reference_node.child("compartments").child(j),
                                format!("Expected a compartment name, found {}", value_kind(tag)),
                            )
                        })
                    })
                    .collect::<CompileResult<Vec<String>>>()?,
                Some(other) => {
                    return Err(CompileError::configuration(
                        &reference_node.child("compartments"),
                        format!("Expected a list of compartments, found {}", value_kind(other)),
                    ))
                }
            };
            compartments.push(tags);
        }
        Ok((ids, compartments))
    }
}
