// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `cell_types` section: placement, morphology and plotting of each type

use serde_json::Value;
use tracing::debug;

use super::builder::{optional_bool, require_f64, require_string, ConfigBuilder};
use crate::attributes::{coerce_f64, copy_attributes};
use crate::capabilities::{Morphology, PlacementStrategy};
use crate::models::{CellType, CellTypeId, DensityMode, Placement, Plotting};
use crate::registry::{ClassRef, Parameters};
use crate::sections::{require_section, Section};
use crate::types::{CompileError, CompileResult, NodePath};

/// Keys of a placement block consumed by the compiler itself
const PLACEMENT_RESERVED: &[&str] = &[
    "class",
    "layer",
    "soma_radius",
    "density",
    "planar_density",
    "count",
    "placement_count_ratio",
    "density_ratio",
    "placement_relative_to",
];

const MORPHOLOGY_RESERVED: &[&str] = &["class"];

/// The single density mode declared in a placement block
fn density_mode(section: &Section, node: &NodePath) -> CompileResult<DensityMode> {
    let declared: Vec<&str> = DensityMode::KEYS
        .iter()
        .copied()
        .filter(|key| section.contains_key(*key))
        .collect();

    let key = match declared.as_slice() {
        [key] => *key,
        [] => {
            return Err(CompileError::configuration(
                node,
                format!("Missing one of the attributes {:?}", DensityMode::KEYS),
            ))
        }
        _ => {
            return Err(CompileError::configuration(
                node,
                format!("Only one of the attributes {:?} may be specified, found {:?}", DensityMode::KEYS, declared),
            ))
        }
    };

    let value = require_f64(section, key, node)?;
    let relative_to = if DensityMode::is_ratio_key(key) {
        Some(require_string(section, "placement_relative_to", node)?.to_string())
    } else {
        None
    };
    DensityMode::from_key(key, value, relative_to)
        .ok_or_else(|| CompileError::configuration(&node.child(key), "Unknown density mode"))
}

fn plotting(cell_type: &str, section: &Section, node: &NodePath) -> CompileResult<Plotting> {
    let mut plotting = Plotting::for_cell_type(cell_type);
    let Some(block) = section.get("plotting") else {
        return Ok(plotting);
    };
    let node = node.child("plotting");
    let block = block
        .as_object()
        .ok_or_else(|| CompileError::configuration(&node, "Expected a mapping"))?;

    if let Some(label) = block.get("display_name") {
        plotting.label = value_as_string(label, &node.child("display_name"))?;
    }
    if let Some(color) = block.get("color") {
        plotting.color = value_as_string(color, &node.child("color"))?;
    }
    if let Some(opacity) = block.get("opacity") {
        plotting.opacity = coerce_f64(opacity, &node.child("opacity"))?;
    }
    Ok(plotting)
}

fn value_as_string(value: &Value, node: &NodePath) -> CompileResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CompileError::configuration(node, format!("Expected a string, found {}", value)))
}

impl<'c> ConfigBuilder<'c> {
    pub fn init_cell_type(&mut self, name: &str, section: &Section, node: &NodePath) -> CompileResult<()> {
        let flagged_entity = optional_bool(section, "entity", false, node)?;
        let placement_section = require_section(section, "placement", node)?;
        let placement = self.init_placement(name, placement_section, flagged_entity, &node.child("placement"))?;
        let entity = flagged_entity || placement.strategy.is_entities();

        let morphology = if entity {
            None
        } else {
            let morphology_section = require_section(section, "morphology", node)?;
            Some(self.init_morphology(name, morphology_section, &node.child("morphology"))?)
        };

        let cell_type = CellType {
            name: name.to_string(),
            id: CellTypeId(self.cell_types.len()),
            placement,
            morphology,
            plotting: plotting(name, section, node)?,
            entity,
        };
        debug!(target: "scaffold-compiler",
            "[SECTION] Cell type '{}' ({:?}) in layer '{}'",
            name, cell_type.id, cell_type.placement.layer
        );
        self.cell_types.insert(name.to_string(), cell_type);
        Ok(())
    }

    fn init_placement(&self, cell_type: &str, section: &Section, entity: bool, node: &NodePath) -> CompileResult<Placement> {
        let class = require_string(section, "class", node)?;
        let mut strategy = self
            .registry
            .instantiate::<dyn PlacementStrategy>(
                &format!("{}_placement", cell_type),
                &ClassRef::named(class),
                &Parameters::new(),
                &node.child("class"),
            )
            .map_err(|err| match err {
                CompileError::TypeNotFound { .. } => CompileError::configuration(
                    node,
                    format!("Couldn't find class '{}' specified in '{}'", class, node),
                ),
                other => other,
            })?;

        let layer = require_string(section, "layer", node)?.to_string();
        let soma_radius = if entity || strategy.is_entities() {
            None
        } else {
            Some(require_f64(section, "soma_radius", node)?)
        };
        let density = density_mode(section, node)?;
        copy_attributes(strategy.attributes_mut(), section, PLACEMENT_RESERVED);

        Ok(Placement {
            strategy,
            layer,
            soma_radius,
            density,
        })
    }

    fn init_morphology(&self, cell_type: &str, section: &Section, node: &NodePath) -> CompileResult<Box<dyn Morphology>> {
        let class = require_string(section, "class", node)?;
        let mut morphology = self.registry.instantiate::<dyn Morphology>(
            &format!("{}_morphology", cell_type),
            &ClassRef::named(class),
            &Parameters::new(),
            &node.child("class"),
        )?;
        copy_attributes(morphology.attributes_mut(), section, MORPHOLOGY_RESERVED);
        Ok(morphology)
    }

    /// Check the references of a cell type and validate its implementations
    pub fn finalize_cell_type(&mut self, name: &str, _section: &Section, node: &NodePath) -> CompileResult<()> {
        let placement_node = node.child("placement");
        let (layer, relative_to) = match self.cell_types.get(name) {
            Some(cell_type) => (
                cell_type.placement.layer.clone(),
                cell_type.placement.density.relative_to().map(str::to_string),
            ),
            None => return Ok(()),
        };

        if !self.layers.contains_key(&layer) {
            return Err(CompileError::configuration(
                &placement_node.child("layer"),
                format!("Unknown layer '{}'", layer),
            ));
        }
        if let Some(reference) = relative_to {
            if !self.cell_types.contains_key(&reference) {
                return Err(CompileError::configuration(
                    &placement_node.child("placement_relative_to"),
                    format!("Unknown cell type '{}'", reference),
                ));
            }
        }

        let strict = self.strict_attributes;
        let Some(cell_type) = self.cell_types.get_mut(name) else {
            return Ok(());
        };
        cell_type.placement.strategy.validate(&placement_node)?;
        let morphology_node = node.child("morphology");
        if let Some(morphology) = cell_type.morphology.as_mut() {
            morphology.validate(&morphology_node)?;
        }

        if strict {
            let cell_type = &self.cell_types[name];
            self.report_unknown_attributes(&*cell_type.placement.strategy, &placement_node);
            if let Some(morphology) = cell_type.morphology.as_deref() {
                self.report_unknown_attributes(morphology, &morphology_node);
            }
        }
        Ok(())
    }
}
