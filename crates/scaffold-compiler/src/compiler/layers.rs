// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `layers` section

use serde_json::Value;

use super::builder::{float_triple, optional_bool, require_array, ConfigBuilder};
use crate::attributes::{coerce_f64, coerce_i64};
use crate::document::parser::value_kind;
use crate::geometry;
use crate::models::{Layer, Stack, StackSlot, VolumeScale};
use crate::sections::{require_section, Section};
use crate::types::{CompileError, CompileResult, NodePath};

/// `xz_scale` as a scalar broadcast to both axes, or a 2-vector
fn xz_scale(value: &Value, node: &NodePath) -> CompileResult<[f64; 2]> {
    match value {
        Value::Array(items) if items.len() == 2 => Ok([
            coerce_f64(&items[0], &node.child(0))?,
            coerce_f64(&items[1], &node.child(1))?,
        ]),
        Value::Array(_) => Err(CompileError::configuration(
            node,
            "xz_scale must be a number or a list of 2 numbers",
        )),
        scalar => {
            let factor = coerce_f64(scalar, node)?;
            Ok([factor, factor])
        }
    }
}

fn volume_scale(section: &Section, node: &NodePath) -> CompileResult<Option<VolumeScale>> {
    let Some(scale) = section.get("volume_scale") else {
        return Ok(None);
    };
    let volume_scale = coerce_f64(scale, &node.child("volume_scale"))?;

    let references = require_array(section, "scale_from_layers", node)?;
    let scale_from_layers = references
        .iter()
        .enumerate()
        .map(|(i, r)| {
            r.as_str().map(str::to_string).ok_or_else(|| {
                CompileError::configuration(
                    &node.child("scale_from_layers").child(i),
                    format!("Expected a layer name, found {}", value_kind(r)),
                )
            })
        })
        .collect::<CompileResult<Vec<String>>>()?;

    let dimension_ratios = match section.get("volume_dimension_ratio") {
        Some(ratios) => float_triple(ratios, &node.child("volume_dimension_ratio"))?,
        None => [1.0, 1.0, 1.0],
    };

    Ok(Some(VolumeScale {
        volume_scale,
        scale_from_layers,
        dimension_ratios,
    }))
}

impl<'c> ConfigBuilder<'c> {
    pub fn init_layer(&mut self, name: &str, section: &Section, node: &NodePath) -> CompileResult<()> {
        if !section.contains_key("thickness") && !section.contains_key("volume_scale") {
            return Err(CompileError::configuration(
                node,
                format!("Either a thickness attribute or volume_scale required in {} config.", name),
            ));
        }
        let thickness = match section.get("thickness") {
            Some(t) => coerce_f64(t, &node.child("thickness"))?,
            None => 0.0,
        };

        let origin = match section.get("position") {
            Some(position) => float_triple(position, &node.child("position"))?,
            None => [0.0, 0.0, 0.0],
        };

        let scale = match section.get("xz_scale") {
            Some(value) => xz_scale(value, &node.child("xz_scale"))?,
            None => [1.0, 1.0],
        };
        let dimensions = [self.volume.x * scale[0], thickness, self.volume.z * scale[1]];

        let xz_center = optional_bool(section, "xz_center", false, node)?;

        let stack = match section.get("stack") {
            Some(_) => Some(self.register_in_stack(name, require_section(section, "stack", node)?, &node.child("stack"))?),
            None => None,
        };

        let layer = Layer {
            name: name.to_string(),
            origin,
            dimensions,
            scaling: optional_bool(section, "scaling", true, node)?,
            xz_center,
            stack,
            volume_scale: volume_scale(section, node)?,
        };
        self.layers.insert(name.to_string(), layer);
        Ok(())
    }

    fn register_in_stack(&mut self, name: &str, section: &Section, node: &NodePath) -> CompileResult<StackSlot> {
        let stack_id = section
            .get("stack_id")
            .ok_or_else(|| CompileError::missing_field(node, "stack_id"))
            .and_then(|v| coerce_i64(v, &node.child("stack_id")))?;
        let position_in_stack = section
            .get("position_in_stack")
            .ok_or_else(|| CompileError::missing_field(node, "position_in_stack"))
            .and_then(|v| coerce_i64(v, &node.child("position_in_stack")))?;
        let position = section
            .get("position")
            .map(|p| float_triple(p, &node.child("position")))
            .transpose()?;

        let stack = self.stacks.entry(stack_id).or_insert_with(|| Stack::new(stack_id));
        if let Some(other) = stack.layers.get(&position_in_stack) {
            return Err(CompileError::configuration(
                &node.child("position_in_stack"),
                format!(
                    "Position {} of stack {} is already taken by layer '{}'",
                    position_in_stack, stack_id, other
                ),
            ));
        }
        if let Some(position) = position {
            if stack.position.is_some() {
                return Err(CompileError::configuration(
                    &node.child("position"),
                    format!("Duplicate positioning attribute found for stack with id '{}'", stack_id),
                ));
            }
            stack.position = Some(position);
        }
        stack.layers.insert(position_in_stack, name.to_string());

        Ok(StackSlot {
            stack_id,
            position_in_stack,
        })
    }

    /// Volume scaling, centering, then stacking
    pub fn finalize_layers(&mut self, node: &NodePath) -> CompileResult<()> {
        geometry::resolve_volume_scales(&mut self.layers, node)?;
        geometry::center_xz(&self.volume, &mut self.layers);
        geometry::place_stacks(&mut self.layers, &mut self.stacks, node)
    }
}
