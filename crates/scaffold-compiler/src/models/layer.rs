// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Layers, stacks and the simulation volume

use std::collections::BTreeMap;

use serde::Serialize;

/// Base footprint of the simulation (X and Z extents)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Volume {
    pub x: f64,
    pub z: f64,
}

/// Membership of a layer in a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackSlot {
    pub stack_id: i64,
    pub position_in_stack: i64,
}

/// Thickness derived from the volume of other layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeScale {
    /// Reference volume is divided by this factor
    pub volume_scale: f64,
    pub scale_from_layers: Vec<String>,
    /// X:Y:Z ratio of the resulting dimensions, as declared
    pub dimension_ratios: [f64; 3],
}

/// A box-shaped region of the simulation volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub origin: [f64; 3],
    /// X, Y (thickness) and Z extents
    pub dimensions: [f64; 3],
    /// Follows volume resizes
    pub scaling: bool,
    /// Kept centred on the X/Z footprint
    pub xz_center: bool,
    pub stack: Option<StackSlot>,
    pub volume_scale: Option<VolumeScale>,
}

impl Layer {
    pub fn width(&self) -> f64 {
        self.dimensions[0]
    }

    pub fn thickness(&self) -> f64 {
        self.dimensions[1]
    }

    pub fn depth(&self) -> f64 {
        self.dimensions[2]
    }

    pub fn volume(&self) -> f64 {
        self.dimensions.iter().product()
    }

    /// Highest Y coordinate of the layer
    pub fn top(&self) -> f64 {
        self.origin[1] + self.thickness()
    }
}

/// Layers placed on top of each other, bottom to top by slot
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Stack {
    pub id: i64,
    /// Slot → layer name
    pub layers: BTreeMap<i64, String>,
    /// Base position; the origin when not declared
    pub position: Option<[f64; 3]>,
}

impl Stack {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Layer names in slot order
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.values().map(String::as_str)
    }
}
