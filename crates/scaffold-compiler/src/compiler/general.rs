// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `network_architecture` and `output` sections

use tracing::debug;

use super::builder::{require_f64, require_string, ConfigBuilder};
use crate::attributes::copy_attributes;
use crate::capabilities::OutputFormatter;
use crate::geometry;
use crate::models::Volume;
use crate::registry::{ClassRef, Parameters};
use crate::sections::{require_section, Section};
use crate::types::{CompileResult, NodePath};

/// Keys of the `output` section that are not forwarded to the formatter
const OUTPUT_RESERVED: &[&str] = &["format"];

impl<'c> ConfigBuilder<'c> {
    /// Read the base volume from `network_architecture`
    pub fn load_architecture(&mut self, root: &Section) -> CompileResult<()> {
        let node = NodePath::of("network_architecture");
        let section = require_section(root, "network_architecture", &NodePath::root())?;

        let x = require_f64(section, "simulation_volume_x", &node)?;
        let z = require_f64(section, "simulation_volume_z", &node)?;
        for (key, extent) in [("simulation_volume_x", x), ("simulation_volume_z", z)] {
            geometry::check_extent(extent, &node.child(key))?;
        }

        self.volume = Volume { x, z };
        debug!(target: "scaffold-compiler", "[COMPILE] Simulation volume {} x {}", x, z);
        Ok(())
    }

    /// Resolve the output formatter named by `output.format`
    pub fn load_output(&mut self, root: &Section) -> CompileResult<()> {
        let node = NodePath::of("output");
        let section = require_section(root, "output", &NodePath::root())?;
        let format = require_string(section, "format", &node)?;

        let mut formatter = self.registry.instantiate::<dyn OutputFormatter>(
            "output",
            &ClassRef::named(format),
            &Parameters::new(),
            &node.child("format"),
        )?;
        copy_attributes(formatter.attributes_mut(), section, OUTPUT_RESERVED);
        formatter.validate(&node)?;
        self.report_unknown_attributes(&*formatter, &node);

        self.output_formatter = Some(formatter);
        Ok(())
    }
}
