// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Output formatters, namespace `scaffold.output`

use serde_json::Value;

use super::default_factory;
use crate::attributes::{Attributes, Schema};
use crate::capabilities::OutputFormatter;
use crate::impl_configurable;
use crate::registry::TypeRegistry;
use crate::types::{CompileResult, NodePath};

pub const NAMESPACE: &str = "scaffold.output";

pub const DEFAULT_FILE: &str = "scaffold_network.hdf5";

pub fn register(registry: &mut TypeRegistry) {
    registry.register::<dyn OutputFormatter>(
        &format!("{}.HDF5Formatter", NAMESPACE),
        default_factory!(OutputFormatter, HDF5Formatter),
    );
}

/// Writes the compiled network to an HDF5 file
#[derive(Debug, Default)]
pub struct HDF5Formatter {
    name: String,
    attributes: Attributes,
}

impl HDF5Formatter {
    pub fn file(&self) -> &str {
        self.attributes.get_str("file").unwrap_or(DEFAULT_FILE)
    }
}

impl_configurable!(HDF5Formatter, "HDF5Formatter", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&["file", "morphology_repository"])
    }

    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        Schema::new()
            .default_value("file", Value::from(DEFAULT_FILE))
            .apply(&mut self.attributes, node)
    }
});
impl OutputFormatter for HDF5Formatter {}
