// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cell geometries, namespace `scaffold.morphologies`

use super::default_factory;
use crate::attributes::{Attributes, Schema};
use crate::capabilities::Morphology;
use crate::impl_configurable;
use crate::registry::TypeRegistry;
use crate::types::{CompileResult, NodePath};

pub const NAMESPACE: &str = "scaffold.morphologies";

pub fn register(registry: &mut TypeRegistry) {
    registry.register::<dyn Morphology>(
        &format!("{}.NoGeometry", NAMESPACE),
        default_factory!(Morphology, NoGeometry),
    );
    registry.register::<dyn Morphology>(
        &format!("{}.GranuleCellGeometry", NAMESPACE),
        default_factory!(Morphology, GranuleCellGeometry),
    );
    registry.register::<dyn Morphology>(
        &format!("{}.PurkinjeCellGeometry", NAMESPACE),
        default_factory!(Morphology, PurkinjeCellGeometry),
    );
}

/// Point-like cells
#[derive(Debug, Default)]
pub struct NoGeometry {
    name: String,
    attributes: Attributes,
}

impl_configurable!(NoGeometry, "NoGeometry");
impl Morphology for NoGeometry {}

#[derive(Debug, Default)]
pub struct GranuleCellGeometry {
    name: String,
    attributes: Attributes,
}

const GRANULE_FIELDS: &[&str] = &["pf_height", "pf_height_sd", "pf_length", "pf_radius", "dendrite_length"];

impl_configurable!(GranuleCellGeometry, "GranuleCellGeometry", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(GRANULE_FIELDS)
    }

    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        Schema::new()
            .required(GRANULE_FIELDS)
            .cast_float(GRANULE_FIELDS)
            .apply(&mut self.attributes, node)
    }
});
impl Morphology for GranuleCellGeometry {}

#[derive(Debug, Default)]
pub struct PurkinjeCellGeometry {
    name: String,
    attributes: Attributes,
}

impl_configurable!(PurkinjeCellGeometry, "PurkinjeCellGeometry");
impl Morphology for PurkinjeCellGeometry {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Configurable;
    use serde_json::json;

    #[test]
    fn test_granule_geometry_casts_fields() {
        let mut geometry = GranuleCellGeometry::default();
        for field in GRANULE_FIELDS {
            geometry.attributes_mut().insert(*field, json!("1.5"));
        }
        geometry.validate(&NodePath::root()).unwrap();
        assert_eq!(geometry.attributes().get_f64("pf_length"), Some(1.5));

        geometry.attributes_mut().remove("dendrite_length");
        assert!(geometry.validate(&NodePath::root()).is_err());
    }
}
