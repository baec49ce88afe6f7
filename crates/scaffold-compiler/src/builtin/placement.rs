// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Placement strategies, namespace `scaffold.placement`

use serde_json::Value;

use super::default_factory;
use crate::attributes::{Attributes, Configurable, Schema};
use crate::capabilities::PlacementStrategy;
use crate::impl_configurable;
use crate::registry::TypeRegistry;
use crate::types::{CompileError, CompileResult, NodePath};

pub const NAMESPACE: &str = "scaffold.placement";

pub fn register(registry: &mut TypeRegistry) {
    registry.register::<dyn PlacementStrategy>(
        &format!("{}.ParticlePlacement", NAMESPACE),
        default_factory!(PlacementStrategy, ParticlePlacement),
    );
    registry.register::<dyn PlacementStrategy>(
        &format!("{}.LayeredRandomWalk", NAMESPACE),
        default_factory!(PlacementStrategy, LayeredRandomWalk),
    );
    registry.register::<dyn PlacementStrategy>(
        &format!("{}.ParallelArrayPlacement", NAMESPACE),
        default_factory!(PlacementStrategy, ParallelArrayPlacement),
    );
    registry.register::<dyn PlacementStrategy>(
        &format!("{}.Satellite", NAMESPACE),
        default_factory!(PlacementStrategy, Satellite),
    );
    registry.register::<dyn PlacementStrategy>(
        &format!("{}.Entities", NAMESPACE),
        default_factory!(PlacementStrategy, Entities),
    );
}

/// Cells as repelling particles in the layer volume
#[derive(Debug, Default)]
pub struct ParticlePlacement {
    name: String,
    attributes: Attributes,
}

impl_configurable!(ParticlePlacement, "ParticlePlacement", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&["prune", "bounding_box"])
    }
});
impl PlacementStrategy for ParticlePlacement {}

/// Random walk through the sublayers of a layer
#[derive(Debug, Default)]
pub struct LayeredRandomWalk {
    name: String,
    attributes: Attributes,
}

impl_configurable!(LayeredRandomWalk, "LayeredRandomWalk", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&["distance_multiplier_min", "distance_multiplier_max"])
    }

    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        Schema::new()
            .default_value("distance_multiplier_min", Value::from(0.75))
            .default_value("distance_multiplier_max", Value::from(1.25))
            .cast_float(&["distance_multiplier_min", "distance_multiplier_max"])
            .apply(&mut self.attributes, node)
    }
});
impl PlacementStrategy for LayeredRandomWalk {}

/// Cells on parallel rows, e.g. Purkinje cells
#[derive(Debug, Default)]
pub struct ParallelArrayPlacement {
    name: String,
    attributes: Attributes,
}

impl_configurable!(ParallelArrayPlacement, "ParallelArrayPlacement", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&["extension_x", "extension_z", "angle"])
    }

    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        Schema::new()
            .required(&["extension_x", "extension_z", "angle"])
            .cast_float(&["extension_x", "extension_z", "angle"])
            .apply(&mut self.attributes, node)
    }
});
impl PlacementStrategy for ParallelArrayPlacement {}

/// Cells placed around cells of other types
#[derive(Debug, Default)]
pub struct Satellite {
    name: String,
    attributes: Attributes,
}

impl Satellite {
    /// Cell types the satellites are placed around
    pub fn planet_types(&self) -> Vec<&str> {
        self.attributes
            .get("planet_types")
            .and_then(Value::as_array)
            .map(|types| types.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl_configurable!(Satellite, "Satellite", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&["planet_types", "per_planet"])
    }

    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        let planets = self.attributes.require("planet_types", node)?;
        let valid = planets
            .as_array()
            .map(|types| !types.is_empty() && types.iter().all(Value::is_string))
            .unwrap_or(false);
        if !valid {
            return Err(CompileError::configuration(
                &node.child("planet_types"),
                "Expected a non-empty list of cell type names",
            ));
        }
        self.attributes.cast_f64("per_planet", node)
    }
});
impl PlacementStrategy for Satellite {}

/// Placement of entities: cells without a morphology or a soma
#[derive(Debug, Default)]
pub struct Entities {
    name: String,
    attributes: Attributes,
}

impl_configurable!(Entities, "Entities", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&[])
    }
});

impl PlacementStrategy for Entities {
    fn is_entities(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_satellite_requires_planets() {
        let node = NodePath::of("cell_types").child("glia").child("placement");
        let mut satellite = Satellite::default();
        assert!(matches!(satellite.validate(&node), Err(CompileError::MissingField { .. })));

        satellite.attributes_mut().insert("planet_types", json!([]));
        assert!(matches!(satellite.validate(&node), Err(CompileError::Configuration { .. })));

        satellite.attributes_mut().insert("planet_types", json!(["purkinje_cell"]));
        satellite.validate(&node).unwrap();
        assert_eq!(satellite.planet_types(), vec!["purkinje_cell"]);
    }

    #[test]
    fn test_random_walk_defaults() {
        let mut walk = LayeredRandomWalk::default();
        walk.validate(&NodePath::root()).unwrap();
        assert_eq!(walk.attributes().get_f64("distance_multiplier_max"), Some(1.25));
    }

    #[test]
    fn test_only_entities_place_entities() {
        assert!(Entities::default().is_entities());
        assert!(!ParticlePlacement::default().is_entities());
    }
}
