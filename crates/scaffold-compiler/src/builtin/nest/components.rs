// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! NEST cell models, connection models, devices and entities

use serde_json::{Map, Value};

use crate::attributes::{coerce_f64, float_value, Attributes, Schema};
use crate::capabilities::{ComponentContext, SimulationComponent, SimulatorAdapter};
use crate::document::parser::value_kind;
use crate::impl_configurable;
use crate::registry::Parameters;
use crate::types::{CompileError, CompileResult, NodePath};

use super::{DEFAULT_NEURON_MODEL, DEFAULT_SYNAPSE_MODEL};

/// Name of the simulator a component was created for
fn adapter_name(parameters: &Parameters) -> String {
    parameters
        .get("adapter")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Parameters of a neuron population
#[derive(Debug, Default)]
pub struct NestCell {
    name: String,
    attributes: Attributes,
    context: ComponentContext,
    adapter: String,
    /// Neuron model → receptor block
    receptor_specifications: Map<String, Value>,
}

impl NestCell {
    pub fn new(parameters: &Parameters) -> Self {
        Self {
            adapter: adapter_name(parameters),
            ..Default::default()
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    pub fn neuron_model(&self) -> &str {
        self.attributes.get_str("neuron_model").unwrap_or(DEFAULT_NEURON_MODEL)
    }

    /// Receptors of the selected neuron model
    pub fn receptor_specifications(&self) -> Option<&Value> {
        self.receptor_specifications.get(self.neuron_model())
    }

    /// Shared `parameters` merged with those of the selected neuron model
    pub fn model_parameters(&self) -> CompileResult<Map<String, Value>> {
        let mut parameters = self.attributes.get_map("parameters").cloned().unwrap_or_default();
        let model = self.neuron_model();
        let specific = self.attributes.get_map(model).ok_or_else(|| {
            CompileError::configuration(
                &self.context.node.child(&self.name),
                format!("Missing parameters for '{}' model in '{}'", model, self.name),
            )
        })?;
        for (key, value) in specific {
            parameters.insert(key.clone(), value.clone());
        }
        Ok(parameters)
    }
}

impl_configurable!(NestCell, "NestCell");

impl SimulationComponent for NestCell {
    fn context(&self) -> &ComponentContext {
        &self.context
    }

    fn set_context(&mut self, context: ComponentContext) {
        self.context = context;
    }

    fn validate_in(&mut self, adapter: &dyn SimulatorAdapter, node: &NodePath) -> CompileResult<()> {
        let default_model = adapter
            .attributes()
            .get_str("default_neuron_model")
            .unwrap_or(DEFAULT_NEURON_MODEL)
            .to_string();
        Schema::new()
            .default_value("neuron_model", Value::from(default_model))
            .required(&["parameters"])
            .apply(&mut self.attributes, node)?;
        self.attributes.require_map("parameters", node)?;

        let models: Vec<String> = self
            .attributes
            .iter()
            .filter(|(key, value)| *key != "parameters" && value.get("receptors").is_some())
            .map(|(key, _)| key.to_string())
            .collect();
        for model in models {
            let receptors = self
                .attributes
                .get_mut(&model)
                .and_then(Value::as_object_mut)
                .and_then(|block| block.remove("receptors"));
            if let Some(receptors) = receptors {
                self.receptor_specifications.insert(model, receptors);
            }
        }
        Ok(())
    }
}

/// Synapses between two cell populations
#[derive(Debug, Default)]
pub struct NestConnection {
    name: String,
    attributes: Attributes,
    context: ComponentContext,
    adapter: String,
    is_teaching: bool,
}

/// Defaults of plastic synapse parameters
const PLASTIC_SYNAPSE_DEFAULTS: [(&str, f64); 4] = [("A_minus", 0.0), ("A_plus", 0.0), ("Wmin", 0.0), ("Wmax", 4000.0)];

impl NestConnection {
    pub fn new(parameters: &Parameters) -> Self {
        Self {
            adapter: adapter_name(parameters),
            ..Default::default()
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    pub fn is_plastic(&self) -> bool {
        truthy(self.attributes.get("plastic"))
    }

    pub fn is_heteroplastic(&self) -> bool {
        self.is_plastic() && truthy(self.attributes.get("hetero"))
    }

    pub fn synapse_model(&self) -> &str {
        self.attributes.get_str("synapse_model").unwrap_or(DEFAULT_SYNAPSE_MODEL)
    }

    pub fn synapse(&self) -> Option<&Map<String, Value>> {
        self.attributes.get_map("synapse")
    }

    pub fn connection(&self) -> Option<&Map<String, Value>> {
        self.attributes.get_map("connection")
    }

    pub fn weight(&self) -> Option<f64> {
        self.connection().and_then(|c| c.get("weight")).and_then(Value::as_f64)
    }
}

impl_configurable!(NestConnection, "NestConnection");

impl SimulationComponent for NestConnection {
    fn context(&self) -> &ComponentContext {
        &self.context
    }

    fn set_context(&mut self, context: ComponentContext) {
        self.context = context;
    }

    fn teaching(&self) -> Option<&str> {
        if self.is_heteroplastic() {
            self.attributes.get_str("teaching")
        } else {
            None
        }
    }

    fn is_teaching(&self) -> bool {
        self.is_teaching
    }

    fn set_is_teaching(&mut self, teaching: bool) {
        self.is_teaching = teaching;
    }

    fn validate_in(&mut self, adapter: &dyn SimulatorAdapter, node: &NodePath) -> CompileResult<()> {
        let default_synapse = adapter
            .attributes()
            .get_str("default_synapse_model")
            .unwrap_or(DEFAULT_SYNAPSE_MODEL)
            .to_string();
        Schema::new()
            .default_value("synapse_model", Value::from(default_synapse))
            .default_value("plastic", Value::Bool(false))
            .default_value("hetero", Value::Null)
            .default_value("teaching", Value::Null)
            .required(&["synapse", "connection"])
            .apply(&mut self.attributes, node)?;
        self.attributes.require_map("synapse", node)?;
        let connection = self.attributes.require_map("connection", node)?;
        let weight = connection
            .get("weight")
            .ok_or_else(|| CompileError::missing_field(&node.child("connection"), "weight"))?;
        coerce_f64(weight, &node.child("connection").child("weight"))?;

        if self.is_plastic() {
            if let Some(synapse) = self.attributes.get_mut("synapse").and_then(Value::as_object_mut) {
                for (key, value) in PLASTIC_SYNAPSE_DEFAULTS {
                    synapse.entry(key).or_insert_with(|| float_value(value));
                }
            }
        }

        if self.is_heteroplastic() {
            match self.attributes.get("teaching") {
                Some(Value::String(_)) => {}
                None | Some(Value::Null) => {
                    return Err(CompileError::configuration(
                        node,
                        format!("Required attribute 'teaching' is missing for heteroplastic connection '{}'", node),
                    ));
                }
                Some(other) => {
                    return Err(CompileError::configuration(
                        &node.child("teaching"),
                        format!("Expected the name of a connection model, found {}", value_kind(other)),
                    ));
                }
            }
        }
        Ok(())
    }
}

const TARGETTING_TYPES: [&str; 3] = ["local", "cylinder", "cell_type"];

/// Shared rules of devices and entities
fn validate_device(attributes: &mut Attributes, node: &NodePath) -> CompileResult<()> {
    Schema::new()
        .default_value("connection_rule", Value::Null)
        .default_value("connection_parameters", Value::Null)
        .required(&["type", "device", "io", "parameters"])
        .cast_float(&["radius"])
        .apply(attributes, node)?;
    attributes.require_map("parameters", node)?;

    let targetting = attributes.require_str("type", node)?;
    if !TARGETTING_TYPES.contains(&targetting) {
        return Err(CompileError::configuration(
            &node.child("type"),
            format!("Unknown NEST targetting type '{}'", targetting),
        ));
    }

    let io = attributes.require_str("io", node)?;
    if io != "input" && io != "output" {
        return Err(CompileError::configuration(
            &node.child("io"),
            "Attribute io needs to be either 'input' or 'output'",
        ));
    }

    if let Some(origin) = attributes.get("origin").cloned() {
        let coords = origin.as_array().ok_or_else(|| {
            CompileError::configuration(&node.child("origin"), format!("Expected a list, found {}", value_kind(&origin)))
        })?;
        let cast = coords
            .iter()
            .enumerate()
            .map(|(i, c)| coerce_f64(c, &node.child("origin").child(i)).map(float_value))
            .collect::<CompileResult<Vec<Value>>>()?;
        attributes.insert("origin", Value::Array(cast));
    }
    Ok(())
}

/// A stimulation or recording device
#[derive(Debug, Default)]
pub struct NestDevice {
    name: String,
    attributes: Attributes,
    context: ComponentContext,
    adapter: String,
}

impl NestDevice {
    pub fn new(parameters: &Parameters) -> Self {
        Self {
            adapter: adapter_name(parameters),
            ..Default::default()
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    pub fn targetting(&self) -> Option<&str> {
        self.attributes.get_str("type")
    }

    pub fn is_input(&self) -> bool {
        self.attributes.get_str("io") == Some("input")
    }
}

impl_configurable!(NestDevice, "NestDevice", {
    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        validate_device(&mut self.attributes, node)
    }
});

impl SimulationComponent for NestDevice {
    fn context(&self) -> &ComponentContext {
        &self.context
    }

    fn set_context(&mut self, context: ComponentContext) {
        self.context = context;
    }
}

/// A device that is represented as a population of the network
#[derive(Debug, Default)]
pub struct NestEntity {
    name: String,
    attributes: Attributes,
    context: ComponentContext,
    adapter: String,
}

impl NestEntity {
    pub fn new(parameters: &Parameters) -> Self {
        Self {
            adapter: adapter_name(parameters),
            ..Default::default()
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }
}

impl_configurable!(NestEntity, "NestEntity", {
    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        validate_device(&mut self.attributes, node)
    }
});

impl SimulationComponent for NestEntity {
    fn context(&self) -> &ComponentContext {
        &self.context
    }

    fn set_context(&mut self, context: ComponentContext) {
        self.context = context;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::nest::NestAdapter;
    use crate::attributes::Configurable;
    use serde_json::json;

    fn adapter() -> NestAdapter {
        let mut adapter = NestAdapter::default();
        adapter.attributes_mut().insert("duration", json!(100));
        adapter.attributes_mut().insert("default_neuron_model", json!("iaf_psc_alpha"));
        adapter.validate(&NodePath::root()).unwrap();
        adapter
    }

    fn with(attributes: Value) -> Attributes {
        match attributes {
            Value::Object(map) => Attributes::from(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_cell_extracts_receptors() {
        let mut cell = NestCell::default();
        *cell.attributes_mut() = with(json!({
            "parameters": {"t_ref": 2.0},
            "iaf_psc_alpha": {"C_m": 7.0, "receptors": {"glomerulus": 1}}
        }));
        cell.validate_in(&adapter(), &NodePath::of("cell_models").child("granule")).unwrap();

        assert_eq!(cell.neuron_model(), "iaf_psc_alpha");
        assert_eq!(cell.receptor_specifications(), Some(&json!({"glomerulus": 1})));
        let parameters = cell.model_parameters().unwrap();
        assert_eq!(parameters.get("C_m"), Some(&json!(7.0)));
        assert_eq!(parameters.get("t_ref"), Some(&json!(2.0)));
        assert!(parameters.get("receptors").is_none());
    }

    #[test]
    fn test_connection_requires_weight() {
        let mut connection = NestConnection::default();
        *connection.attributes_mut() = with(json!({"synapse": {}, "connection": {"delay": 1.0}}));
        let err = connection
            .validate_in(&adapter(), &NodePath::of("connection_models").child("pf_pc"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing 'weight' attribute in connection_models.pf_pc.connection");
    }

    #[test]
    fn test_plastic_synapse_defaults() {
        let mut connection = NestConnection::default();
        *connection.attributes_mut() = with(json!({
            "plastic": true,
            "synapse": {"Wmax": 10.0},
            "connection": {"weight": 1.0}
        }));
        connection.validate_in(&adapter(), &NodePath::root()).unwrap();
        let synapse = connection.synapse().unwrap();
        assert_eq!(synapse.get("Wmax"), Some(&json!(10.0)));
        assert_eq!(synapse.get("A_plus"), Some(&json!(0.0)));
        assert_eq!(connection.synapse_model(), DEFAULT_SYNAPSE_MODEL);
        assert_eq!(connection.teaching(), None);
    }

    #[test]
    fn test_heteroplastic_needs_teacher() {
        let mut connection = NestConnection::default();
        *connection.attributes_mut() = with(json!({
            "plastic": true,
            "hetero": true,
            "synapse": {},
            "connection": {"weight": 1.0}
        }));
        assert!(connection.validate_in(&adapter(), &NodePath::root()).is_err());

        connection.attributes_mut().insert("teaching", json!("io_pc"));
        connection.validate_in(&adapter(), &NodePath::root()).unwrap();
        assert_eq!(connection.teaching(), Some("io_pc"));
    }

    #[test]
    fn test_device_rules() {
        let node = NodePath::of("devices").child("stimulus");
        let mut device = NestDevice::default();
        *device.attributes_mut() = with(json!({
            "type": "cylinder",
            "device": "spike_generator",
            "io": "input",
            "radius": "20",
            "origin": [1, "2", 3],
            "parameters": {}
        }));
        device.validate(&node).unwrap();
        assert_eq!(device.attributes().get_f64("radius"), Some(20.0));
        assert_eq!(device.attributes().get("origin"), Some(&json!([1.0, 2.0, 3.0])));
        assert!(device.is_input());

        device.attributes_mut().insert("io", json!("both"));
        assert!(device.validate(&node).is_err());
        device.attributes_mut().insert("io", json!("output"));
        device.attributes_mut().insert("type", json!("sphere"));
        let err = device.validate(&node).unwrap_err();
        assert_eq!(err.node().unwrap().to_string(), "devices.stimulus.type");
    }
}
