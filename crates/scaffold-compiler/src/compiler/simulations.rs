// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `simulations` section: one adapter per simulation and its components

use serde_json::Value;
use tracing::debug;

use super::builder::{require_string, warn_unknown_attributes, ConfigBuilder};
use crate::attributes::copy_attributes;
use crate::capabilities::{ComponentContext, ComponentKind, SimulationComponent, SimulatorAdapter};
use crate::models::Simulation;
use crate::ordering::order_connection_models;
use crate::registry::{ClassRef, Parameters, TypeRegistry};
use crate::sections::{load_section, Finalize, Section};
use crate::types::{CompileError, CompileResult, NodePath};

const SIMULATION_RESERVED: &[&str] = &["simulator", "cell_models", "connection_models", "devices", "entities"];

/// Load one component collection of `simulation`
fn load_components(
    registry: &TypeRegistry,
    simulation: &mut Simulation,
    section: &Section,
    kind: ComponentKind,
    class: ClassRef<dyn SimulationComponent>,
    node: &NodePath,
) -> CompileResult<usize> {
    let mut parameters = Parameters::new();
    parameters.insert("adapter".to_string(), Value::from(simulation.simulator.clone()));
    let collection_node = node.child(kind.key());

    load_section(
        simulation,
        section,
        kind.key(),
        node,
        |simulation: &mut Simulation, name: &str, entry: &Section, entry_node: &NodePath| {
            let mut component = registry.instantiate::<dyn SimulationComponent>(name, &class, &parameters, entry_node)?;
            copy_attributes(component.attributes_mut(), entry, &[]);
            component.set_context(ComponentContext {
                simulation: simulation.name.clone(),
                node: collection_node.clone(),
            });
            simulation.components_mut(kind).insert(name.to_string(), component);
            Ok(())
        },
        Finalize::None,
    )
}

impl<'c> ConfigBuilder<'c> {
    pub fn init_simulation(&mut self, name: &str, section: &Section, node: &NodePath) -> CompileResult<()> {
        let simulator = require_string(section, "simulator", node)?;
        let class = self
            .simulators
            .get(simulator)
            .cloned()
            .ok_or_else(|| CompileError::UnknownSimulator {
                node: node.child("simulator"),
                simulator: simulator.to_string(),
                known: self.simulators.keys().cloned().collect(),
            })?;

        let mut adapter = self
            .registry
            .instantiate::<dyn SimulatorAdapter>(name, &class, &Parameters::new(), node)?;
        copy_attributes(adapter.attributes_mut(), section, SIMULATION_RESERVED);
        let classes = adapter.component_classes();

        let mut simulation = Simulation::new(name, simulator, adapter);
        for kind in ComponentKind::ALL {
            if kind == ComponentKind::Entities && !section.contains_key(kind.key()) {
                continue;
            }
            let class = classes.get(kind).cloned().ok_or_else(|| {
                CompileError::configuration(
                    &node.child(kind.key()),
                    format!("The '{}' simulator does not support {}", simulator, kind),
                )
            })?;
            let count = load_components(self.registry, &mut simulation, section, kind, class, node)?;
            debug!(target: "scaffold-compiler", "[SECTION] Simulation '{}': {} {}", name, count, kind);
        }

        self.simulations.insert(name.to_string(), simulation);
        Ok(())
    }

    /// Validate the adapter and its components, then order the connection
    /// models by teaching dependency
    pub fn finalize_simulation(&mut self, name: &str, _section: &Section, node: &NodePath) -> CompileResult<()> {
        let strict = self.strict_attributes;
        let Some(simulation) = self.simulations.get_mut(name) else {
            return Ok(());
        };
        let Simulation {
            adapter,
            cell_models,
            connection_models,
            devices,
            entities,
            connection_order,
            ..
        } = simulation;

        adapter.validate(node)?;
        if strict {
            warn_unknown_attributes(&**adapter, node);
        }
        let adapter: &dyn SimulatorAdapter = &**adapter;

        let collections = [
            (ComponentKind::CellModels, &mut *cell_models),
            (ComponentKind::ConnectionModels, &mut *connection_models),
            (ComponentKind::Devices, &mut *devices),
            (ComponentKind::Entities, &mut *entities),
        ];
        for (kind, components) in collections {
            let collection_node = node.child(kind.key());
            for (component_name, component) in components.iter_mut() {
                let component_node = collection_node.child(component_name);
                component.validate_in(adapter, &component_node)?;
                if strict {
                    warn_unknown_attributes(&**component, &component_node);
                }
            }
        }

        let dependencies: Vec<(String, Option<String>)> = connection_models
            .iter()
            .map(|(model, component)| (model.clone(), component.teaching().map(str::to_string)))
            .collect();
        let order = order_connection_models(&dependencies, &node.child("connection_models"))?;
        for teacher in &order.teachers {
            if let Some(model) = connection_models.get_mut(teacher) {
                model.set_is_teaching(true);
            }
        }
        *connection_order = order.order;
        Ok(())
    }
}
