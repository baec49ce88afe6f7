// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulations and their components

use indexmap::IndexMap;

use crate::capabilities::{ComponentKind, SimulationComponent, SimulatorAdapter};

pub type Components = IndexMap<String, Box<dyn SimulationComponent>>;

/// A simulation setup for one simulator
#[derive(Debug)]
pub struct Simulation {
    pub name: String,
    /// Registry key of the simulator, e.g. `nest`
    pub simulator: String,
    pub adapter: Box<dyn SimulatorAdapter>,
    pub cell_models: Components,
    pub connection_models: Components,
    pub devices: Components,
    pub entities: Components,
    /// Connection model names, every teacher before the models it teaches
    pub connection_order: Vec<String>,
}

impl Simulation {
    pub fn new(name: &str, simulator: &str, adapter: Box<dyn SimulatorAdapter>) -> Self {
        Self {
            name: name.to_string(),
            simulator: simulator.to_string(),
            adapter,
            cell_models: Components::new(),
            connection_models: Components::new(),
            devices: Components::new(),
            entities: Components::new(),
            connection_order: Vec::new(),
        }
    }

    pub fn components(&self, kind: ComponentKind) -> &Components {
        match kind {
            ComponentKind::CellModels => &self.cell_models,
            ComponentKind::ConnectionModels => &self.connection_models,
            ComponentKind::Devices => &self.devices,
            ComponentKind::Entities => &self.entities,
        }
    }

    pub fn components_mut(&mut self, kind: ComponentKind) -> &mut Components {
        match kind {
            ComponentKind::CellModels => &mut self.cell_models,
            ComponentKind::ConnectionModels => &mut self.connection_models,
            ComponentKind::Devices => &mut self.devices,
            ComponentKind::Entities => &mut self.entities,
        }
    }

    /// Connection models in execution order
    pub fn ordered_connection_models(&self) -> impl Iterator<Item = &dyn SimulationComponent> {
        self.connection_order
            .iter()
            .filter_map(|name| self.connection_models.get(name))
            .map(|model| model.as_ref())
    }
}
