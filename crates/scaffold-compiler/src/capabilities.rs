// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Capability traits.

A capability is the interface an implementation must provide to fill a slot
of the network document: the `class` of a placement block, a morphology or a
connection type, the output `format`, a simulator, or a simulation component.
Implementations are looked up by qualified name in the
[`TypeRegistry`](crate::registry::TypeRegistry).
*/

use std::fmt;

use crate::attributes::Configurable;
use crate::registry::ClassRef;
use crate::types::{CompileResult, NodePath};

/// Places the cells of a cell type inside its layer
pub trait PlacementStrategy: Configurable {
    /// Whether the strategy places entities (cells without a morphology)
    fn is_entities(&self) -> bool {
        false
    }
}

/// Geometry of a cell type
pub trait Morphology: Configurable {}

/// Connects the cells of the source cell types to those of the targets
pub trait ConnectionStrategy: Configurable {}

/// Persists a compiled network
pub trait OutputFormatter: Configurable {}

/// The component collections of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    CellModels,
    ConnectionModels,
    Devices,
    Entities,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::CellModels,
        ComponentKind::ConnectionModels,
        ComponentKind::Devices,
        ComponentKind::Entities,
    ];

    /// Key of the collection in a simulation section
    pub fn key(&self) -> &'static str {
        match self {
            ComponentKind::CellModels => "cell_models",
            ComponentKind::ConnectionModels => "connection_models",
            ComponentKind::Devices => "devices",
            ComponentKind::Entities => "entities",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Where a simulation component was declared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentContext {
    /// Name of the owning simulation
    pub simulation: String,
    /// Path of the component's collection, e.g. `simulations.sim.devices`
    pub node: NodePath,
}

/// Implementations a simulator uses for each component collection
#[derive(Debug, Clone)]
pub struct ComponentClasses {
    pub cell_models: ClassRef<dyn SimulationComponent>,
    pub connection_models: ClassRef<dyn SimulationComponent>,
    pub devices: ClassRef<dyn SimulationComponent>,
    /// `None` if the simulator does not support entities
    pub entities: Option<ClassRef<dyn SimulationComponent>>,
}

impl ComponentClasses {
    pub fn get(&self, kind: ComponentKind) -> Option<&ClassRef<dyn SimulationComponent>> {
        match kind {
            ComponentKind::CellModels => Some(&self.cell_models),
            ComponentKind::ConnectionModels => Some(&self.connection_models),
            ComponentKind::Devices => Some(&self.devices),
            ComponentKind::Entities => self.entities.as_ref(),
        }
    }
}

/// Interface to a simulation backend
pub trait SimulatorAdapter: Configurable {
    /// Implementations of the simulator's component collections
    fn component_classes(&self) -> ComponentClasses;
}

/// A cell model, connection model, device or entity of a simulation
pub trait SimulationComponent: Configurable {
    fn context(&self) -> &ComponentContext;

    fn set_context(&mut self, context: ComponentContext);

    /// Name of the connection model this one is taught by
    fn teaching(&self) -> Option<&str> {
        None
    }

    fn is_teaching(&self) -> bool {
        false
    }

    fn set_is_teaching(&mut self, _teaching: bool) {}

    /// Validate the component against its owning adapter
    fn validate_in(&mut self, _adapter: &dyn SimulatorAdapter, node: &NodePath) -> CompileResult<()> {
        self.validate(node)
    }
}
