// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The compiled network model

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::info;

use crate::capabilities::OutputFormatter;
use crate::geometry;
use crate::models::{CellType, CellTypeId, ConnectionType, Layer, Simulation, Stack, Volume};
use crate::types::CompileResult;

/// A fully resolved network document
///
/// Collections keep the order of the document. Cell types and layers can
/// also be addressed by their position in that order.
#[derive(Debug)]
pub struct ScaffoldConfig {
    pub(crate) source_name: String,
    pub(crate) raw: String,
    pub(crate) volume: Volume,
    pub(crate) output_formatter: Box<dyn OutputFormatter>,
    pub(crate) layers: IndexMap<String, Layer>,
    pub(crate) stacks: BTreeMap<i64, Stack>,
    pub(crate) cell_types: IndexMap<String, CellType>,
    pub(crate) connection_types: IndexMap<String, ConnectionType>,
    pub(crate) simulations: IndexMap<String, Simulation>,
}

impl ScaffoldConfig {
    /// File name of the document, or `<stream>`
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The document text as it was read
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn output_formatter(&self) -> &dyn OutputFormatter {
        &*self.output_formatter
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn layer_by_id(&self, id: usize) -> Option<&Layer> {
        self.layers.get_index(id).map(|(_, layer)| layer)
    }

    pub fn layer_id(&self, name: &str) -> Option<usize> {
        self.layers.get_index_of(name)
    }

    pub fn layers(&self) -> &IndexMap<String, Layer> {
        &self.layers
    }

    pub fn stacks(&self) -> &BTreeMap<i64, Stack> {
        &self.stacks
    }

    pub fn stack(&self, id: i64) -> Option<&Stack> {
        self.stacks.get(&id)
    }

    pub fn cell_type(&self, name: &str) -> Option<&CellType> {
        self.cell_types.get(name)
    }

    pub fn cell_type_by_id(&self, id: CellTypeId) -> Option<&CellType> {
        self.cell_types.get_index(id.0).map(|(_, cell_type)| cell_type)
    }

    pub fn cell_type_id(&self, name: &str) -> Option<CellTypeId> {
        self.cell_types.get(name).map(|cell_type| cell_type.id)
    }

    pub fn cell_types(&self) -> &IndexMap<String, CellType> {
        &self.cell_types
    }

    pub fn connection_type(&self, name: &str) -> Option<&ConnectionType> {
        self.connection_types.get(name)
    }

    pub fn connection_types(&self) -> &IndexMap<String, ConnectionType> {
        &self.connection_types
    }

    pub fn simulation(&self, name: &str) -> Option<&Simulation> {
        self.simulations.get(name)
    }

    pub fn simulation_mut(&mut self, name: &str) -> Option<&mut Simulation> {
        self.simulations.get_mut(name)
    }

    pub fn simulations(&self) -> &IndexMap<String, Simulation> {
        &self.simulations
    }

    /// Change the footprint of the volume
    ///
    /// Layers flagged `scaling` follow the new footprint proportionally and
    /// `xz_center` layers are recentred. `None` keeps an axis as it is, and
    /// resizing to the current footprint changes nothing. An extent that is
    /// not a finite positive number is rejected and leaves the volume as is.
    pub fn resize(&mut self, x: Option<f64>, z: Option<f64>) -> CompileResult<()> {
        geometry::resize(&mut self.volume, &mut self.layers, x, z)?;
        info!(target: "scaffold-compiler", "[GEOMETRY] Volume resized to {} x {}", self.volume.x, self.volume.z);
        Ok(())
    }
}
