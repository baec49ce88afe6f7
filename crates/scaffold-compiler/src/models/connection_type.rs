// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection types

use crate::capabilities::ConnectionStrategy;
use crate::models::cell_type::CellTypeId;

pub const DEFAULT_FROM_COMPARTMENTS: &[&str] = &["axon"];
pub const DEFAULT_TO_COMPARTMENTS: &[&str] = &["dendrites"];

/// A connection rule between source and target cell types
///
/// `from_cell_types[i]` connects through `from_compartments[i]`, likewise
/// for the targets.
#[derive(Debug)]
pub struct ConnectionType {
    pub name: String,
    pub strategy: Box<dyn ConnectionStrategy>,
    pub from_cell_types: Vec<CellTypeId>,
    pub from_compartments: Vec<Vec<String>>,
    pub to_cell_types: Vec<CellTypeId>,
    pub to_compartments: Vec<Vec<String>>,
}

impl ConnectionType {
    /// (source, compartments) pairs
    pub fn sources(&self) -> impl Iterator<Item = (CellTypeId, &[String])> {
        self.from_cell_types
            .iter()
            .copied()
            .zip(self.from_compartments.iter().map(Vec::as_slice))
    }

    /// (target, compartments) pairs
    pub fn targets(&self) -> impl Iterator<Item = (CellTypeId, &[String])> {
        self.to_cell_types
            .iter()
            .copied()
            .zip(self.to_compartments.iter().map(Vec::as_slice))
    }
}
