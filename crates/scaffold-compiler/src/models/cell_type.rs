// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cell types and their placement

use std::fmt;

use serde::Serialize;

use crate::capabilities::{Morphology, PlacementStrategy};

/// Index of a cell type in the configuration, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellTypeId(pub usize);

impl fmt::Display for CellTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many cells of a type are placed
///
/// A placement block declares exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DensityMode {
    /// Cells per unit of volume
    Density(f64),
    /// Cells per unit of X/Z area
    PlanarDensity(f64),
    /// Absolute number of cells
    Count(f64),
    /// Number of cells relative to the count of another cell type
    PlacementCountRatio { ratio: f64, relative_to: String },
    /// Density relative to the density of another cell type
    DensityRatio { ratio: f64, relative_to: String },
}

impl DensityMode {
    /// Section keys of the modes
    pub const KEYS: [&'static str; 5] = [
        "density",
        "planar_density",
        "count",
        "placement_count_ratio",
        "density_ratio",
    ];

    /// Build the mode declared under `key`; `None` for unknown keys or a
    /// ratio mode without its reference
    pub fn from_key(key: &str, value: f64, relative_to: Option<String>) -> Option<Self> {
        match key {
            "density" => Some(DensityMode::Density(value)),
            "planar_density" => Some(DensityMode::PlanarDensity(value)),
            "count" => Some(DensityMode::Count(value)),
            "placement_count_ratio" => relative_to.map(|relative_to| DensityMode::PlacementCountRatio {
                ratio: value,
                relative_to,
            }),
            "density_ratio" => relative_to.map(|relative_to| DensityMode::DensityRatio {
                ratio: value,
                relative_to,
            }),
            _ => None,
        }
    }

    pub fn is_ratio_key(key: &str) -> bool {
        matches!(key, "placement_count_ratio" | "density_ratio")
    }

    pub fn key(&self) -> &'static str {
        match self {
            DensityMode::Density(_) => "density",
            DensityMode::PlanarDensity(_) => "planar_density",
            DensityMode::Count(_) => "count",
            DensityMode::PlacementCountRatio { .. } => "placement_count_ratio",
            DensityMode::DensityRatio { .. } => "density_ratio",
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            DensityMode::Density(v) | DensityMode::PlanarDensity(v) | DensityMode::Count(v) => *v,
            DensityMode::PlacementCountRatio { ratio, .. } | DensityMode::DensityRatio { ratio, .. } => *ratio,
        }
    }

    /// Cell type a ratio mode is relative to
    pub fn relative_to(&self) -> Option<&str> {
        match self {
            DensityMode::PlacementCountRatio { relative_to, .. } | DensityMode::DensityRatio { relative_to, .. } => {
                Some(relative_to)
            }
            _ => None,
        }
    }
}

/// Placement of a cell type: the strategy and its structured fields
#[derive(Debug)]
pub struct Placement {
    pub strategy: Box<dyn PlacementStrategy>,
    /// Name of the layer cells are placed in
    pub layer: String,
    /// `None` for entity types
    pub soma_radius: Option<f64>,
    pub density: DensityMode,
}

impl Placement {
    /// Shorthand for the soma radius
    pub fn radius(&self) -> Option<f64> {
        self.soma_radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plotting {
    pub label: String,
    pub color: String,
    pub opacity: f64,
}

impl Plotting {
    pub const DEFAULT_COLOR: &'static str = "#000000";
    pub const DEFAULT_OPACITY: f64 = 1.0;

    pub fn for_cell_type(name: &str) -> Self {
        Self {
            label: name.to_string(),
            color: Self::DEFAULT_COLOR.to_string(),
            opacity: Self::DEFAULT_OPACITY,
        }
    }
}

/// A population of cells
#[derive(Debug)]
pub struct CellType {
    pub name: String,
    pub id: CellTypeId,
    pub placement: Placement,
    /// Absent for entity types
    pub morphology: Option<Box<dyn Morphology>>,
    pub plotting: Plotting,
    /// Cells without a morphology, e.g. stimulation devices
    pub entity: bool,
}
