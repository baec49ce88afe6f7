// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Entities of a compiled network configuration

pub mod cell_type;
pub mod connection_type;
pub mod layer;
pub mod simulation;

pub use cell_type::{CellType, CellTypeId, DensityMode, Placement, Plotting};
pub use connection_type::{ConnectionType, DEFAULT_FROM_COMPARTMENTS, DEFAULT_TO_COMPARTMENTS};
pub use layer::{Layer, Stack, StackSlot, Volume, VolumeScale};
pub use simulation::{Components, Simulation};
