// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection strategies, namespace `scaffold.connectivity`

use super::default_factory;
use crate::attributes::{Attributes, Schema};
use crate::capabilities::ConnectionStrategy;
use crate::impl_configurable;
use crate::registry::TypeRegistry;
use crate::types::{CompileError, CompileResult, NodePath};

pub const NAMESPACE: &str = "scaffold.connectivity";

pub fn register(registry: &mut TypeRegistry) {
    registry.register::<dyn ConnectionStrategy>(
        &format!("{}.AllToAll", NAMESPACE),
        default_factory!(ConnectionStrategy, AllToAll),
    );
    registry.register::<dyn ConnectionStrategy>(
        &format!("{}.TouchingConvergenceDivergence", NAMESPACE),
        default_factory!(ConnectionStrategy, TouchingConvergenceDivergence),
    );
    registry.register::<dyn ConnectionStrategy>(
        &format!("{}.FiberIntersection", NAMESPACE),
        default_factory!(ConnectionStrategy, FiberIntersection),
    );
}

/// Every source cell to every target cell
#[derive(Debug, Default)]
pub struct AllToAll {
    name: String,
    attributes: Attributes,
}

impl_configurable!(AllToAll, "AllToAll", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&[])
    }
});
impl ConnectionStrategy for AllToAll {}

/// Connections between touching cells, bounded by convergence and divergence
#[derive(Debug, Default)]
pub struct TouchingConvergenceDivergence {
    name: String,
    attributes: Attributes,
}

impl_configurable!(TouchingConvergenceDivergence, "TouchingConvergenceDivergence", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&["convergence", "divergence"])
    }

    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        Schema::new()
            .required(&["convergence", "divergence"])
            .cast_int(&["convergence", "divergence"])
            .apply(&mut self.attributes, node)?;
        for key in ["convergence", "divergence"] {
            if self.attributes.get_i64(key).unwrap_or(0) < 1 {
                return Err(CompileError::configuration(&node.child(key), "Must be at least 1"));
            }
        }
        Ok(())
    }
});
impl ConnectionStrategy for TouchingConvergenceDivergence {}

/// Connections where fibers intersect target cells
#[derive(Debug, Default)]
pub struct FiberIntersection {
    name: String,
    attributes: Attributes,
}

impl_configurable!(FiberIntersection, "FiberIntersection", {
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        Some(&["resolution", "affinity", "to_plot"])
    }

    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        Schema::new()
            .default_value("resolution", serde_json::Value::from(20.0))
            .default_value("affinity", serde_json::Value::from(1.0))
            .cast_float(&["resolution", "affinity"])
            .apply(&mut self.attributes, node)
    }
});
impl ConnectionStrategy for FiberIntersection {}
