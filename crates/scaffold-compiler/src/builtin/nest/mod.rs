// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
NEST simulator adapter, namespace `scaffold.simulators.nest`.

Only the configuration side of the adapter lives here: defaults, required
keys and casts of the adapter and its components, plus the kernel lease an
adapter holds while it drives a kernel.
*/

pub mod components;
pub mod kernel_lock;

use serde_json::Value;

use crate::attributes::{Attributes, Configurable, Schema};
use crate::capabilities::{ComponentClasses, SimulationComponent, SimulatorAdapter};
use crate::impl_configurable;
use crate::registry::{factory, ClassRef, Parameters, TypeRegistry};
use crate::types::{CompileError, CompileResult, NodePath};

pub use components::{NestCell, NestConnection, NestDevice, NestEntity};
pub use kernel_lock::{KernelLease, LockMode};

pub const NAMESPACE: &str = "scaffold.simulators.nest";

/// Key of the adapter in the simulator registry
pub const SIMULATOR_NAME: &str = "nest";

pub const DEFAULT_SYNAPSE_MODEL: &str = "static_synapse";
pub const DEFAULT_NEURON_MODEL: &str = "iaf_cond_alpha";

/// Name of the kernel leased by NEST adapters
pub const KERNEL_NAME: &str = "nest";

pub fn register(registry: &mut TypeRegistry) {
    registry.register::<dyn SimulatorAdapter>(
        &format!("{}.NestAdapter", NAMESPACE),
        factory(|_: &Parameters| -> CompileResult<Box<dyn SimulatorAdapter>> { Ok(Box::new(NestAdapter::default())) }),
    );
    registry.register::<dyn SimulationComponent>(
        &format!("{}.NestCell", NAMESPACE),
        factory(|p: &Parameters| -> CompileResult<Box<dyn SimulationComponent>> { Ok(Box::new(NestCell::new(p))) }),
    );
    registry.register::<dyn SimulationComponent>(
        &format!("{}.NestConnection", NAMESPACE),
        factory(|p: &Parameters| -> CompileResult<Box<dyn SimulationComponent>> { Ok(Box::new(NestConnection::new(p))) }),
    );
    registry.register::<dyn SimulationComponent>(
        &format!("{}.NestDevice", NAMESPACE),
        factory(|p: &Parameters| -> CompileResult<Box<dyn SimulationComponent>> { Ok(Box::new(NestDevice::new(p))) }),
    );
    registry.register::<dyn SimulationComponent>(
        &format!("{}.NestEntity", NAMESPACE),
        factory(|p: &Parameters| -> CompileResult<Box<dyn SimulationComponent>> { Ok(Box::new(NestEntity::new(p))) }),
    );
}

/// Qualified name of the adapter, as registered by [`register`]
pub fn adapter_class() -> ClassRef<dyn SimulatorAdapter> {
    ClassRef::named(format!("{}.NestAdapter", NAMESPACE))
}

fn adapter_schema() -> Schema {
    Schema::new()
        .default_value("default_synapse_model", Value::from(DEFAULT_SYNAPSE_MODEL))
        .default_value("default_neuron_model", Value::from(DEFAULT_NEURON_MODEL))
        .default_value("verbosity", Value::from("M_ERROR"))
        .default_value("threads", Value::from(1))
        .default_value("resolution", Value::from(1.0))
        .default_value("modules", Value::Array(Vec::new()))
        .required(&[
            "default_neuron_model",
            "default_synapse_model",
            "duration",
            "resolution",
            "threads",
        ])
        .cast_int(&["threads", "virtual_processes"])
        .cast_float(&["duration", "resolution"])
}

/// Configuration of a NEST simulation
#[derive(Debug, Default)]
pub struct NestAdapter {
    name: String,
    attributes: Attributes,
    lease: Option<KernelLease>,
}

impl NestAdapter {
    pub fn duration(&self) -> Option<f64> {
        self.attributes.get_f64("duration")
    }

    pub fn threads(&self) -> i64 {
        self.attributes.get_i64("threads").unwrap_or(1)
    }

    pub fn modules(&self) -> Vec<&str> {
        self.attributes
            .get("modules")
            .and_then(Value::as_array)
            .map(|m| m.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Lock mode from the `multi` and `suffix` attributes
    pub fn lock_mode(&self) -> LockMode {
        if self.attributes.get_bool("multi").unwrap_or(false) {
            LockMode::Multi {
                suffix: self.attributes.get_str("suffix").unwrap_or_default().to_string(),
            }
        } else {
            LockMode::Single
        }
    }

    /// Lease the NEST kernel for the lifetime of the adapter
    pub fn lock_kernel(&mut self) -> CompileResult<()> {
        if self.lease.is_none() {
            self.lease = Some(KernelLease::acquire(KERNEL_NAME, self.lock_mode())?);
        }
        Ok(())
    }

    /// Give the kernel back; `false` if it was not leased
    pub fn release_kernel(&mut self) -> bool {
        self.lease.take().is_some()
    }

    pub fn has_lock(&self) -> bool {
        self.lease.is_some()
    }

    /// Whether this adapter is the only one driving the kernel
    pub fn in_full_control(&self) -> CompileResult<bool> {
        self.lease
            .as_ref()
            .map(KernelLease::in_full_control)
            .ok_or_else(|| CompileError::KernelLocked {
                kernel: KERNEL_NAME.to_string(),
                message: "can't check if we're in full control of the kernel: we have no lock on it".to_string(),
            })
    }
}

impl_configurable!(NestAdapter, "NestAdapter", {
    fn validate(&mut self, node: &NodePath) -> CompileResult<()> {
        adapter_schema().apply(&mut self.attributes, node)?;
        match self.attributes.get("modules") {
            Some(Value::Array(modules)) if modules.iter().all(Value::is_string) => Ok(()),
            _ => Err(CompileError::configuration(
                &node.child("modules"),
                "Expected a list of module names",
            )),
        }
    }
});

impl SimulatorAdapter for NestAdapter {
    fn component_classes(&self) -> ComponentClasses {
        ComponentClasses {
            cell_models: ClassRef::named(format!("{}.NestCell", NAMESPACE)),
            connection_models: ClassRef::named(format!("{}.NestConnection", NAMESPACE)),
            devices: ClassRef::named(format!("{}.NestDevice", NAMESPACE)),
            entities: Some(ClassRef::named(format!("{}.NestEntity", NAMESPACE))),
        }
    }
}
