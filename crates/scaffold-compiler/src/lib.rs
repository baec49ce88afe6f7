// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Scaffold Configuration Compiler

Turns a declarative network document into a resolved object graph:

- Document I/O (JSON text → generic tree)
- Dynamic type registry (qualified name → capability-checked implementation)
- Two-phase section loading (init every entry, then finalize)
- Layer geometry (volume scaling, stacking, resizing)
- Simulation setups with teaching-dependency ordering

## Architecture

```text
DocumentSource ──read──▶ RawDocument ──parse──▶ tree
                                                 │
                        ConfigCompiler ◀─────────┘
                          │  network_architecture, output
                          │  layers ──▶ volume scaling, stacks
                          │  cell_types ──▶ placement, morphology
                          │  connection_types ──▶ endpoint resolution
                          │  simulations ──▶ components, teaching order
                          ▼
                     ScaffoldConfig
```

Implementations are looked up in a [`TypeRegistry`]; the built-in ones live in
[`builtin`] and third-party code registers its own before compiling.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod attributes;
pub mod builtin;
pub mod capabilities;
pub mod compiler;
pub mod config;
pub mod document;
pub mod geometry;
pub mod models;
pub mod ordering;
pub mod registry;
pub mod sections;
pub mod types;

// Re-export commonly used types
pub use attributes::{Attributes, Configurable, Schema};
pub use capabilities::{
    ComponentClasses, ComponentContext, ComponentKind, ConnectionStrategy, Morphology, OutputFormatter,
    PlacementStrategy, SimulationComponent, SimulatorAdapter,
};
pub use compiler::{CompileStage, ConfigCompiler};
pub use config::ScaffoldConfig;
pub use document::DocumentSource;
pub use registry::{factory, ClassRef, Factory, Parameters, TypeRegistry};
pub use types::{CompileError, CompileResult, NodePath};
