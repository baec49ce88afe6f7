// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The configuration compiler.

A document is compiled in stages, each one free to look up what the previous
stages produced:

1. `network_architecture`: the base volume
2. `output`: the output formatter
3. `layers`: layers, then volume scaling and stacking
4. `cell_types`: placement and morphology of every type
5. `connection_types`: strategies and their resolved endpoints
6. `simulations`: adapters, components and the teaching order

Within a collection every entry is initialised before any entry is
finalized, so finalizers may refer to siblings declared later.
*/

mod builder;
mod cell_types;
mod connection_types;
mod general;
mod layers;
mod simulations;

use std::fmt;
use std::path::Path;
use std::time::Instant;

use indexmap::IndexMap;
use scaffold_config::ScaffoldSettings;
use tracing::{debug, info};

use crate::builtin::nest;
use crate::capabilities::SimulatorAdapter;
use crate::config::ScaffoldConfig;
use crate::document::{parse_document, read_document, DocumentSource, JsonFormat};
use crate::registry::{ClassRef, TypeRegistry};
use crate::sections::{load_section, Finalize};
use crate::types::{CompileResult, NodePath};
use builder::ConfigBuilder;

/// Stage of a compilation, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    Architecture,
    Output,
    Layers,
    CellTypes,
    ConnectionTypes,
    Simulations,
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            CompileStage::Architecture => "network_architecture",
            CompileStage::Output => "output",
            CompileStage::Layers => "layers",
            CompileStage::CellTypes => "cell_types",
            CompileStage::ConnectionTypes => "connection_types",
            CompileStage::Simulations => "simulations",
        };
        f.write_str(key)
    }
}

/// Compiles network documents into [`ScaffoldConfig`]s
///
/// Holds the type registry used to resolve `class`, `format` and component
/// names, and the table of known simulators.
pub struct ConfigCompiler {
    registry: TypeRegistry,
    simulators: IndexMap<String, ClassRef<dyn SimulatorAdapter>>,
    settings: ScaffoldSettings,
}

impl Default for ConfigCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigCompiler {
    /// Compiler with the built-in implementations and the NEST simulator
    pub fn new() -> Self {
        Self::with_settings(ScaffoldSettings::default())
    }

    pub fn with_settings(settings: ScaffoldSettings) -> Self {
        let mut simulators = IndexMap::new();
        simulators.insert(nest::SIMULATOR_NAME.to_string(), nest::adapter_class());
        Self {
            registry: TypeRegistry::with_builtins(),
            simulators,
            settings,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Registry to add third-party implementations to
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// Make `simulator` available to `simulations.*.simulator`
    ///
    /// Replaces and returns the adapter previously registered under the name.
    pub fn register_simulator(
        &mut self,
        simulator: &str,
        adapter: ClassRef<dyn SimulatorAdapter>,
    ) -> Option<ClassRef<dyn SimulatorAdapter>> {
        self.simulators.insert(simulator.to_string(), adapter)
    }

    pub fn simulators(&self) -> impl Iterator<Item = &str> {
        self.simulators.keys().map(String::as_str)
    }

    pub fn settings(&self) -> &ScaffoldSettings {
        &self.settings
    }

    /// Compile the document at `path`, searching the configured paths
    pub fn compile_file(&self, path: impl AsRef<Path>) -> CompileResult<ScaffoldConfig> {
        self.compile(&DocumentSource::file(path.as_ref()))
    }

    /// Compile a document held in memory
    pub fn compile_str(&self, text: &str) -> CompileResult<ScaffoldConfig> {
        self.compile(&DocumentSource::stream(text))
    }

    pub fn compile(&self, source: &DocumentSource) -> CompileResult<ScaffoldConfig> {
        let started = Instant::now();
        let document = read_document(source, &self.settings.documents)?;
        let root = parse_document(&JsonFormat, &document)?;
        info!(target: "scaffold-compiler", "📄 [DOCUMENT] Compiling '{}'", document.name);

        let mut builder = ConfigBuilder::new(&self.registry, &self.simulators, self.settings.compiler.strict_attributes);
        let top = NodePath::root();

        let stage = |stage: CompileStage, count: Option<usize>| match count {
            Some(count) => debug!(target: "scaffold-compiler", "[COMPILE] Stage {}: {} entries", stage, count),
            None => debug!(target: "scaffold-compiler", "[COMPILE] Stage {} done", stage),
        };

        builder.load_architecture(&root)?;
        stage(CompileStage::Architecture, None);

        builder.load_output(&root)?;
        stage(CompileStage::Output, None);

        let count = load_section(
            &mut builder,
            &root,
            "layers",
            &top,
            ConfigBuilder::init_layer,
            Finalize::Collection(ConfigBuilder::finalize_layers),
        )?;
        stage(CompileStage::Layers, Some(count));

        let count = load_section(
            &mut builder,
            &root,
            "cell_types",
            &top,
            ConfigBuilder::init_cell_type,
            Finalize::PerEntry(ConfigBuilder::finalize_cell_type),
        )?;
        stage(CompileStage::CellTypes, Some(count));

        let count = load_section(
            &mut builder,
            &root,
            "connection_types",
            &top,
            ConfigBuilder::init_connection_type,
            Finalize::PerEntry(ConfigBuilder::finalize_connection_type),
        )?;
        stage(CompileStage::ConnectionTypes, Some(count));

        let count = load_section(
            &mut builder,
            &root,
            "simulations",
            &top,
            ConfigBuilder::init_simulation,
            Finalize::PerEntry(ConfigBuilder::finalize_simulation),
        )?;
        stage(CompileStage::Simulations, Some(count));

        let config = builder.into_config(document.name, document.text)?;
        info!(target: "scaffold-compiler",
            "✅ [COMPILE] '{}' compiled in {:?}: {} layers, {} cell types, {} connection types, {} simulations",
            config.source_name(),
            started.elapsed(),
            config.layers().len(),
            config.cell_types().len(),
            config.connection_types().len(),
            config.simulations().len()
        );
        Ok(config)
    }
}
