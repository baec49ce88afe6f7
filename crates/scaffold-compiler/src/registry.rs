// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Dynamic type registry.

Maps qualified names (`namespace.path.Identifier`) to constructors. A
constructor is tied to exactly one capability; asking for a name under another
capability fails with [`CompileError::CapabilityMismatch`].

Callers can also skip the lookup by handing a factory directly
([`ClassRef::Handle`]).
*/

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::attributes::Configurable;
use crate::capabilities::{
    ConnectionStrategy, Morphology, OutputFormatter, PlacementStrategy, SimulationComponent,
    SimulatorAdapter,
};
use crate::types::{CompileError, CompileResult, NodePath};

/// Constructor parameters
pub type Parameters = Map<String, Value>;

/// Creates an instance of a capability
pub type Factory<T> = Arc<dyn Fn(&Parameters) -> CompileResult<Box<T>> + Send + Sync>;

/// Wrap a closure as a [`Factory`]
pub fn factory<T, F>(f: F) -> Factory<T>
where
    T: ?Sized,
    F: Fn(&Parameters) -> CompileResult<Box<T>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identifies the capability a constructor provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Placement,
    Morphology,
    Connection,
    Output,
    Simulator,
    Component,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapabilityKind::Placement => "PlacementStrategy",
            CapabilityKind::Morphology => "Morphology",
            CapabilityKind::Connection => "ConnectionStrategy",
            CapabilityKind::Output => "OutputFormatter",
            CapabilityKind::Simulator => "SimulatorAdapter",
            CapabilityKind::Component => "SimulationComponent",
        };
        write!(f, "{}", name)
    }
}

/// A registered constructor
#[derive(Clone)]
pub enum Constructor {
    Placement(Factory<dyn PlacementStrategy>),
    Morphology(Factory<dyn Morphology>),
    Connection(Factory<dyn ConnectionStrategy>),
    Output(Factory<dyn OutputFormatter>),
    Simulator(Factory<dyn SimulatorAdapter>),
    Component(Factory<dyn SimulationComponent>),
}

impl Constructor {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Constructor::Placement(_) => CapabilityKind::Placement,
            Constructor::Morphology(_) => CapabilityKind::Morphology,
            Constructor::Connection(_) => CapabilityKind::Connection,
            Constructor::Output(_) => CapabilityKind::Output,
            Constructor::Simulator(_) => CapabilityKind::Simulator,
            Constructor::Component(_) => CapabilityKind::Component,
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({})", self.kind())
    }
}

/// Links a capability trait object type to its [`Constructor`] variant
pub trait Capability {
    const KIND: CapabilityKind;

    fn factory(constructor: &Constructor) -> Option<&Factory<Self>>;

    fn constructor(factory: Factory<Self>) -> Constructor;
}

macro_rules! capability {
    ($trait_object:ty, $variant:ident) => {
        impl Capability for $trait_object {
            const KIND: CapabilityKind = CapabilityKind::$variant;

            fn factory(constructor: &Constructor) -> Option<&Factory<Self>> {
                match constructor {
                    Constructor::$variant(f) => Some(f),
                    _ => None,
                }
            }

            fn constructor(factory: Factory<Self>) -> Constructor {
                Constructor::$variant(factory)
            }
        }
    };
}

capability!(dyn PlacementStrategy, Placement);
capability!(dyn Morphology, Morphology);
capability!(dyn ConnectionStrategy, Connection);
capability!(dyn OutputFormatter, Output);
capability!(dyn SimulatorAdapter, Simulator);
capability!(dyn SimulationComponent, Component);

/// Reference to an implementation: by qualified name or by factory
pub enum ClassRef<T: ?Sized> {
    Named(String),
    Handle(Factory<T>),
}

impl<T: ?Sized> ClassRef<T> {
    pub fn named(qualified_name: impl Into<String>) -> Self {
        ClassRef::Named(qualified_name.into())
    }

    /// Qualified name, or `<handle>` for factories
    pub fn describe(&self) -> &str {
        match self {
            ClassRef::Named(name) => name,
            ClassRef::Handle(_) => "<handle>",
        }
    }
}

impl<T: ?Sized> Clone for ClassRef<T> {
    fn clone(&self) -> Self {
        match self {
            ClassRef::Named(name) => ClassRef::Named(name.clone()),
            ClassRef::Handle(f) => ClassRef::Handle(Arc::clone(f)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ClassRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ClassRef::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl<T: ?Sized> From<&str> for ClassRef<T> {
    fn from(name: &str) -> Self {
        ClassRef::Named(name.to_string())
    }
}

/// Split `a.b.C` into (`a.b`, `C`); a name without dots has an empty namespace
pub fn split_qualified_name(qualified_name: &str) -> (&str, &str) {
    qualified_name.rsplit_once('.').unwrap_or(("", qualified_name))
}

/// Namespace → identifier → constructor
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    namespaces: HashMap<String, HashMap<String, Constructor>>,
}

impl TypeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in implementations
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_builtins(&mut registry);
        registry
    }

    /// Register a constructor, returning the one it replaces
    pub fn register_constructor(&mut self, qualified_name: &str, constructor: Constructor) -> Option<Constructor> {
        let (namespace, identifier) = split_qualified_name(qualified_name);
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(identifier.to_string(), constructor)
    }

    /// Register a factory for capability `T`
    pub fn register<T: Capability + ?Sized>(&mut self, qualified_name: &str, factory: Factory<T>) -> Option<Constructor> {
        self.register_constructor(qualified_name, T::constructor(factory))
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.lookup(qualified_name).is_some()
    }

    /// Constructor registered under a qualified name
    pub fn lookup(&self, qualified_name: &str) -> Option<&Constructor> {
        let (namespace, identifier) = split_qualified_name(qualified_name);
        self.namespaces.get(namespace)?.get(identifier)
    }

    /// Every registered qualified name, sorted
    pub fn qualified_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .namespaces
            .iter()
            .flat_map(|(ns, ids)| {
                ids.keys().map(move |id| {
                    if ns.is_empty() {
                        id.clone()
                    } else {
                        format!("{}.{}", ns, id)
                    }
                })
            })
            .collect();
        names.sort();
        names
    }

    /// Resolve a class reference into a named instance of capability `T`
    ///
    /// # Errors
    ///
    /// [`CompileError::TypeNotFound`] if a qualified name is not registered,
    /// [`CompileError::CapabilityMismatch`] if it is registered under another
    /// capability, or whatever the factory returns.
    pub fn instantiate<T>(
        &self,
        name: &str,
        class: &ClassRef<T>,
        parameters: &Parameters,
        node: &NodePath,
    ) -> CompileResult<Box<T>>
    where
        T: Capability + Configurable + ?Sized,
    {
        let mut instance = match class {
            ClassRef::Handle(factory) => factory(parameters)?,
            ClassRef::Named(qualified_name) => {
                let constructor = self.lookup(qualified_name).ok_or_else(|| CompileError::TypeNotFound {
                    node: node.clone(),
                    qualified_name: qualified_name.clone(),
                })?;
                let factory = T::factory(constructor).ok_or_else(|| CompileError::CapabilityMismatch {
                    node: node.clone(),
                    type_name: qualified_name.clone(),
                    expected: T::KIND.to_string(),
                })?;
                factory(parameters)?
            }
        };
        instance.set_name(name);
        debug!(target: "scaffold-compiler", "[REGISTRY] {} '{}' -> {}", T::KIND, name, class.describe());
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::impl_configurable;

    #[derive(Debug, Default)]
    struct Grid {
        name: String,
        attributes: Attributes,
    }

    impl_configurable!(Grid, "Grid");
    impl PlacementStrategy for Grid {}

    fn grid_factory() -> Factory<dyn PlacementStrategy> {
        factory(|_: &Parameters| -> CompileResult<Box<dyn PlacementStrategy>> { Ok(Box::new(Grid::default())) })
    }

    #[test]
    fn test_split_qualified_name() {
        assert_eq!(split_qualified_name("scaffold.placement.Grid"), ("scaffold.placement", "Grid"));
        assert_eq!(split_qualified_name("Grid"), ("", "Grid"));
    }

    #[test]
    fn test_instantiate_by_name_assigns_name() {
        let mut registry = TypeRegistry::new();
        registry.register::<dyn PlacementStrategy>("test.Grid", grid_factory());

        let instance = registry
            .instantiate::<dyn PlacementStrategy>("granule_placement", &"test.Grid".into(), &Parameters::new(), &NodePath::root())
            .unwrap();
        assert_eq!(instance.name(), "granule_placement");
        assert_eq!(instance.class_name(), "Grid");
    }

    #[test]
    fn test_instantiate_by_handle_skips_lookup() {
        let registry = TypeRegistry::new();
        let class = ClassRef::Handle(grid_factory());
        let instance = registry
            .instantiate::<dyn PlacementStrategy>("p", &class, &Parameters::new(), &NodePath::root())
            .unwrap();
        assert_eq!(instance.name(), "p");
    }

    #[test]
    fn test_unknown_name() {
        let registry = TypeRegistry::new();
        let err = registry
            .instantiate::<dyn PlacementStrategy>("p", &"test.Missing".into(), &Parameters::new(), &NodePath::of("cell_types"))
            .unwrap_err();
        assert!(matches!(err, CompileError::TypeNotFound { ref qualified_name, .. } if qualified_name == "test.Missing"));
    }

    #[test]
    fn test_capability_mismatch_names_type_and_capability() {
        let mut registry = TypeRegistry::new();
        registry.register::<dyn PlacementStrategy>("test.Grid", grid_factory());
        let err = registry
            .instantiate::<dyn ConnectionStrategy>("c", &"test.Grid".into(), &Parameters::new(), &NodePath::of("connection_types"))
            .unwrap_err();
        match err {
            CompileError::CapabilityMismatch { type_name, expected, .. } => {
                assert_eq!(type_name, "test.Grid");
                assert_eq!(expected, "ConnectionStrategy");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = TypeRegistry::with_builtins();
        assert!(registry.contains("scaffold.placement.ParticlePlacement"));
        assert!(registry.contains("scaffold.simulators.nest.NestAdapter"));
        assert_eq!(
            registry.lookup("scaffold.morphologies.NoGeometry").map(Constructor::kind),
            Some(CapabilityKind::Morphology)
        );
    }
}
