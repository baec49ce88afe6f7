// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Built-in implementations.

These carry and check configuration only; the numerical algorithms behind
them live outside the compiler. Each module registers its types under its
own `scaffold.*` namespace.
*/

use crate::registry::TypeRegistry;

/// Factory of a built-in type constructed through `Default`
macro_rules! default_factory {
    ($capability:ident, $ty:ty) => {
        $crate::registry::factory(
            |_: &$crate::registry::Parameters| -> $crate::types::CompileResult<Box<dyn $capability>> {
                Ok(Box::new(<$ty>::default()))
            },
        )
    };
}
pub(crate) use default_factory;

pub mod connectivity;
pub mod morphology;
pub mod nest;
pub mod output;
pub mod placement;

/// Register every built-in implementation
pub fn register_builtins(registry: &mut TypeRegistry) {
    placement::register(registry);
    morphology::register(registry);
    connectivity::register(registry);
    output::register(registry);
    nest::register(registry);
}
