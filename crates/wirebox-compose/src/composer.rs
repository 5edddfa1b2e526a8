//! Flattens a module dependency graph into one merged, precedence-ordered
//! pair of service and decorator tables.
//!
//! The walk visits a module's dependents before the module itself, so a
//! module's own registrations land later in the flat list and override
//! anything it inherited. Deduplication keeps the first occurrence of a
//! module reachable through several paths, so a later sighting can never
//! demote overrides that other modules have already layered on top of it.

use wirebox_common::error::Result;
use wirebox_common::types::{DecoratorTable, ServiceTable};

use crate::module::Module;

/// The merged result of composing a module graph.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    /// Merged service table; on name collisions the later module won.
    pub services: ServiceTable,
    /// Merged decorator table; on name collisions the later module won.
    pub decorators: DecoratorTable,
}

/// Flattens the graph reachable from `roots` and merges every module's
/// exported tables left to right.
///
/// # Errors
///
/// Propagates [`WireboxError::ExportError`] from a module whose export
/// allow-list references an unregistered service.
///
/// [`WireboxError::ExportError`]: wirebox_common::error::WireboxError::ExportError
pub fn compose(roots: &[Module]) -> Result<Composition> {
    let modules = flatten(roots);
    tracing::debug!(
        roots = roots.len(),
        modules = modules.len(),
        "composing module graph"
    );

    let mut composition = Composition::default();
    for module in &modules {
        let exported = module.exported()?;
        composition.services.extend(exported.services);
        composition.decorators.extend(exported.decorators);
    }

    Ok(composition)
}

/// Pre-order walk over the module graph, dependents before self,
/// deduplicated by module identity keeping the first occurrence.
pub fn flatten(roots: &[Module]) -> Vec<Module> {
    let mut all = Vec::new();
    collect(roots, &mut all);

    let mut unique: Vec<Module> = Vec::new();
    for module in all {
        if !unique.contains(&module) {
            unique.push(module);
        }
    }
    unique
}

fn collect(modules: &[Module], all: &mut Vec<Module>) {
    for module in modules {
        collect(&module.dependent_modules(), all);
        all.push(module.clone());
    }
}
