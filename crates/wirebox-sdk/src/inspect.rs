//! Pre-flight inspection of a module set.
//!
//! Composes modules without constructing any service and answers structural
//! questions: in what order could everything be built, and which dependency
//! references dangle.

use wirebox_common::error::Result;
use wirebox_compose::composer;
use wirebox_compose::graph::DependencyGraph;
use wirebox_compose::module::Module;

/// High-level inspector over a composed module set.
#[derive(Debug)]
pub struct GraphInspector {
    graph: DependencyGraph,
}

impl GraphInspector {
    /// Composes `modules` and builds the static dependency graph.
    ///
    /// # Errors
    ///
    /// Propagates composition failures (e.g. an invalid export allow-list).
    pub fn new(modules: &[Module]) -> Result<Self> {
        let composition = composer::compose(modules)?;
        tracing::debug!(
            services = composition.services.len(),
            "inspecting composition"
        );
        Ok(Self {
            graph: DependencyGraph::from_composition(&composition),
        })
    }

    /// Returns a topological construction order, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::CircularDependency`] if the service graph is
    /// cyclic.
    ///
    /// [`WireboxError::CircularDependency`]: wirebox_common::error::WireboxError::CircularDependency
    pub fn resolution_order(&self) -> Result<Vec<String>> {
        self.graph.resolution_order()
    }

    /// Returns every `(service, dependency)` pair referencing an undefined
    /// name.
    #[must_use]
    pub fn missing_dependencies(&self) -> &[(String, String)] {
        self.graph.missing_dependencies()
    }
}
