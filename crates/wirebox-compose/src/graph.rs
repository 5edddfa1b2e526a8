//! Static service dependency graph using `petgraph`.
//!
//! Advisory pre-flight tooling over a [`Composition`]: topological
//! resolution order and dangling-reference detection, without constructing a
//! single service. The runtime engine does not consult this graph; its own
//! stack-based cycle detection reports the exact in-flight resolution path.

use std::collections::HashMap;

use wirebox_common::constants::CONTAINER_SERVICE_NAME;
use wirebox_common::error::{Result, WireboxError};

use crate::composer::Composition;

/// A dependency graph over a composition's service names.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: petgraph::Graph<String, ()>,
    /// `(service, dependency)` pairs whose dependency has no definition.
    missing: Vec<(String, String)>,
}

impl DependencyGraph {
    /// Builds the graph for `composition`.
    ///
    /// Each edge points from a dependency to its dependent so that
    /// topological sort yields dependencies first. Decorator dependencies
    /// count as dependencies of the decorated service. References to the
    /// reserved container self-service are always satisfiable and produce
    /// neither an edge nor a missing entry.
    #[must_use]
    pub fn from_composition(composition: &Composition) -> Self {
        let mut graph = petgraph::Graph::new();
        let mut indices = HashMap::new();
        for name in composition.services.keys() {
            let idx = graph.add_node(name.clone());
            let _ = indices.insert(name.as_str(), idx);
        }

        let mut missing = Vec::new();
        let decorated = composition
            .decorators
            .iter()
            .filter(|(name, _)| composition.services.contains_key(*name))
            .map(|(name, definition)| (name, &definition.dependencies));
        let edges = composition
            .services
            .iter()
            .map(|(name, definition)| (name, &definition.dependencies))
            .chain(decorated);

        for (name, dependencies) in edges {
            for dependency in dependencies {
                if dependency == CONTAINER_SERVICE_NAME {
                    continue;
                }
                match (indices.get(dependency.as_str()), indices.get(name.as_str())) {
                    (Some(&from), Some(&to)) => {
                        let _ = graph.add_edge(from, to, ());
                    }
                    _ => missing.push((name.clone(), dependency.clone())),
                }
            }
        }

        Self { graph, missing }
    }

    /// Returns every `(service, dependency)` pair referencing an undefined
    /// name.
    #[must_use]
    pub fn missing_dependencies(&self) -> &[(String, String)] {
        &self.missing
    }

    /// Returns a topological ordering of service names, dependencies before
    /// dependents.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::CircularDependency`] naming one service on a
    /// cycle if the graph is cyclic. Unlike the runtime engine, no request
    /// path is available here.
    pub fn resolution_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => Err(WireboxError::CircularDependency {
                path: self
                    .graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_default(),
            }),
        }
    }
}
