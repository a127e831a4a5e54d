//! Service dependency graph using `petgraph`.
//!
//! Builds a directed graph from `depends_on` declarations and resolves a
//! start order in which every service comes after its dependencies.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use appack_common::error::{AppError, Result};

use crate::model::ComposeFile;

/// A dependency graph of services.
#[derive(Debug, Default)]
pub struct ServiceGraph {
    graph: petgraph::Graph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl ServiceGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of a compose file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MalformedCompose`] if a service depends on a
    /// service that is not declared.
    pub fn from_compose(file: &ComposeFile) -> Result<Self> {
        let mut graph = Self::new();
        for name in file.service_names() {
            let _ = graph.add_service(name);
        }
        for (name, service) in &file.services {
            for dependency in &service.depends_on {
                if !graph.nodes.contains_key(dependency) {
                    return Err(AppError::MalformedCompose {
                        reason: format!(
                            "service \"{name}\" depends on undefined service \"{dependency}\""
                        ),
                    });
                }
                graph.add_dependency(name, dependency);
            }
        }
        Ok(graph)
    }

    /// Adds a service node, returning the existing node if already present.
    pub fn add_service(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        let _ = self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Records that `dependent` depends on `dependency`.
    ///
    /// The edge points from `dependency` to `dependent` so that a
    /// topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        let from = self.add_service(dependency);
        let to = self.add_service(dependent);
        let _ = self.graph.add_edge(from, to, ());
    }

    /// Number of services in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no services.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the services in start order: dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MalformedCompose`] naming a service on the cycle
    /// if the dependencies are cyclic.
    pub fn start_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let service = self
                    .graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_default();
                Err(AppError::MalformedCompose {
                    reason: format!("cyclic service dependency involving \"{service}\""),
                })
            }
        }
    }
}
