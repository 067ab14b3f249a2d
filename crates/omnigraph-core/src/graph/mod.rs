//! Cross-language code relationship graph.
//!
//! This module provides the queryable graph model:
//! - **Nodes** keyed by canonical [`UniversalNodeId`] strings
//! - **Edges** that always carry a confidence score and its evidence
//! - **Dependency queries** split into trusted and needs-review results
//! - **Omni-Schema** export/import for crossing process boundaries
//!
//! # Components
//!
//! - [`UniversalGraph`] - Finalized node/edge collection with queries
//! - [`GraphBuilder`] - The mutation entry point used during assembly
//! - [`OmniSchema`] - Serialized exchange form
//!
//! # Example
//!
//! ```
//! use omnigraph_core::{EdgeType, GraphBuilder, NodeType, ScoringContext, UniversalNodeId};
//!
//! let caller = UniversalNodeId::new("python", "app.views", NodeType::Function, "index");
//! let callee = UniversalNodeId::new("python", "app.db", NodeType::Function, "query");
//!
//! let mut builder = GraphBuilder::with_defaults();
//! builder.add_node(caller.clone(), None)?;
//! builder.add_node(callee.clone(), None)?;
//! builder.add_edge(&caller, &callee, EdgeType::IndirectCall, &ScoringContext::new())?;
//!
//! let graph = builder.build();
//! let deps = graph.get_dependencies(&caller.canonical(), 0.8);
//! assert!(deps.requires_human_approval);
//! # Ok::<(), omnigraph_core::GraphError>(())
//! ```

mod builder;
mod edge;
mod error;
mod node;
mod schema;

pub use builder::{GraphBuilder, MissingNodePolicy};
pub use edge::GraphEdge;
pub use error::GraphError;
pub use node::{GraphNode, Metadata, RESERVED_NODE_KEYS};
pub use schema::{OmniSchema, SchemaEdge, SchemaGraph, SchemaMetadata, SchemaNode};

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::confidence::ConfidenceLevel;
use crate::config::DEFAULT_PROJECT_NAME;
use crate::ontology::{EdgeType, UniversalNodeId};

/// Outgoing (or incoming) edges of one node, split at a trust threshold.
///
/// `definite` and `uncertain` are disjoint and together hold every edge the
/// underlying query returned, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyReport {
    /// Node the query was made for.
    pub node_id: String,
    /// Threshold used for the split.
    pub min_confidence: f64,
    /// Edges with confidence >= threshold.
    pub definite: Vec<GraphEdge>,
    /// Edges with confidence < threshold.
    pub uncertain: Vec<GraphEdge>,
    /// True iff `uncertain` is non-empty.
    pub requires_human_approval: bool,
}

impl DependencyReport {
    fn partition<'a>(
        node_id: &str,
        min_confidence: f64,
        edges: impl Iterator<Item = &'a GraphEdge>,
    ) -> Self {
        let (definite, uncertain): (Vec<GraphEdge>, Vec<GraphEdge>) = edges
            .cloned()
            .partition(|edge| edge.confidence() >= min_confidence);
        let requires_human_approval = !uncertain.is_empty();

        Self {
            node_id: node_id.to_string(),
            min_confidence,
            definite,
            uncertain,
            requires_human_approval,
        }
    }

    /// Total number of edges in the report.
    pub fn len(&self) -> usize {
        self.definite.len() + self.uncertain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summary counts over a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub placeholder_nodes: usize,
    pub edges: usize,
    pub by_edge_type: BTreeMap<EdgeType, usize>,
    pub by_level: BTreeMap<ConfidenceLevel, usize>,
}

/// The queryable collection of nodes and confidence-scored edges.
///
/// Produced by [`GraphBuilder::build`] or [`UniversalGraph::from_exchange_format`];
/// every query takes `&self`, so a finished graph can be shared across
/// threads for concurrent reads.
#[derive(Debug, Clone)]
pub struct UniversalGraph {
    project: String,
    nodes: HashMap<String, GraphNode>,
    edges: Vec<GraphEdge>,
    outgoing: HashMap<String, Vec<usize>>,
    incoming: HashMap<String, Vec<usize>>,
}

impl Default for UniversalGraph {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }
}

impl PartialEq for UniversalGraph {
    fn eq(&self, other: &Self) -> bool {
        self.project == other.project && self.nodes == other.nodes && self.edges == other.edges
    }
}

impl UniversalGraph {
    /// Create an empty graph for the given project.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            nodes: HashMap::new(),
            edges: Vec::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Insert a node, or merge into the existing node with the same key.
    pub(crate) fn add_node(&mut self, id: UniversalNodeId, metadata: Metadata) -> &GraphNode {
        use std::collections::hash_map::Entry;

        match self.nodes.entry(id.canonical()) {
            Entry::Occupied(entry) => {
                let node = entry.into_mut();
                node.merge(&id, metadata);
                node
            }
            Entry::Vacant(entry) => entry.insert(GraphNode::new(id, metadata)),
        }
    }

    /// Append a pre-scored edge.
    pub(crate) fn add_edge(&mut self, edge: GraphEdge) -> &GraphEdge {
        let index = self.edges.len();
        self.outgoing
            .entry(edge.from_id().to_string())
            .or_default()
            .push(index);
        self.incoming
            .entry(edge.to_id().to_string())
            .or_default()
            .push(index);
        self.edges.push(edge);
        &self.edges[index]
    }

    /// Look up a node by canonical id.
    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Edges leaving `id`, in insertion order.
    ///
    /// The iterator is `Clone`, so it can be restarted without re-querying.
    pub fn get_edges_from<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = &'a GraphEdge> + Clone + 'a {
        self.indexed(self.outgoing.get(id))
    }

    /// Edges arriving at `id`, in insertion order.
    pub fn get_edges_to<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = &'a GraphEdge> + Clone + 'a {
        self.indexed(self.incoming.get(id))
    }

    /// Split the outgoing edges of `id` at `min_confidence`.
    pub fn get_dependencies(&self, id: &str, min_confidence: f64) -> DependencyReport {
        DependencyReport::partition(id, min_confidence, self.get_edges_from(id))
    }

    /// Split the incoming edges of `id` at `min_confidence` (impact analysis).
    pub fn get_dependents(&self, id: &str, min_confidence: f64) -> DependencyReport {
        DependencyReport::partition(id, min_confidence, self.get_edges_to(id))
    }

    /// Every edge whose confidence is below `threshold`.
    pub fn edges_requiring_review(&self, threshold: f64) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.requires_human_approval(threshold))
    }

    /// All nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes.values()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.nodes.len(),
            placeholder_nodes: self.nodes.values().filter(|n| n.is_placeholder()).count(),
            edges: self.edges.len(),
            ..GraphStats::default()
        };
        for edge in &self.edges {
            *stats.by_edge_type.entry(edge.edge_type()).or_default() += 1;
            *stats.by_level.entry(edge.level()).or_default() += 1;
        }
        stats
    }

    /// Drop all nodes and edges, keeping allocated capacity.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.incoming.clear();
    }

    pub(crate) fn set_project(&mut self, project: impl Into<String>) {
        self.project = project.into();
    }

    fn indexed<'a>(
        &'a self,
        indices: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a GraphEdge> + Clone + 'a {
        indices
            .into_iter()
            .flatten()
            .map(move |&index| &self.edges[index])
    }
}
