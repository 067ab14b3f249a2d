//! Graph assembly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GraphEdge, GraphError, GraphNode, Metadata, UniversalGraph};
use crate::confidence::{ConfidenceEngine, ScoringContext};
use crate::config::{Config, GraphConfig, PLACEHOLDER_METADATA_KEY};
use crate::linking::HttpLink;
use crate::ontology::{EdgeType, UniversalNodeId};

/// What the builder does with an edge whose endpoint was never added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingNodePolicy {
    /// Fail the edge with [`GraphError::MissingNode`].
    #[default]
    Reject,
    /// Insert a minimal node marked `placeholder: true`.
    CreatePlaceholder,
}

/// The only mutation entry point while a graph is being assembled.
///
/// Every edge passes through the [`ConfidenceEngine`] (or comes from a scored
/// [`HttpLink`]) before it is inserted. The builder owns its in-progress
/// graph exclusively; `build()` hands out a deep copy.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    engine: ConfidenceEngine,
    missing_nodes: MissingNodePolicy,
    graph: UniversalGraph,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GraphBuilder {
    pub fn new(engine: ConfidenceEngine, config: GraphConfig) -> Self {
        Self {
            engine,
            missing_nodes: config.missing_nodes,
            graph: UniversalGraph::new(config.project),
        }
    }

    /// Builder over the default scoring table and graph settings.
    pub fn with_defaults() -> Self {
        Self::new(ConfidenceEngine::default(), GraphConfig::default())
    }

    /// Builder wired from a full configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ConfidenceEngine::new(config.confidence.clone()),
            config.graph.clone(),
        )
    }

    pub fn with_missing_node_policy(mut self, policy: MissingNodePolicy) -> Self {
        self.missing_nodes = policy;
        self
    }

    pub fn engine(&self) -> &ConfidenceEngine {
        &self.engine
    }

    pub fn missing_node_policy(&self) -> MissingNodePolicy {
        self.missing_nodes
    }

    /// Create a node, or merge into the existing one with the same id.
    ///
    /// Fails with [`GraphError::NodeId`] when the id would not decode back
    /// from its canonical string.
    pub fn add_node(
        &mut self,
        id: UniversalNodeId,
        metadata: Option<Metadata>,
    ) -> Result<&GraphNode, GraphError> {
        id.validate()?;
        tracing::debug!(node = %id, "add node");
        Ok(self.graph.add_node(id, metadata.unwrap_or_default()))
    }

    /// Score a relationship and insert it.
    pub fn add_edge(
        &mut self,
        from: &UniversalNodeId,
        to: &UniversalNodeId,
        edge_type: EdgeType,
        context: &ScoringContext,
    ) -> Result<&GraphEdge, GraphError> {
        self.add_edge_with_metadata(from, to, edge_type, context, Metadata::new())
    }

    /// [`Self::add_edge`] with edge metadata attached.
    pub fn add_edge_with_metadata(
        &mut self,
        from: &UniversalNodeId,
        to: &UniversalNodeId,
        edge_type: EdgeType,
        context: &ScoringContext,
        metadata: Metadata,
    ) -> Result<&GraphEdge, GraphError> {
        let evidence = self.engine.score(edge_type, context)?;
        self.ensure_endpoints(from, to)?;

        let edge = GraphEdge::from_evidence(from, to, &evidence).with_metadata(metadata);
        tracing::debug!(
            from = edge.from_id(),
            to = edge.to_id(),
            edge_type = %edge_type,
            confidence = edge.confidence(),
            "add edge"
        );
        Ok(self.graph.add_edge(edge))
    }

    /// Materialize a detected HTTP link as an edge.
    ///
    /// Confidence and evidence are taken from the link unchanged.
    pub fn commit_link(&mut self, link: &HttpLink) -> Result<&GraphEdge, GraphError> {
        self.ensure_endpoints(link.client_id(), link.endpoint_id())?;

        let edge = GraphEdge::from_link(link);
        tracing::debug!(
            from = edge.from_id(),
            to = edge.to_id(),
            match_type = link.match_type().as_str(),
            confidence = edge.confidence(),
            "commit http link"
        );
        Ok(self.graph.add_edge(edge))
    }

    /// Commit every link, collecting per-link failures instead of stopping.
    pub fn commit_links<'a>(
        &mut self,
        links: impl IntoIterator<Item = &'a HttpLink>,
    ) -> Vec<GraphError> {
        links
            .into_iter()
            .filter_map(|link| self.commit_link(link).err())
            .collect()
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.graph.get_node(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Snapshot the graph. Later builder calls do not affect the result.
    pub fn build(&self) -> UniversalGraph {
        tracing::info!(
            project = self.graph.project(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "graph built"
        );
        self.graph.clone()
    }

    /// Finish assembly, handing over the graph without copying.
    pub fn into_graph(self) -> UniversalGraph {
        self.graph
    }

    /// Clear all nodes and edges for reuse, keeping allocations.
    pub fn reset(&mut self) {
        self.graph.clear();
    }

    /// Clear state and start a new project.
    pub fn reset_for(&mut self, project: impl Into<String>) {
        self.graph.clear();
        self.graph.set_project(project);
    }

    fn ensure_endpoints(
        &mut self,
        from: &UniversalNodeId,
        to: &UniversalNodeId,
    ) -> Result<(), GraphError> {
        from.validate()?;
        to.validate()?;

        let missing: Vec<&UniversalNodeId> = [from, to]
            .into_iter()
            .filter(|id| !self.graph.contains_node(&id.canonical()))
            .collect();

        match self.missing_nodes {
            MissingNodePolicy::Reject => match missing.first() {
                Some(id) => Err(GraphError::MissingNode {
                    id: id.canonical(),
                }),
                None => Ok(()),
            },
            MissingNodePolicy::CreatePlaceholder => {
                for id in missing {
                    if self.graph.contains_node(&id.canonical()) {
                        continue;
                    }
                    tracing::debug!(node = %id, "creating placeholder node");
                    let mut metadata = Metadata::new();
                    metadata.insert(PLACEHOLDER_METADATA_KEY.to_string(), Value::Bool(true));
                    self.graph.add_node(id.clone(), metadata);
                }
                Ok(())
            }
        }
    }
}
