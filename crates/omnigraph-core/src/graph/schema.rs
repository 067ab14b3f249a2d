//! Omni-Schema: the JSON exchange form of a [`UniversalGraph`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GraphEdge, GraphError, GraphNode, Metadata, UniversalGraph};
use crate::ontology::{NodeType, UniversalNodeId};

/// Top-level exchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmniSchema {
    pub graph: SchemaGraph,
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaGraph {
    #[serde(default)]
    pub nodes: Vec<SchemaNode>,
    #[serde(default)]
    pub edges: Vec<SchemaEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub project: String,
    pub timestamp: DateTime<Utc>,
}

/// One node. Identity fields are spelled out next to the canonical id and
/// every metadata entry is flattened into the same object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub id: String,
    pub language: String,
    pub module: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(flatten)]
    pub attributes: Metadata,
}

impl From<&GraphNode> for SchemaNode {
    fn from(node: &GraphNode) -> Self {
        let id = node.id();
        Self {
            id: id.canonical(),
            language: id.language().to_string(),
            module: id.module().to_string(),
            node_type: id.node_type(),
            name: id.name().to_string(),
            method: id.method().map(str::to_string),
            attributes: node.metadata().clone(),
        }
    }
}

impl SchemaNode {
    fn into_node(self) -> Result<GraphNode, GraphError> {
        let id = UniversalNodeId::parse(&self.id)?;

        let consistent = id.language() == self.language
            && id.module() == self.module
            && id.node_type() == self.node_type
            && id.name() == self.name
            && id.method() == self.method.as_deref();
        if !consistent {
            return Err(GraphError::Schema(format!(
                "node fields disagree with id {}",
                self.id
            )));
        }

        Ok(GraphNode::new(id, self.attributes))
    }
}

/// One edge. `confidence` and `evidence` are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub confidence: f64,
    pub evidence: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl From<&GraphEdge> for SchemaEdge {
    fn from(edge: &GraphEdge) -> Self {
        Self {
            from: edge.from_id().to_string(),
            to: edge.to_id().to_string(),
            edge_type: edge.edge_type().as_str().to_string(),
            confidence: edge.confidence(),
            evidence: edge.evidence().to_string(),
            metadata: edge.metadata().clone(),
        }
    }
}

impl UniversalGraph {
    /// Export the graph, stamped with the current time.
    pub fn to_exchange_format(&self) -> OmniSchema {
        self.to_exchange_format_at(Utc::now())
    }

    /// Export the graph with an explicit timestamp.
    ///
    /// Nodes are ordered by canonical id; edges keep insertion order.
    pub fn to_exchange_format_at(&self, timestamp: DateTime<Utc>) -> OmniSchema {
        let mut nodes: Vec<&GraphNode> = self.nodes().collect();
        nodes.sort_by_key(|node| node.key());

        OmniSchema {
            graph: SchemaGraph {
                nodes: nodes.into_iter().map(SchemaNode::from).collect(),
                edges: self.edges().iter().map(SchemaEdge::from).collect(),
            },
            metadata: SchemaMetadata {
                project: self.project().to_string(),
                timestamp,
            },
        }
    }

    /// Rebuild a graph from exchange data.
    ///
    /// Node ids are re-parsed and cross-checked against the spelled-out
    /// fields, edge types must be in the vocabulary, and confidences must lie
    /// in `[0, 1]`. The export timestamp is not part of the graph.
    pub fn from_exchange_format(schema: OmniSchema) -> Result<Self, GraphError> {
        let mut graph = UniversalGraph::new(schema.metadata.project);

        for schema_node in schema.graph.nodes {
            let node = schema_node.into_node()?;
            let key = node.key();
            if graph.contains_node(&key) {
                return Err(GraphError::Schema(format!("duplicate node id {}", key)));
            }
            let id = node.id().clone();
            graph.add_node(id, node.metadata().clone());
        }

        for schema_edge in schema.graph.edges {
            let edge = GraphEdge::from_parts(
                &schema_edge.from,
                &schema_edge.to,
                &schema_edge.edge_type,
                schema_edge.confidence,
                schema_edge.evidence,
                schema_edge.metadata,
            )?;
            graph.add_edge(edge);
        }

        tracing::debug!(
            project = graph.project(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "imported graph"
        );
        Ok(graph)
    }

    /// Serialize to pretty-printed Omni-Schema JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&self.to_exchange_format())?)
    }

    /// Parse Omni-Schema JSON.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let schema: OmniSchema = serde_json::from_str(json)?;
        Self::from_exchange_format(schema)
    }
}
