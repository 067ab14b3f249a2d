//! Extractor facts: the JSON document per-language extractors hand to `build`.
//!
//! ```json
//! {
//!   "project": "shop",
//!   "nodes": [{"language": "python", "module": "app.api", "type": "endpoint",
//!              "name": "get_user", "line": 12, "metadata": {"framework": "flask"}}],
//!   "edges": [{"from": "...", "to": "...", "type": "direct_call",
//!              "context": {"match_count": 2}}],
//!   "http": {
//!     "clients":   [{"node": "<id>", "method": "GET", "route": "/api/users/123"}],
//!     "endpoints": [{"node": "<id>", "method": "GET", "route": "/api/users/{id}"}]
//!   }
//! }
//! ```

use std::fmt;

use omnigraph_core::{
    Config, EdgeType, GraphBuilder, HttpLinkDetector, LinkReport, Metadata, ScoringContext,
    UniversalGraph, UniversalNodeId,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Facts {
    pub project: Option<String>,
    pub nodes: Vec<NodeFact>,
    pub edges: Vec<EdgeFact>,
    pub http: HttpFacts,
}

#[derive(Debug, Deserialize)]
pub struct NodeFact {
    pub language: String,
    pub module: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NodeFact {
    fn node_id(&self) -> Result<UniversalNodeId, omnigraph_core::NodeIdError> {
        let mut id = UniversalNodeId::create(
            self.language.as_str(),
            self.module.as_str(),
            &self.node_type,
            self.name.as_str(),
        )?;
        if let Some(method) = &self.method {
            id = id.with_method(method.as_str());
        }
        if let Some(line) = self.line {
            id = id.with_line(line);
        }
        if let Some(file) = &self.file {
            id = id.with_file(file.as_str());
        }
        id.validate()?;
        Ok(id)
    }
}

#[derive(Debug, Deserialize)]
pub struct EdgeFact {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub context: ScoringContext,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HttpFacts {
    pub clients: Vec<RouteFact>,
    pub endpoints: Vec<RouteFact>,
}

#[derive(Debug, Deserialize)]
pub struct RouteFact {
    pub node: String,
    pub method: String,
    pub route: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One fact that could not be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub item: String,
    pub reason: String,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.reason)
    }
}

/// Result of assembling a facts document.
#[derive(Debug)]
pub struct Assembly {
    pub graph: UniversalGraph,
    pub links: LinkReport,
    pub rejected: Vec<Rejected>,
}

/// Build a graph from facts. Bad items are collected and skipped.
///
/// The project name is `project`, else the document's own, else the
/// configured one.
pub fn assemble(
    facts: Facts,
    config: &Config,
    project: Option<&str>,
    detect_http: bool,
) -> Assembly {
    let mut builder = GraphBuilder::from_config(config);
    if let Some(project) = project.or(facts.project.as_deref()) {
        builder.reset_for(project);
    }
    let mut rejected = Vec::new();

    for (index, node) in facts.nodes.into_iter().enumerate() {
        let added = node
            .node_id()
            .map_err(|e| e.to_string())
            .and_then(|id| {
                builder
                    .add_node(id, Some(node.metadata))
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            });
        if let Err(reason) = added {
            rejected.push(Rejected {
                item: format!("nodes[{index}]"),
                reason,
            });
        }
    }

    for (index, edge) in facts.edges.into_iter().enumerate() {
        if let Err(reason) = add_edge(&mut builder, edge) {
            rejected.push(Rejected {
                item: format!("edges[{index}]"),
                reason,
            });
        }
    }

    let mut links = LinkReport::default();
    if detect_http {
        let mut detector = HttpLinkDetector::new(config.linking.clone());
        for (index, client) in facts.http.clients.into_iter().enumerate() {
            let result = UniversalNodeId::parse(&client.node)
                .map_err(|e| e.to_string())
                .and_then(|id| {
                    detector
                        .add_client_call(id, &client.method, &client.route, Some(client.metadata))
                        .map_err(|e| e.to_string())
                });
            if let Err(reason) = result {
                rejected.push(Rejected {
                    item: format!("http.clients[{index}]"),
                    reason,
                });
            }
        }
        for (index, endpoint) in facts.http.endpoints.into_iter().enumerate() {
            let result = UniversalNodeId::parse(&endpoint.node)
                .map_err(|e| e.to_string())
                .and_then(|id| {
                    detector
                        .add_endpoint(id, &endpoint.method, &endpoint.route, Some(endpoint.metadata))
                        .map_err(|e| e.to_string())
                });
            if let Err(reason) = result {
                rejected.push(Rejected {
                    item: format!("http.endpoints[{index}]"),
                    reason,
                });
            }
        }

        links = detector.detect();
        for (index, link) in links.links.iter().enumerate() {
            if let Err(e) = builder.commit_link(link) {
                rejected.push(Rejected {
                    item: format!("links[{index}]"),
                    reason: e.to_string(),
                });
            }
        }
    }

    Assembly {
        graph: builder.into_graph(),
        links,
        rejected,
    }
}

fn add_edge(builder: &mut GraphBuilder, edge: EdgeFact) -> Result<(), String> {
    let from = UniversalNodeId::parse(&edge.from).map_err(|e| e.to_string())?;
    let to = UniversalNodeId::parse(&edge.to).map_err(|e| e.to_string())?;
    let edge_type = edge
        .edge_type
        .parse::<EdgeType>()
        .map_err(|e| e.to_string())?;
    builder
        .add_edge_with_metadata(&from, &to, edge_type, &edge.context, edge.metadata)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
