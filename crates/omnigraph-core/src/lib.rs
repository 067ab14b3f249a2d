pub mod confidence;
pub mod config;
pub mod graph;
pub mod linking;
pub mod ontology;

pub use confidence::{
    Adjustment, ConfidenceEngine, ConfidenceError, ConfidenceEvidence, ConfidenceLevel, RouteMatch,
    ScoringContext,
};
pub use config::{Config, ConfigError};
pub use graph::{
    DependencyReport, GraphBuilder, GraphEdge, GraphError, GraphNode, GraphStats, Metadata,
    MissingNodePolicy, OmniSchema, UniversalGraph,
};
pub use linking::{HttpLink, HttpLinkDetector, HttpMethod, LinkError, LinkReport, MatchType};
pub use ontology::{EdgeType, NodeIdError, NodeType, UniversalNodeId};
