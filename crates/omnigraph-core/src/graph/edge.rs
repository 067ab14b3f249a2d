//! Graph edges.

use serde::Serialize;
use serde_json::Value;

use super::{GraphError, Metadata};
use crate::confidence::{ConfidenceEvidence, ConfidenceLevel};
use crate::linking::HttpLink;
use crate::ontology::{EdgeType, UniversalNodeId};

/// A directed, confidence-scored relationship.
///
/// There is no constructor that takes a bare number: an edge is built from a
/// [`ConfidenceEvidence`], from an [`HttpLink`], or by validated import of
/// exchange data, so every edge carries a score that went through one of
/// those paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    from: String,
    to: String,
    #[serde(rename = "type")]
    edge_type: EdgeType,
    confidence: f64,
    evidence: String,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl GraphEdge {
    /// Build an edge from a scoring result.
    pub fn from_evidence(
        from: &UniversalNodeId,
        to: &UniversalNodeId,
        evidence: &ConfidenceEvidence,
    ) -> Self {
        Self {
            from: from.canonical(),
            to: to.canonical(),
            edge_type: evidence.edge_type(),
            confidence: evidence.final_score(),
            evidence: evidence.explanation().to_string(),
            metadata: Metadata::new(),
        }
    }

    /// Build an edge from a detected HTTP link, copying its score verbatim.
    pub fn from_link(link: &HttpLink) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("match_type".to_string(), Value::from(link.match_type().as_str()));
        metadata.insert("http_method".to_string(), Value::from(link.method().as_str()));
        metadata.insert("client_route".to_string(), Value::from(link.client_route()));
        metadata.insert("endpoint_route".to_string(), Value::from(link.endpoint_route()));
        metadata.insert("candidates".to_string(), Value::from(link.candidates()));

        Self {
            from: link.client_id().canonical(),
            to: link.endpoint_id().canonical(),
            edge_type: link.match_type().edge_type(),
            confidence: link.confidence(),
            evidence: link.evidence().to_string(),
            metadata,
        }
    }

    /// Rebuild an edge from exchange data, validating every field.
    pub(crate) fn from_parts(
        from: &str,
        to: &str,
        edge_type: &str,
        confidence: f64,
        evidence: String,
        metadata: Metadata,
    ) -> Result<Self, GraphError> {
        let from = UniversalNodeId::parse(from)?.canonical();
        let to = UniversalNodeId::parse(to)?.canonical();
        let edge_type: EdgeType = edge_type.parse()?;

        if !(0.0..=1.0).contains(&confidence) {
            return Err(GraphError::InvalidConfidence {
                from,
                to,
                value: confidence,
            });
        }

        Ok(Self {
            from,
            to,
            edge_type,
            confidence,
            evidence,
            metadata,
        })
    }

    /// Attach edge metadata such as `{"status": "STALE", "reason": "field renamed"}`.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Source node id (canonical string).
    pub fn from_id(&self) -> &str {
        &self.from
    }

    /// Target node id (canonical string).
    pub fn to_id(&self) -> &str {
        &self.to
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn evidence(&self) -> &str {
        &self.evidence
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// True iff the confidence is below `threshold`.
    pub fn requires_human_approval(&self, threshold: f64) -> bool {
        self.confidence < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::{ConfidenceEngine, ScoringContext};
    use crate::ontology::NodeType;

    #[test]
    fn test_from_evidence_copies_score() {
        let engine = ConfidenceEngine::default();
        let evidence = engine.score(EdgeType::FieldAccess, &ScoringContext::new()).unwrap();
        let from = UniversalNodeId::new("java", "com.acme", NodeType::Method, "Order").with_method("total");
        let to = UniversalNodeId::new("java", "com.acme", NodeType::Field, "Order").with_method("items");

        let edge = GraphEdge::from_evidence(&from, &to, &evidence);
        assert_eq!(edge.from_id(), "java::com.acme::method::Order:total");
        assert_eq!(edge.to_id(), "java::com.acme::field::Order:items");
        assert_eq!(edge.confidence(), 0.85);
        assert_eq!(edge.level(), ConfidenceLevel::High);
        assert_eq!(edge.evidence(), evidence.explanation());
    }

    #[test]
    fn test_from_parts_validates() {
        let ok = GraphEdge::from_parts(
            "ts::web::client::api:get",
            "python::app::endpoint::users",
            "dynamic_route",
            0.5,
            "shared prefix".to_string(),
            Metadata::new(),
        );
        assert!(ok.is_ok());

        let bad_confidence = GraphEdge::from_parts(
            "ts::web::client::api",
            "python::app::endpoint::users",
            "dynamic_route",
            1.5,
            String::new(),
            Metadata::new(),
        );
        assert!(matches!(bad_confidence, Err(GraphError::InvalidConfidence { .. })));

        let bad_type = GraphEdge::from_parts(
            "ts::web::client::api",
            "python::app::endpoint::users",
            "vibes",
            0.5,
            String::new(),
            Metadata::new(),
        );
        assert!(matches!(bad_type, Err(GraphError::Confidence(_))));

        let bad_id = GraphEdge::from_parts("ts::web::api", "python::app::endpoint::users", "http_call", 0.5, String::new(), Metadata::new());
        assert!(matches!(bad_id, Err(GraphError::NodeId(_))));
    }
}
