//! Node types for the graph.
//!
//! Every code element an extractor reports carries one of these tags. The
//! vocabulary is closed: extractors map their language's constructs onto it
//! (a Java `@RestController` becomes `controller`, a Python `def` inside a
//! class becomes `method`, an `axios.get(...)` call site becomes `client`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{NodeCategory, NodeIdError};

/// Kind of code element a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Function,
    Class,
    Method,
    Endpoint,
    Client,
    Field,
    Property,
    Controller,
    Module,
    Interface,
    Variable,
    Route,
    Handler,
    Service,
    Model,
    Component,
}

impl NodeType {
    /// Every node type, in declaration order.
    pub const ALL: [NodeType; 16] = [
        NodeType::Function,
        NodeType::Class,
        NodeType::Method,
        NodeType::Endpoint,
        NodeType::Client,
        NodeType::Field,
        NodeType::Property,
        NodeType::Controller,
        NodeType::Module,
        NodeType::Interface,
        NodeType::Variable,
        NodeType::Route,
        NodeType::Handler,
        NodeType::Service,
        NodeType::Model,
        NodeType::Component,
    ];

    /// The tag used in canonical ids and in the exchange format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Method => "method",
            Self::Endpoint => "endpoint",
            Self::Client => "client",
            Self::Field => "field",
            Self::Property => "property",
            Self::Controller => "controller",
            Self::Module => "module",
            Self::Interface => "interface",
            Self::Variable => "variable",
            Self::Route => "route",
            Self::Handler => "handler",
            Self::Service => "service",
            Self::Model => "model",
            Self::Component => "component",
        }
    }

    /// Get the category of this node type.
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::Function | Self::Method | Self::Handler => NodeCategory::Code,
            Self::Class | Self::Interface | Self::Model => NodeCategory::Type,
            Self::Field | Self::Property | Self::Variable => NodeCategory::Data,
            Self::Endpoint | Self::Client | Self::Controller | Self::Route => NodeCategory::Api,
            Self::Module | Self::Service | Self::Component => NodeCategory::Structure,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| NodeIdError::UnknownNodeType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for t in NodeType::ALL {
            assert_eq!(t.as_str().parse::<NodeType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert_eq!(
            "widget".parse::<NodeType>(),
            Err(NodeIdError::UnknownNodeType("widget".to_string()))
        );
        // Tags are case-sensitive
        assert!("Function".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_serde_uses_tag() {
        let json = serde_json::to_string(&NodeType::Controller).unwrap();
        assert_eq!(json, "\"controller\"");
    }
}
