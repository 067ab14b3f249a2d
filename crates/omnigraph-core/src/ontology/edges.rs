//! Edge types (relationships) for the graph.
//!
//! Edges are organized by how much evidence backs them:
//!
//! - **Definite**: IMPORT_STATEMENT, TYPE_ANNOTATION, INHERITANCE
//! - **Behavioral**: DIRECT_CALL, INDIRECT_CALL, FIELD_ACCESS
//! - **Cross-boundary**: HTTP_CALL, ROUTE_EXACT_MATCH, ROUTE_PATTERN_MATCH,
//!   STRING_LITERAL_MATCH, DYNAMIC_ROUTE
//! - **Data flow**: TAINT_FLOW

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EdgeCategory;
use crate::confidence::ConfidenceError;

/// Kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// A imports B (import/use/require statement)
    ImportStatement,
    /// A references type B in an annotation or signature
    TypeAnnotation,
    /// A extends or implements B
    Inheritance,
    /// A calls B by name
    DirectCall,
    /// A calls B through a variable, callback or dynamic dispatch
    IndirectCall,
    /// A reads or writes field B
    FieldAccess,
    /// A issues an HTTP request handled by B
    HttpCall,
    /// Client route text equals endpoint route text
    RouteExactMatch,
    /// Client route fills the endpoint's parameter placeholders
    RoutePatternMatch,
    /// A string literal in A names B
    StringLiteralMatch,
    /// Client route is assembled at runtime and partially matches B
    DynamicRoute,
    /// Tainted data flows from A into B
    TaintFlow,
}

impl EdgeType {
    /// Every edge type, in declaration order.
    pub const ALL: [EdgeType; 12] = [
        EdgeType::ImportStatement,
        EdgeType::TypeAnnotation,
        EdgeType::Inheritance,
        EdgeType::DirectCall,
        EdgeType::IndirectCall,
        EdgeType::FieldAccess,
        EdgeType::HttpCall,
        EdgeType::RouteExactMatch,
        EdgeType::RoutePatternMatch,
        EdgeType::StringLiteralMatch,
        EdgeType::DynamicRoute,
        EdgeType::TaintFlow,
    ];

    /// The tag used in the exchange format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImportStatement => "import_statement",
            Self::TypeAnnotation => "type_annotation",
            Self::Inheritance => "inheritance",
            Self::DirectCall => "direct_call",
            Self::IndirectCall => "indirect_call",
            Self::FieldAccess => "field_access",
            Self::HttpCall => "http_call",
            Self::RouteExactMatch => "route_exact_match",
            Self::RoutePatternMatch => "route_pattern_match",
            Self::StringLiteralMatch => "string_literal_match",
            Self::DynamicRoute => "dynamic_route",
            Self::TaintFlow => "taint_flow",
        }
    }

    /// Get the category of this edge type.
    pub fn category(&self) -> EdgeCategory {
        match self {
            Self::ImportStatement => EdgeCategory::Structural,

            Self::DirectCall | Self::IndirectCall | Self::FieldAccess => EdgeCategory::Behavioral,

            Self::TypeAnnotation | Self::Inheritance => EdgeCategory::TypeSystem,

            Self::HttpCall
            | Self::RouteExactMatch
            | Self::RoutePatternMatch
            | Self::StringLiteralMatch
            | Self::DynamicRoute => EdgeCategory::Api,

            Self::TaintFlow => EdgeCategory::DataFlow,
        }
    }

    /// Whether this edge crosses a language or process boundary.
    pub fn is_cross_boundary(&self) -> bool {
        self.category() == EdgeCategory::Api
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = ConfidenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfidenceError::UnknownEdgeType(s.to_string()))
    }
}
