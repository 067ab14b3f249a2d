//! Graph Ontology
//!
//! Defines the language-agnostic vocabulary shared by every extractor that
//! feeds the graph: how code elements are addressed and which relationship
//! kinds may connect them.
//!
//! ## Modules
//!
//! - `node_id` - Canonical addressing: `language::module::node_type::name[:method]`
//! - `nodes` - Closed node-type vocabulary (function, class, endpoint, client, ...)
//! - `edges` - Closed edge-type vocabulary (imports, calls, route matches, ...)
//!
//! ## Design Principles
//!
//! - Closed enumerations so unknown tags fail fast instead of leaking through
//! - One canonical string form per element, usable as a map key
//! - Domain separation between definite (syntactic) and heuristic relationships

mod edges;
mod error;
mod node_id;
mod nodes;

pub use edges::*;
pub use error::NodeIdError;
pub use node_id::*;
pub use nodes::*;

use serde::{Deserialize, Serialize};

/// Categories of nodes for filtering and organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Callable code (functions, methods, handlers)
    Code,
    /// Type-level entities (classes, interfaces, models)
    Type,
    /// Data members (fields, properties, variables)
    Data,
    /// API surface (endpoints, routes, controllers, clients)
    Api,
    /// Structural containers (modules, services, components)
    Structure,
}

/// Categories of edges for filtering and organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCategory {
    /// Import statements and module-level references
    Structural,
    /// Calls and data access
    Behavioral,
    /// Type annotations and inheritance
    TypeSystem,
    /// Cross-boundary HTTP relationships
    Api,
    /// Data-flow relationships reported by taint analysis
    DataFlow,
}
