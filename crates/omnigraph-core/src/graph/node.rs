//! Graph nodes.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::PLACEHOLDER_METADATA_KEY;
use crate::ontology::UniversalNodeId;

/// Open key/value metadata attached to nodes and edges.
pub type Metadata = BTreeMap<String, Value>;

/// Keys the exchange format uses for identity; never stored as metadata.
pub const RESERVED_NODE_KEYS: &[&str] = &["id", "language", "module", "type", "name", "method"];

const FILE_KEY: &str = "file";
const LINE_KEY: &str = "line";

/// A node: a [`UniversalNodeId`] plus open metadata.
///
/// The id's source location and the `file`/`line` metadata keys are kept in
/// agreement. The id wins on conflict; metadata fills a location the id
/// lacks.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    id: UniversalNodeId,
    metadata: Metadata,
}

impl GraphNode {
    pub fn new(id: UniversalNodeId, metadata: Metadata) -> Self {
        let mut node = Self {
            id,
            metadata: Metadata::new(),
        };
        node.absorb(metadata);
        node
    }

    pub fn id(&self) -> &UniversalNodeId {
        &self.id
    }

    /// Canonical id string; the node's key in the graph.
    pub fn key(&self) -> String {
        self.id.canonical()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// True for nodes created only to satisfy a dangling edge.
    pub fn is_placeholder(&self) -> bool {
        self.metadata
            .get(PLACEHOLDER_METADATA_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Merge a later sighting of the same element.
    ///
    /// New metadata keys overwrite old ones; location fields the id lacks are
    /// filled from `id`. A sighting that does not itself claim to be a
    /// placeholder clears the placeholder flag.
    pub(crate) fn merge(&mut self, id: &UniversalNodeId, metadata: Metadata) {
        if self.id.file().is_none() {
            self.id.set_file(id.file().map(str::to_string));
        }
        if self.id.line().is_none() {
            self.id.set_line(id.line());
        }
        if !metadata.contains_key(PLACEHOLDER_METADATA_KEY) {
            self.metadata.remove(PLACEHOLDER_METADATA_KEY);
        }
        self.absorb(metadata);
    }

    fn absorb(&mut self, metadata: Metadata) {
        for (key, value) in metadata {
            if RESERVED_NODE_KEYS.contains(&key.as_str()) {
                tracing::warn!(node = %self.id, key = %key, "dropping reserved metadata key");
                continue;
            }
            self.metadata.insert(key, value);
        }
        self.reconcile_location();
    }

    fn reconcile_location(&mut self) {
        match self.id.file().map(str::to_string) {
            Some(file) => {
                let previous = self.metadata.insert(FILE_KEY.to_string(), Value::String(file.clone()));
                if let Some(previous) = previous.filter(|p| p.as_str() != Some(file.as_str())) {
                    tracing::warn!(node = %self.id, metadata = %previous, id = %file, "conflicting file location, keeping id's");
                }
            }
            None => {
                let file = self.metadata.get(FILE_KEY).and_then(Value::as_str).map(str::to_string);
                self.id.set_file(file);
            }
        }

        match self.id.line() {
            Some(line) => {
                let previous = self.metadata.insert(LINE_KEY.to_string(), Value::from(line));
                if let Some(previous) = previous.filter(|p| p.as_u64() != Some(u64::from(line))) {
                    tracing::warn!(node = %self.id, metadata = %previous, id = line, "conflicting line location, keeping id's");
                }
            }
            None => {
                let line = self
                    .metadata
                    .get(LINE_KEY)
                    .and_then(Value::as_u64)
                    .and_then(|l| u32::try_from(l).ok());
                self.id.set_line(line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::NodeType;
    use serde_json::json;

    fn meta(value: Value) -> Metadata {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reserved_keys_dropped() {
        let id = UniversalNodeId::new("python", "app", NodeType::Function, "run");
        let node = GraphNode::new(id, meta(json!({"name": "other", "route": "/run"})));
        assert!(node.get("name").is_none());
        assert_eq!(node.get("route"), Some(&json!("/run")));
    }

    #[test]
    fn test_id_location_copied_into_metadata() {
        let id = UniversalNodeId::new("go", "pkg", NodeType::Function, "List")
            .with_file("pkg/list.go")
            .with_line(7);
        let node = GraphNode::new(id, Metadata::new());
        assert_eq!(node.get("file"), Some(&json!("pkg/list.go")));
        assert_eq!(node.get("line"), Some(&json!(7)));
    }

    #[test]
    fn test_metadata_location_lifted_into_id() {
        let id = UniversalNodeId::new("go", "pkg", NodeType::Function, "List");
        let node = GraphNode::new(id, meta(json!({"file": "pkg/list.go", "line": 7})));
        assert_eq!(node.id().file(), Some("pkg/list.go"));
        assert_eq!(node.id().line(), Some(7));
    }

    #[test]
    fn test_id_wins_on_conflict() {
        let id = UniversalNodeId::new("go", "pkg", NodeType::Function, "List").with_file("a.go");
        let node = GraphNode::new(id, meta(json!({"file": "b.go"})));
        assert_eq!(node.get("file"), Some(&json!("a.go")));
    }

    #[test]
    fn test_merge_overwrites_and_clears_placeholder() {
        let id = UniversalNodeId::new("ts", "web", NodeType::Client, "fetchUser");
        let mut node = GraphNode::new(id.clone(), meta(json!({"placeholder": true, "a": 1})));
        assert!(node.is_placeholder());

        node.merge(&id.clone().with_line(12), meta(json!({"a": 2, "b": 3})));
        assert!(!node.is_placeholder());
        assert_eq!(node.get("a"), Some(&json!(2)));
        assert_eq!(node.get("b"), Some(&json!(3)));
        assert_eq!(node.id().line(), Some(12));
    }
}
